// lib/src/storage_engine/mod.rs

pub mod appointment_storage;
pub mod document_storage;
pub mod storage_utils;

pub use appointment_storage::{AppointmentStorageEngine, SledAppointmentStorage, SLOT_TAKEN};
pub use document_storage::{Document, DocumentStorageEngine, SledDocumentStorage};
pub use storage_utils::IndexAbort;

use std::path::Path;

use sled::{Config, Db};
use tracing::info;

use crate::errors::Result;

/// Opens (or creates) the sled database at `path`.
pub fn open_sled_db<P: AsRef<Path>>(path: P) -> Result<Db> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| crate::errors::HospitalError::DatabaseError(e.to_string()))?;
        }
    }
    let db = Config::new().path(path).open()?;
    info!("Opened sled database at {:?}", path);
    Ok(db)
}

/// Opens a throwaway database that is removed when dropped.
pub fn open_temporary_db() -> Result<Db> {
    Ok(Config::new().temporary(true).open()?)
}
