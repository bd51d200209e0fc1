// lib/src/database.rs

use std::path::PathBuf;
use std::sync::Arc;

use sled::Db;
use tracing::info;

use models::medical::{Doctor, Patient, User};

use crate::errors::Result;
use crate::services::{AppointmentService, DoctorService, PatientService, StatsService, UserService};
use crate::storage_engine::{
    open_sled_db, open_temporary_db, AppointmentStorageEngine, DocumentStorageEngine,
    SledAppointmentStorage, SledDocumentStorage,
};

pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Settings needed to open the store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub data_directory: PathBuf,
    pub bcrypt_cost: u32,
}

impl DatabaseConfig {
    pub fn new(data_directory: impl Into<PathBuf>) -> Self {
        Self {
            data_directory: data_directory.into(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

/// Process-wide context: the open sled database and the services built on it.
/// Constructed once at startup and shared behind an `Arc`.
pub struct Database {
    db: Db,
    pub doctors: DoctorService,
    pub patients: PatientService,
    pub appointments: AppointmentService,
    pub users: UserService,
    pub stats: StatsService,
}

impl Database {
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let db = open_sled_db(&config.data_directory)?;
        Self::from_db(db, config.bcrypt_cost)
    }

    /// An in-memory database removed on drop, with a cheap bcrypt cost.
    pub fn temporary() -> Result<Self> {
        Self::from_db(open_temporary_db()?, 4)
    }

    fn from_db(db: Db, bcrypt_cost: u32) -> Result<Self> {
        let doctor_store: Arc<dyn DocumentStorageEngine<Doctor>> =
            Arc::new(SledDocumentStorage::<Doctor>::new(&db)?);
        let patient_store: Arc<dyn DocumentStorageEngine<Patient>> =
            Arc::new(SledDocumentStorage::<Patient>::new(&db)?);
        let user_store: Arc<dyn DocumentStorageEngine<User>> =
            Arc::new(SledDocumentStorage::<User>::new(&db)?);
        let appointment_store: Arc<dyn AppointmentStorageEngine> =
            Arc::new(SledAppointmentStorage::new(&db)?);

        Ok(Self {
            doctors: DoctorService::new(doctor_store.clone(), appointment_store.clone()),
            patients: PatientService::new(patient_store.clone(), appointment_store.clone()),
            appointments: AppointmentService::new(
                appointment_store.clone(),
                doctor_store.clone(),
                patient_store.clone(),
            ),
            users: UserService::new(user_store, bcrypt_cost),
            stats: StatsService::new(doctor_store, patient_store, appointment_store),
            db,
        })
    }

    /// Flushes dirty buffers to disk. Called on shutdown.
    pub async fn flush(&self) -> Result<()> {
        let bytes = self.db.flush_async().await?;
        info!("Flushed {} bytes to disk", bytes);
        Ok(())
    }
}
