// lib/src/lib.rs
//! Persistence and service layer for the hospital backend.

pub mod database;
pub mod errors;
pub mod services;
pub mod storage_engine;

pub use crate::database::{Database, DatabaseConfig, DEFAULT_BCRYPT_COST};
pub use crate::errors::{HospitalError, Result};
pub use crate::services::{RecentQuery, Stats};
pub use crate::storage_engine::{open_sled_db, AppointmentStorageEngine, DocumentStorageEngine};
