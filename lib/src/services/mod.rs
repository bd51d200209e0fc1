// lib/src/services/mod.rs
//! Per-entity business rules layered over the storage engines. Format checks
//! live in `models`; everything that needs the store (existence, uniqueness,
//! slot conflicts) happens here.

pub mod appointment_service;
pub mod doctor_service;
pub mod patient_service;
pub mod stats_service;
pub mod user_service;

pub use appointment_service::{AppointmentService, RecentQuery};
pub use doctor_service::DoctorService;
pub use patient_service::PatientService;
pub use stats_service::{Stats, StatsService};
pub use user_service::UserService;

use models::medical::Appointment;

use crate::errors::{HospitalError, Result};
use crate::storage_engine::AppointmentStorageEngine;

/// Case-insensitive substring match used by the name searches.
pub(crate) fn name_matches(name: &str, fragment: &str) -> bool {
    name.to_lowercase().contains(&fragment.trim().to_lowercase())
}

/// Rejects deletion of a doctor or patient still referenced by a pending appointment.
pub(crate) async fn ensure_unreferenced<F>(
    appointments: &dyn AppointmentStorageEngine,
    references: F,
    message: &str,
) -> Result<()>
where
    F: Fn(&Appointment) -> bool + Send + Sync,
{
    let pending = appointments
        .list_appointments()
        .await?
        .into_iter()
        .any(|a| a.status.is_pending() && references(&a));
    if pending {
        return Err(HospitalError::Conflict(message.to_string()));
    }
    Ok(())
}
