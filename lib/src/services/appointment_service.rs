// lib/src/services/appointment_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use models::medical::{
    Appointment, AppointmentInput, AppointmentStatus, AppointmentView, Doctor, DoctorSummary,
    Patient, PatientSummary, StatusInput,
};
use models::{validation, ValidationErrors};

use crate::errors::{HospitalError, Result};
use crate::storage_engine::{AppointmentStorageEngine, DocumentStorageEngine, SLOT_TAKEN};

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_RECENT_DAYS: i64 = 30;

/// Filters accepted by the recent-appointments listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentQuery {
    pub days: Option<i64>,
    pub limit: Option<usize>,
    pub status: Option<String>,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub upcoming: Option<bool>,
}

pub struct AppointmentService {
    appointments: Arc<dyn AppointmentStorageEngine>,
    doctors: Arc<dyn DocumentStorageEngine<Doctor>>,
    patients: Arc<dyn DocumentStorageEngine<Patient>>,
}

fn not_found() -> HospitalError {
    HospitalError::NotFound("Appointment not found".to_string())
}

fn by_datetime(a: &Appointment, b: &Appointment) -> std::cmp::Ordering {
    a.datetime.cmp(&b.datetime).then_with(|| a.created_at.cmp(&b.created_at))
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentStorageEngine>,
        doctors: Arc<dyn DocumentStorageEngine<Doctor>>,
        patients: Arc<dyn DocumentStorageEngine<Patient>>,
    ) -> Self {
        Self {
            appointments,
            doctors,
            patients,
        }
    }

    pub async fn create(&self, input: &AppointmentInput) -> Result<Appointment> {
        self.create_on(input, Local::now().date_naive()).await
    }

    /// Books an appointment, judging "in the past" against `today`.
    pub async fn create_on(&self, input: &AppointmentInput, today: NaiveDate) -> Result<Appointment> {
        let new = input.validate_new(today)?;
        self.require_doctor(&new.doctor_id).await?;
        self.require_patient(&new.patient_id).await?;

        let appointment = Appointment::from_new_appointment(new);
        if appointment.occupies_slot() {
            self.check_slot(&appointment).await?;
        }
        self.appointments.insert_appointment(&appointment).await?;
        info!(
            "Booked appointment {} for doctor {} at {}",
            appointment.id,
            appointment.doctor_id,
            appointment.slot_key()
        );
        Ok(appointment)
    }

    pub async fn update(&self, id: &Uuid, input: &AppointmentInput) -> Result<Appointment> {
        self.update_on(id, input, Local::now().date_naive()).await
    }

    pub async fn update_on(
        &self,
        id: &Uuid,
        input: &AppointmentInput,
        today: NaiveDate,
    ) -> Result<Appointment> {
        let patch = input.validate_patch(today)?;
        let current = self.appointments.get_appointment(id).await?.ok_or_else(not_found)?;

        if let Some(doctor_id) = &patch.doctor_id {
            self.require_doctor(doctor_id).await?;
        }
        if let Some(patient_id) = &patch.patient_id {
            self.require_patient(patient_id).await?;
        }

        let next = current.merged(&patch);
        let reclaims = !current.occupies_slot() && next.occupies_slot();
        if next.occupies_slot() && (patch.touches_slot() || reclaims) {
            self.check_slot(&next).await?;
        }
        self.appointments.replace_appointment(&next).await?;
        Ok(next)
    }

    /// Sets only the status. Any status may follow any other.
    pub async fn update_status(&self, id: &Uuid, input: &StatusInput) -> Result<Appointment> {
        let mut errors = ValidationErrors::new();
        let Some(raw) = input.status.as_deref() else {
            errors.push("status", "Status is required");
            return Err(errors.into());
        };
        let status: AppointmentStatus = match raw.parse() {
            Ok(status) => status,
            Err(_) => {
                errors.push("status", "Please select a valid appointment status");
                return Err(errors.into());
            }
        };

        let mut appointment = self.appointments.get_appointment(id).await?.ok_or_else(not_found)?;
        let reclaims = !appointment.occupies_slot() && status.occupies_slot();
        appointment.status = status;
        appointment.updated_at = Utc::now();
        if reclaims {
            self.check_slot(&appointment).await?;
        }
        self.appointments.replace_appointment(&appointment).await?;
        info!("Appointment {} is now {}", appointment.id, status);
        Ok(appointment)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<()> {
        self.appointments.remove_appointment(id).await?.ok_or_else(not_found)?;
        info!("Deleted appointment {}", id);
        Ok(())
    }

    pub async fn get(&self, id: &Uuid) -> Result<AppointmentView> {
        let appointment = self.appointments.get_appointment(id).await?.ok_or_else(not_found)?;
        let mut views = self.populate(vec![appointment]).await?;
        views.pop().ok_or_else(not_found)
    }

    pub async fn list(&self) -> Result<Vec<AppointmentView>> {
        self.select(|_| true).await
    }

    pub async fn by_doctor(&self, doctor_id: &Uuid) -> Result<Vec<AppointmentView>> {
        let id = *doctor_id;
        self.select(move |a| a.doctor_id == id).await
    }

    pub async fn by_patient(&self, patient_id: &Uuid) -> Result<Vec<AppointmentView>> {
        let id = *patient_id;
        self.select(move |a| a.patient_id == id).await
    }

    pub async fn by_date(&self, date: NaiveDate) -> Result<Vec<AppointmentView>> {
        self.select(move |a| a.date == date).await
    }

    pub async fn upcoming(&self, limit: Option<usize>) -> Result<Vec<AppointmentView>> {
        self.upcoming_from(Local::now().date_naive(), limit).await
    }

    /// Non-cancelled appointments dated `today` or later, soonest first.
    pub async fn upcoming_from(
        &self,
        today: NaiveDate,
        limit: Option<usize>,
    ) -> Result<Vec<AppointmentView>> {
        let mut upcoming: Vec<Appointment> = self
            .appointments
            .list_appointments()
            .await?
            .into_iter()
            .filter(|a| a.date >= today && a.occupies_slot())
            .collect();
        upcoming.sort_by(by_datetime);
        upcoming.truncate(limit.unwrap_or(DEFAULT_LIMIT));
        self.populate(upcoming).await
    }

    pub async fn recent(&self, query: &RecentQuery) -> Result<Vec<AppointmentView>> {
        self.recent_at(query, Local::now().naive_local()).await
    }

    /// With `upcoming` (the default) returns appointments in `[now, now + days]`
    /// soonest first; otherwise those in `[now - days, now]` latest first.
    pub async fn recent_at(
        &self,
        query: &RecentQuery,
        now: NaiveDateTime,
    ) -> Result<Vec<AppointmentView>> {
        let days = query.days.unwrap_or(DEFAULT_RECENT_DAYS);
        if days < 0 {
            return Err(HospitalError::BadRequest("days must not be negative".to_string()));
        }
        let status = match query.status.as_deref() {
            Some(raw) => Some(raw.parse::<AppointmentStatus>().map_err(|_| {
                HospitalError::BadRequest(format!("Invalid appointment status: {}", raw))
            })?),
            None => None,
        };
        let doctor_id = parse_filter_id(query.doctor_id.as_deref(), "doctor")?;
        let patient_id = parse_filter_id(query.patient_id.as_deref(), "patient")?;
        let upcoming = query.upcoming.unwrap_or(true);

        let out_of_range = || HospitalError::BadRequest("days out of range".to_string());
        let window = Duration::try_days(days).ok_or_else(out_of_range)?;
        let (from, to) = if upcoming {
            (now, now.checked_add_signed(window).ok_or_else(out_of_range)?)
        } else {
            (now.checked_sub_signed(window).ok_or_else(out_of_range)?, now)
        };

        let mut matches: Vec<Appointment> = self
            .appointments
            .list_appointments()
            .await?
            .into_iter()
            .filter(|a| a.datetime >= from && a.datetime <= to)
            .filter(|a| status.map_or(true, |s| a.status == s))
            .filter(|a| doctor_id.map_or(true, |id| a.doctor_id == id))
            .filter(|a| patient_id.map_or(true, |id| a.patient_id == id))
            .collect();

        matches.sort_by(by_datetime);
        if !upcoming {
            matches.reverse();
        }
        matches.truncate(query.limit.unwrap_or(DEFAULT_LIMIT));
        self.populate(matches).await
    }

    pub async fn count(&self) -> Result<usize> {
        self.appointments.count_appointments().await
    }

    pub async fn count_on(&self, date: NaiveDate) -> Result<usize> {
        Ok(self
            .appointments
            .list_appointments()
            .await?
            .iter()
            .filter(|a| a.date == date)
            .count())
    }

    async fn select<F>(&self, keep: F) -> Result<Vec<AppointmentView>>
    where
        F: Fn(&Appointment) -> bool + Send + Sync,
    {
        let mut selected: Vec<Appointment> = self
            .appointments
            .list_appointments()
            .await?
            .into_iter()
            .filter(|a| keep(a))
            .collect();
        selected.sort_by(by_datetime);
        self.populate(selected).await
    }

    /// Attaches doctor and patient summaries. Dangling references become `None`.
    async fn populate(&self, appointments: Vec<Appointment>) -> Result<Vec<AppointmentView>> {
        let mut doctors: HashMap<Uuid, Option<DoctorSummary>> = HashMap::new();
        let mut patients: HashMap<Uuid, Option<PatientSummary>> = HashMap::new();
        let mut views = Vec::with_capacity(appointments.len());

        for appointment in appointments {
            if !doctors.contains_key(&appointment.doctor_id) {
                let summary = self.doctors.get(&appointment.doctor_id).await?;
                doctors.insert(appointment.doctor_id, summary.as_ref().map(DoctorSummary::from));
            }
            if !patients.contains_key(&appointment.patient_id) {
                let summary = self.patients.get(&appointment.patient_id).await?;
                patients.insert(appointment.patient_id, summary.as_ref().map(PatientSummary::from));
            }
            views.push(AppointmentView {
                doctor: doctors.get(&appointment.doctor_id).cloned().flatten(),
                patient: patients.get(&appointment.patient_id).cloned().flatten(),
                appointment,
            });
        }
        Ok(views)
    }

    async fn require_doctor(&self, id: &Uuid) -> Result<()> {
        match self.doctors.get(id).await? {
            Some(_) => Ok(()),
            None => Err(HospitalError::NotFound("Doctor not found".to_string())),
        }
    }

    async fn require_patient(&self, id: &Uuid) -> Result<()> {
        match self.patients.get(id).await? {
            Some(_) => Ok(()),
            None => Err(HospitalError::NotFound("Patient not found".to_string())),
        }
    }

    /// Advisory check for a friendlier error; the slot index is the real guard.
    async fn check_slot(&self, appointment: &Appointment) -> Result<()> {
        match self.appointments.slot_holder(&appointment.slot_key()).await? {
            Some(holder) if holder != appointment.id => {
                warn!("Slot {} already held by {}", appointment.slot_key(), holder);
                Err(HospitalError::Conflict(SLOT_TAKEN.to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn parse_filter_id(raw: Option<&str>, label: &str) -> Result<Option<Uuid>> {
    match raw {
        Some(raw) => validation::parse_uuid(raw)
            .map(Some)
            .map_err(|_| HospitalError::BadRequest(format!("Invalid {} ID format", label))),
        None => Ok(None),
    }
}
