// models/src/medical/appointment.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationErrors, ValidationResult};
use crate::medical::doctor::DoctorSummary;
use crate::medical::patient::PatientSummary;
use crate::validation;

pub const MAX_NOTES_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    #[serde(rename = "no-show")]
    NoShow,
    Rescheduled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no-show",
            AppointmentStatus::Rescheduled => "rescheduled",
        }
    }

    /// Cancelled appointments never hold their doctor's time slot.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    /// Still expected to take place; completed, no-show and cancelled visits are history.
    pub fn is_pending(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Rescheduled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "no-show" => Ok(AppointmentStatus::NoShow),
            "rescheduled" => Ok(AppointmentStatus::Rescheduled),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    /// `date` and `time` combined; recomputed on every write.
    pub datetime: NaiveDateTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical key of the doctor/date/time triple guarded by the uniqueness index.
pub fn slot_key(doctor_id: &Uuid, date: NaiveDate, time: &str) -> String {
    let time = validation::canonical_time(time).unwrap_or_else(|_| time.to_string());
    format!("{}/{}/{}", doctor_id, date.format("%Y-%m-%d"), time)
}

impl Appointment {
    pub fn from_new_appointment(new: NewAppointment) -> Self {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: new.doctor_id,
            patient_id: new.patient_id,
            datetime: validation::combine_date_time(new.date, &new.time),
            date: new.date,
            time: new.time,
            status: new.status,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn slot_key(&self) -> String {
        slot_key(&self.doctor_id, self.date, &self.time)
    }

    pub fn occupies_slot(&self) -> bool {
        self.status.occupies_slot()
    }

    /// Returns a copy with `patch` merged in. Fields absent from the patch are kept.
    pub fn merged(&self, patch: &AppointmentPatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = patch.doctor_id {
            next.doctor_id = v;
        }
        if let Some(v) = patch.patient_id {
            next.patient_id = v;
        }
        if let Some(v) = patch.date {
            next.date = v;
        }
        if let Some(v) = &patch.time {
            next.time = v.clone();
        }
        if let Some(v) = patch.status {
            next.status = v;
        }
        if let Some(v) = &patch.notes {
            next.notes = Some(v.clone());
        }
        next.datetime = validation::combine_date_time(next.date, &next.time);
        next.updated_at = Utc::now();
        next
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentPatch {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

impl AppointmentPatch {
    /// Whether the patch moves the appointment to a possibly different doctor slot.
    pub fn touches_slot(&self) -> bool {
        self.doctor_id.is_some() || self.date.is_some() || self.time.is_some()
    }
}

/// Raw appointment payload. Shared by create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl AppointmentInput {
    /// Validates a booking request. `today` is the local calendar day used for
    /// the not-in-the-past rule.
    pub fn validate_new(&self, today: NaiveDate) -> ValidationResult<NewAppointment> {
        let mut errors = ValidationErrors::new();
        let p = self.check_fields(&mut errors, today, true);
        match (p.doctor_id, p.patient_id, p.date, p.time) {
            (Some(doctor_id), Some(patient_id), Some(date), Some(time)) if errors.is_empty() => {
                Ok(NewAppointment {
                    doctor_id,
                    patient_id,
                    date,
                    time,
                    status: p.status.unwrap_or_default(),
                    notes: p.notes,
                })
            }
            _ => Err(errors),
        }
    }

    pub fn validate_patch(&self, today: NaiveDate) -> ValidationResult<AppointmentPatch> {
        let mut errors = ValidationErrors::new();
        let patch = self.check_fields(&mut errors, today, false);
        errors.finish(patch)
    }

    fn check_fields(
        &self,
        errors: &mut ValidationErrors,
        today: NaiveDate,
        required: bool,
    ) -> AppointmentPatch {
        let mut patch = AppointmentPatch::default();

        match self.doctor_id.as_deref() {
            Some(raw) => match validation::parse_uuid(raw) {
                Ok(id) => patch.doctor_id = Some(id),
                Err(_) => errors.push("doctorId", "Invalid doctor ID format"),
            },
            None if required => errors.push("doctorId", "Required"),
            None => {}
        }

        match self.patient_id.as_deref() {
            Some(raw) => match validation::parse_uuid(raw) {
                Ok(id) => patch.patient_id = Some(id),
                Err(_) => errors.push("patientId", "Invalid patient ID format"),
            },
            None if required => errors.push("patientId", "Required"),
            None => {}
        }

        match self.date.as_deref() {
            Some(raw) => match validation::parse_date(raw) {
                Ok(date) if date < today => {
                    errors.push("date", "Appointment date cannot be in the past")
                }
                Ok(date) => patch.date = Some(date),
                Err(_) => errors.push("date", "Invalid date"),
            },
            None if required => errors.push("date", "Required"),
            None => {}
        }

        match self.time.as_deref() {
            Some(raw) if validation::is_valid_time(raw) => patch.time = Some(raw.to_string()),
            Some(_) => errors.push("time", "Time must be in HH:MM format (24-hour)"),
            None if required => errors.push("time", "Required"),
            None => {}
        }

        if let Some(raw) = self.status.as_deref() {
            match raw.parse::<AppointmentStatus>() {
                Ok(status) => patch.status = Some(status),
                Err(_) => errors.push("status", "Please select a valid appointment status"),
            }
        }

        if let Some(notes) = self.notes.as_deref() {
            if validation::char_len(notes) > MAX_NOTES_LEN {
                errors.push("notes", "Notes cannot exceed 500 characters");
            } else {
                patch.notes = Some(notes.to_string());
            }
        }

        patch
    }
}

/// Body of the dedicated status-update action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusInput {
    pub status: Option<String>,
}

/// An appointment as returned by read endpoints, with the referenced people summarised.
/// A summary is `None` when its record no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: Option<DoctorSummary>,
    pub patient: Option<PatientSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 10).unwrap()
    }

    fn input(date: &str, time: &str) -> AppointmentInput {
        AppointmentInput {
            doctor_id: Some(Uuid::new_v4().to_string()),
            patient_id: Some(Uuid::new_v4().to_string()),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            status: None,
            notes: None,
        }
    }

    #[test]
    fn should_default_status_to_scheduled() {
        let new = input("2026-06-11", "09:00").validate_new(today()).unwrap();
        assert_eq!(new.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn should_accept_today() {
        assert!(input("2026-06-10", "23:59").validate_new(today()).is_ok());
    }

    #[test]
    fn should_reject_past_date() {
        let errors = input("2026-06-09", "10:00").validate_new(today()).unwrap_err();
        assert!(errors.has_path("date"));
    }

    #[test]
    fn should_reject_malformed_times() {
        for bad in ["25:61", "9:5", "24:00", "noon"] {
            let errors = input("2026-06-11", bad).validate_new(today()).unwrap_err();
            assert!(errors.has_path("time"), "{bad} should fail");
        }
    }

    #[test]
    fn should_reject_bad_ids_and_status() {
        let mut bad = input("2026-06-11", "09:00");
        bad.doctor_id = Some("not-an-id".to_string());
        bad.status = Some("postponed".to_string());
        let errors = bad.validate_new(today()).unwrap_err();
        assert!(errors.has_path("doctorId"));
        assert!(errors.has_path("status"));
    }

    #[test]
    fn should_reject_long_notes() {
        let mut long = input("2026-06-11", "09:00");
        long.notes = Some("x".repeat(MAX_NOTES_LEN + 1));
        assert!(long.validate_new(today()).unwrap_err().has_path("notes"));
    }

    #[test]
    fn should_collect_all_missing_fields() {
        let errors = AppointmentInput::default().validate_new(today()).unwrap_err();
        assert_eq!(errors.fields().len(), 4);
    }

    #[test]
    fn should_derive_datetime_and_slot_key() {
        let new = input("2026-06-11", "9:05").validate_new(today()).unwrap();
        let appt = Appointment::from_new_appointment(new);
        assert_eq!(appt.datetime, today().succ_opt().unwrap().and_hms_opt(9, 5, 0).unwrap());
        assert!(appt.slot_key().ends_with("/2026-06-11/09:05"));
    }

    #[test]
    fn should_merge_only_present_fields() {
        let appt = Appointment::from_new_appointment(
            input("2026-06-11", "09:00").validate_new(today()).unwrap(),
        );
        let patch = AppointmentInput {
            time: Some("10:30".to_string()),
            ..Default::default()
        }
        .validate_patch(today())
        .unwrap();
        assert!(patch.touches_slot());
        let merged = appt.merged(&patch);
        assert_eq!(merged.time, "10:30");
        assert_eq!(merged.date, appt.date);
        assert_eq!(merged.doctor_id, appt.doctor_id);
        assert_eq!(merged.datetime, appt.date.and_hms_opt(10, 30, 0).unwrap());
        assert!(merged.updated_at >= appt.updated_at - Duration::seconds(1));
    }

    #[test]
    fn should_serialize_no_show_with_hyphen() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::NoShow).unwrap(),
            "\"no-show\""
        );
        assert!(!AppointmentStatus::Cancelled.occupies_slot());
        assert!(AppointmentStatus::Rescheduled.occupies_slot());
    }
}
