// models/src/medical/doctor.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationErrors, ValidationResult};
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialty {
    Cardiology,
    Dermatology,
    Endocrinology,
    Gastroenterology,
    Neurology,
    #[serde(rename = "Obstetrics and Gynecology")]
    ObstetricsAndGynecology,
    Ophthalmology,
    Orthopedics,
    Pediatrics,
    Psychiatry,
    Urology,
    #[serde(rename = "General Medicine")]
    GeneralMedicine,
    #[serde(rename = "Emergency Medicine")]
    EmergencyMedicine,
    #[serde(rename = "Family Medicine")]
    FamilyMedicine,
    #[serde(rename = "Internal Medicine")]
    InternalMedicine,
    Surgery,
}

impl Specialty {
    pub const ALL: [Specialty; 16] = [
        Specialty::Cardiology,
        Specialty::Dermatology,
        Specialty::Endocrinology,
        Specialty::Gastroenterology,
        Specialty::Neurology,
        Specialty::ObstetricsAndGynecology,
        Specialty::Ophthalmology,
        Specialty::Orthopedics,
        Specialty::Pediatrics,
        Specialty::Psychiatry,
        Specialty::Urology,
        Specialty::GeneralMedicine,
        Specialty::EmergencyMedicine,
        Specialty::FamilyMedicine,
        Specialty::InternalMedicine,
        Specialty::Surgery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Cardiology => "Cardiology",
            Specialty::Dermatology => "Dermatology",
            Specialty::Endocrinology => "Endocrinology",
            Specialty::Gastroenterology => "Gastroenterology",
            Specialty::Neurology => "Neurology",
            Specialty::ObstetricsAndGynecology => "Obstetrics and Gynecology",
            Specialty::Ophthalmology => "Ophthalmology",
            Specialty::Orthopedics => "Orthopedics",
            Specialty::Pediatrics => "Pediatrics",
            Specialty::Psychiatry => "Psychiatry",
            Specialty::Urology => "Urology",
            Specialty::GeneralMedicine => "General Medicine",
            Specialty::EmergencyMedicine => "Emergency Medicine",
            Specialty::FamilyMedicine => "Family Medicine",
            Specialty::InternalMedicine => "Internal Medicine",
            Specialty::Surgery => "Surgery",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specialty::ALL
            .iter()
            .copied()
            .find(|sp| sp.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl FromStr for DayOfWeek {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Monday" => Ok(DayOfWeek::Monday),
            "Tuesday" => Ok(DayOfWeek::Tuesday),
            "Wednesday" => Ok(DayOfWeek::Wednesday),
            "Thursday" => Ok(DayOfWeek::Thursday),
            "Friday" => Ok(DayOfWeek::Friday),
            "Saturday" => Ok(DayOfWeek::Saturday),
            "Sunday" => Ok(DayOfWeek::Sunday),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

/// A recurring weekly availability window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlot {
    pub day: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: Specialty,
    pub email: String,
    pub phone: String,
    pub avatar_url: Option<String>,
    pub available_slots: Vec<AvailableSlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated doctor payload ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctor {
    pub name: String,
    pub specialty: Specialty,
    pub email: String,
    pub phone: String,
    pub avatar_url: Option<String>,
    pub available_slots: Vec<AvailableSlot>,
}

/// A validated partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorPatch {
    pub name: Option<String>,
    pub specialty: Option<Specialty>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub available_slots: Option<Vec<AvailableSlot>>,
}

impl Doctor {
    pub fn from_new_doctor(new_doctor: NewDoctor) -> Self {
        let now = Utc::now();
        Doctor {
            id: Uuid::new_v4(),
            name: new_doctor.name,
            specialty: new_doctor.specialty,
            email: new_doctor.email,
            phone: new_doctor.phone,
            avatar_url: new_doctor.avatar_url,
            available_slots: new_doctor.available_slots,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: DoctorPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(specialty) = patch.specialty {
            self.specialty = specialty;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(avatar_url) = patch.avatar_url {
            self.avatar_url = Some(avatar_url);
        }
        if let Some(slots) = patch.available_slots {
            self.available_slots = slots;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotInput {
    pub day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Raw doctor payload as received over the wire. Shared by create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorInput {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub available_slots: Option<Vec<SlotInput>>,
}

impl DoctorInput {
    /// Validates a full doctor payload; every required field must be present.
    pub fn validate_new(&self) -> ValidationResult<NewDoctor> {
        let mut errors = ValidationErrors::new();
        let patch = self.check_fields(&mut errors, true);
        match (patch.name, patch.specialty, patch.email, patch.phone) {
            (Some(name), Some(specialty), Some(email), Some(phone)) if errors.is_empty() => {
                Ok(NewDoctor {
                    name,
                    specialty,
                    email,
                    phone,
                    avatar_url: patch.avatar_url,
                    available_slots: patch.available_slots.unwrap_or_default(),
                })
            }
            _ => Err(errors),
        }
    }

    /// Validates only the fields present in the payload.
    pub fn validate_patch(&self) -> ValidationResult<DoctorPatch> {
        let mut errors = ValidationErrors::new();
        let patch = self.check_fields(&mut errors, false);
        errors.finish(patch)
    }

    fn check_fields(&self, errors: &mut ValidationErrors, required: bool) -> DoctorPatch {
        let mut patch = DoctorPatch::default();

        match self.name.as_deref().map(str::trim) {
            Some(name) => {
                let len = validation::char_len(name);
                if len < 2 {
                    errors.push("name", "Name must be at least 2 characters long");
                } else if len > 100 {
                    errors.push("name", "Name cannot exceed 100 characters");
                } else if !validation::is_valid_name(name) {
                    errors.push("name", "Name can only contain letters, spaces, hyphens, and apostrophes");
                } else {
                    patch.name = Some(name.to_string());
                }
            }
            None if required => errors.push("name", "Required"),
            None => {}
        }

        match self.specialty.as_deref() {
            Some(raw) => match raw.parse::<Specialty>() {
                Ok(sp) => patch.specialty = Some(sp),
                Err(_) => errors.push("specialty", "Please select a valid medical specialty"),
            },
            None if required => errors.push("specialty", "Required"),
            None => {}
        }

        match self.email.as_deref().map(str::trim) {
            Some(email) if validation::is_valid_email(email) => {
                patch.email = Some(validation::normalize_email(email));
            }
            Some(_) => errors.push("email", "Invalid email format"),
            None if required => errors.push("email", "Required"),
            None => {}
        }

        match self.phone.as_deref().map(str::trim) {
            Some(phone) if validation::is_valid_international_phone(phone) => {
                patch.phone = Some(phone.to_string());
            }
            Some(_) => errors.push("phone", "Invalid phone number format"),
            None if required => errors.push("phone", "Required"),
            None => {}
        }

        if let Some(url) = self.avatar_url.as_deref().map(str::trim) {
            if validation::is_valid_url(url) {
                patch.avatar_url = Some(url.to_string());
            } else {
                errors.push("avatarUrl", "Invalid URL format");
            }
        }

        if let Some(slots) = &self.available_slots {
            patch.available_slots = Some(validate_slots(slots, "availableSlots", errors));
        }

        patch
    }
}

/// Checks a slot list: each window must end after it starts and no weekday may repeat.
pub fn validate_slots(
    slots: &[SlotInput],
    path: &str,
    errors: &mut ValidationErrors,
) -> Vec<AvailableSlot> {
    let mut out = Vec::with_capacity(slots.len());
    for (i, slot) in slots.iter().enumerate() {
        let prefix = format!("{}.{}", path, i);
        let day = match slot.day.as_deref().map(str::parse::<DayOfWeek>) {
            Some(Ok(day)) => Some(day),
            Some(Err(_)) | None => {
                errors.push(format!("{}.day", prefix), "Please provide a valid day of the week");
                None
            }
        };
        let start = slot.start_time.as_deref().filter(|t| validation::is_valid_time(t));
        if start.is_none() {
            errors.push(
                format!("{}.startTime", prefix),
                "Start time must be in HH:MM format (24-hour)",
            );
        }
        let end = slot.end_time.as_deref().filter(|t| validation::is_valid_time(t));
        if end.is_none() {
            errors.push(
                format!("{}.endTime", prefix),
                "End time must be in HH:MM format (24-hour)",
            );
        }
        if let (Some(day), Some(start), Some(end)) = (day, start, end) {
            let start_min = validation::minutes_of_day(start).unwrap_or(0);
            let end_min = validation::minutes_of_day(end).unwrap_or(0);
            if end_min <= start_min {
                errors.push(format!("{}.endTime", prefix), "End time must be after start time");
            } else {
                out.push(AvailableSlot {
                    day,
                    start_time: start.to_string(),
                    end_time: end.to_string(),
                });
            }
        }
    }

    let mut seen: Vec<DayOfWeek> = Vec::new();
    for slot in &out {
        if seen.contains(&slot.day) {
            errors.push(path, "Duplicate days are not allowed in available slots");
            break;
        }
        seen.push(slot.day);
    }
    out
}

/// Projection embedded in appointment reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
    pub specialty: Specialty,
}

impl From<&Doctor> for DoctorSummary {
    fn from(d: &Doctor) -> Self {
        DoctorSummary {
            id: d.id,
            name: d.name.clone(),
            specialty: d.specialty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: &str, start: &str, end: &str) -> SlotInput {
        SlotInput {
            day: Some(day.to_string()),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
        }
    }

    fn valid_input() -> DoctorInput {
        DoctorInput {
            name: Some("Gregory House".to_string()),
            specialty: Some("Internal Medicine".to_string()),
            email: Some("  G.House@Princeton.EDU ".to_string()),
            phone: Some("+15551234567".to_string()),
            avatar_url: None,
            available_slots: Some(vec![slot("Monday", "09:00", "17:00")]),
        }
    }

    #[test]
    fn should_validate_and_normalize_new_doctor() {
        let doctor = valid_input().validate_new().unwrap();
        assert_eq!(doctor.email, "g.house@princeton.edu");
        assert_eq!(doctor.specialty, Specialty::InternalMedicine);
        assert_eq!(doctor.available_slots.len(), 1);
    }

    #[test]
    fn should_report_missing_required_fields() {
        let errors = DoctorInput::default().validate_new().unwrap_err();
        for path in ["name", "specialty", "email", "phone"] {
            assert!(errors.has_path(path), "missing {path}");
        }
    }

    #[test]
    fn should_reject_unknown_specialty() {
        let mut input = valid_input();
        input.specialty = Some("Alchemy".to_string());
        assert!(input.validate_new().unwrap_err().has_path("specialty"));
    }

    #[test]
    fn should_reject_slot_ending_before_start() {
        let mut input = valid_input();
        input.available_slots = Some(vec![slot("Tuesday", "14:00", "09:00")]);
        let errors = input.validate_new().unwrap_err();
        assert!(errors.has_path("availableSlots.0.endTime"));
    }

    #[test]
    fn should_reject_duplicate_slot_days() {
        let mut input = valid_input();
        input.available_slots = Some(vec![
            slot("Friday", "08:00", "10:00"),
            slot("Friday", "12:00", "16:00"),
        ]);
        let errors = input.validate_new().unwrap_err();
        assert!(errors.has_path("availableSlots"));
    }

    #[test]
    fn should_accept_partial_patch() {
        let input = DoctorInput {
            phone: Some("+442071234567".to_string()),
            ..Default::default()
        };
        let patch = input.validate_patch().unwrap();
        assert_eq!(patch.phone.as_deref(), Some("+442071234567"));
        assert!(patch.name.is_none());
    }

    #[test]
    fn should_serialize_specialty_with_spaces() {
        let json = serde_json::to_string(&Specialty::ObstetricsAndGynecology).unwrap();
        assert_eq!(json, "\"Obstetrics and Gynecology\"");
    }
}
