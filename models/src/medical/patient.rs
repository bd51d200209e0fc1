// models/src/medical/patient.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationErrors, ValidationResult};
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    Admitted,
    Discharged,
    #[default]
    Outpatient,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Admitted => "admitted",
            PatientStatus::Discharged => "discharged",
            PatientStatus::Outpatient => "outpatient",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admitted" => Ok(PatientStatus::Admitted),
            "discharged" => Ok(PatientStatus::Discharged),
            "outpatient" => Ok(PatientStatus::Outpatient),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub birthdate: NaiveDate,
    pub gender: Gender,
    pub status: PatientStatus,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub emergency_name: Option<String>,
    pub emergency_phone: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
    pub medical_history: Vec<String>,
    pub treatments: Vec<String>,
    pub medical_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub birthdate: NaiveDate,
    pub gender: Gender,
    pub status: PatientStatus,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub emergency_name: Option<String>,
    pub emergency_phone: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
    pub medical_history: Vec<String>,
    pub treatments: Vec<String>,
    pub medical_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub status: Option<PatientStatus>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub emergency_name: Option<String>,
    pub emergency_phone: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub medical_history: Option<Vec<String>>,
    pub treatments: Option<Vec<String>>,
    pub medical_notes: Option<String>,
}

impl Patient {
    pub fn from_new_patient(new_patient: NewPatient) -> Self {
        let now = Utc::now();
        Patient {
            id: Uuid::new_v4(),
            name: new_patient.name,
            birthdate: new_patient.birthdate,
            gender: new_patient.gender,
            status: new_patient.status,
            email: new_patient.email,
            phone: new_patient.phone,
            address: new_patient.address,
            emergency_name: new_patient.emergency_name,
            emergency_phone: new_patient.emergency_phone,
            blood_type: new_patient.blood_type,
            allergies: validation::dedup_trimmed(&new_patient.allergies),
            medical_history: validation::dedup_trimmed(&new_patient.medical_history),
            treatments: validation::dedup_trimmed(&new_patient.treatments),
            medical_notes: new_patient.medical_notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: PatientPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.birthdate {
            self.birthdate = v;
        }
        if let Some(v) = patch.gender {
            self.gender = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if patch.address.is_some() {
            self.address = patch.address;
        }
        if patch.emergency_name.is_some() {
            self.emergency_name = patch.emergency_name;
        }
        if patch.emergency_phone.is_some() {
            self.emergency_phone = patch.emergency_phone;
        }
        if patch.blood_type.is_some() {
            self.blood_type = patch.blood_type;
        }
        if let Some(v) = patch.allergies {
            self.allergies = validation::dedup_trimmed(&v);
        }
        if let Some(v) = patch.medical_history {
            self.medical_history = validation::dedup_trimmed(&v);
        }
        if let Some(v) = patch.treatments {
            self.treatments = validation::dedup_trimmed(&v);
        }
        if patch.medical_notes.is_some() {
            self.medical_notes = patch.medical_notes;
        }
        self.updated_at = Utc::now();
    }
}

/// Raw patient payload. Shared by create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    pub name: Option<String>,
    pub birthdate: Option<String>,
    pub gender: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub emergency_name: Option<String>,
    pub emergency_phone: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub medical_history: Option<Vec<String>>,
    pub treatments: Option<Vec<String>>,
    pub medical_notes: Option<String>,
}

impl PatientInput {
    pub fn validate_new(&self, today: NaiveDate) -> ValidationResult<NewPatient> {
        let mut errors = ValidationErrors::new();
        let p = self.check_fields(&mut errors, today, true);
        match (p.name, p.birthdate, p.gender, p.email, p.phone) {
            (Some(name), Some(birthdate), Some(gender), Some(email), Some(phone))
                if errors.is_empty() =>
            {
                Ok(NewPatient {
                    name,
                    birthdate,
                    gender,
                    status: p.status.unwrap_or_default(),
                    email,
                    phone,
                    address: p.address,
                    emergency_name: p.emergency_name,
                    emergency_phone: p.emergency_phone,
                    blood_type: p.blood_type,
                    allergies: p.allergies.unwrap_or_default(),
                    medical_history: p.medical_history.unwrap_or_default(),
                    treatments: p.treatments.unwrap_or_default(),
                    medical_notes: p.medical_notes,
                })
            }
            _ => Err(errors),
        }
    }

    pub fn validate_patch(&self, today: NaiveDate) -> ValidationResult<PatientPatch> {
        let mut errors = ValidationErrors::new();
        let patch = self.check_fields(&mut errors, today, false);
        errors.finish(patch)
    }

    fn check_fields(
        &self,
        errors: &mut ValidationErrors,
        today: NaiveDate,
        required: bool,
    ) -> PatientPatch {
        let mut patch = PatientPatch::default();

        match self.name.as_deref().map(str::trim) {
            Some(name) => {
                if let Some(msg) = name_problem(name, "Name", 2, 100) {
                    errors.push("name", msg);
                } else {
                    patch.name = Some(name.to_string());
                }
            }
            None if required => errors.push("name", "This field is required"),
            None => {}
        }

        match self.birthdate.as_deref() {
            Some(raw) => match validation::parse_date(raw) {
                Ok(date) if date > today => errors.push("birthdate", "Invalid birthdate."),
                Ok(date) => patch.birthdate = Some(date),
                Err(_) => errors.push("birthdate", "Please select a date"),
            },
            None if required => errors.push("birthdate", "Please select a date"),
            None => {}
        }

        match self.gender.as_deref() {
            Some(raw) => match raw.parse::<Gender>() {
                Ok(g) => patch.gender = Some(g),
                Err(_) => errors.push("gender", "Gender must be one of: male, female, other"),
            },
            None if required => errors.push("gender", "This field is required"),
            None => {}
        }

        if let Some(raw) = self.status.as_deref() {
            match raw.parse::<PatientStatus>() {
                Ok(s) => patch.status = Some(s),
                Err(_) => errors.push(
                    "status",
                    "Status must be one of: admitted, discharged, outpatient",
                ),
            }
        }

        match self.email.as_deref().map(str::trim) {
            Some(email) if validation::char_len(email) > 100 => {
                errors.push("email", "Email cannot exceed 100 characters")
            }
            Some(email) if validation::is_valid_email(email) => {
                patch.email = Some(validation::normalize_email(email));
            }
            Some(_) => errors.push("email", "Please enter a valid email address"),
            None if required => errors.push("email", "This field is required"),
            None => {}
        }

        match self.phone.as_deref().map(str::trim) {
            Some(phone) => {
                if let Some(msg) = phone_problem(phone, "Phone number") {
                    errors.push("phone", msg);
                } else {
                    patch.phone = Some(phone.to_string());
                }
            }
            None if required => errors.push("phone", "This field is required"),
            None => {}
        }

        if let Some(address) = self.address.as_deref().map(str::trim) {
            let len = validation::char_len(address);
            if len < 5 {
                errors.push("address", "Address must be at least 5 characters long");
            } else if len > 200 {
                errors.push("address", "Address cannot exceed 200 characters");
            } else {
                patch.address = Some(address.to_string());
            }
        }

        if let Some(name) = self.emergency_name.as_deref().map(str::trim) {
            if let Some(msg) = name_problem(name, "Emergency contact name", 0, 100) {
                errors.push("emergencyName", msg);
            } else {
                patch.emergency_name = Some(name.to_string());
            }
        }

        if let Some(phone) = self.emergency_phone.as_deref().map(str::trim) {
            if let Some(msg) = phone_problem(phone, "Emergency phone number") {
                errors.push("emergencyPhone", msg);
            } else {
                patch.emergency_phone = Some(phone.to_string());
            }
        }

        if let Some(blood) = self.blood_type.as_deref() {
            let blood = blood.trim().to_uppercase();
            if validation::is_valid_blood_type(&blood) {
                patch.blood_type = Some(blood);
            } else {
                errors.push(
                    "bloodType",
                    "Blood type must be one of: A+, A-, B+, B-, AB+, AB-, O+, O-",
                );
            }
        }

        patch.allergies = check_list(errors, "allergies", &self.allergies, "Allergy description", 2, 100);
        patch.medical_history = check_list(
            errors,
            "medicalHistory",
            &self.medical_history,
            "Medical history entry",
            3,
            200,
        );
        patch.treatments = check_list(errors, "treatments", &self.treatments, "Treatment description", 3, 200);

        if let Some(notes) = self.medical_notes.as_deref().map(str::trim) {
            if validation::char_len(notes) > 1000 {
                errors.push("medicalNotes", "Medical notes cannot exceed 1000 characters");
            } else {
                patch.medical_notes = Some(notes.to_string());
            }
        }

        patch
    }
}

fn name_problem(name: &str, label: &str, min: usize, max: usize) -> Option<String> {
    let len = validation::char_len(name);
    if len < min {
        Some(format!("{} must be at least {} characters long", label, min))
    } else if len > max {
        Some(format!("{} cannot exceed {} characters", label, max))
    } else if !validation::is_valid_name(name) {
        Some("Name can only contain letters, spaces, hyphens, and apostrophes".to_string())
    } else {
        None
    }
}

fn phone_problem(phone: &str, label: &str) -> Option<String> {
    if validation::char_len(phone) > 20 {
        Some(format!("{} cannot exceed 20 characters", label))
    } else if !validation::is_valid_local_phone(phone) {
        Some("Please enter a valid phone number".to_string())
    } else {
        None
    }
}

fn check_list(
    errors: &mut ValidationErrors,
    path: &str,
    items: &Option<Vec<String>>,
    label: &str,
    min: usize,
    max: usize,
) -> Option<Vec<String>> {
    let items = items.as_ref()?;
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        let len = validation::char_len(item.trim());
        if len < min {
            errors.push(
                format!("{}.{}", path, i),
                format!("{} must be at least {} characters long", label, min),
            );
            ok = false;
        } else if len > max {
            errors.push(
                format!("{}.{}", path, i),
                format!("{} cannot exceed {} characters", label, max),
            );
            ok = false;
        }
    }
    ok.then(|| validation::dedup_trimmed(items))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&Patient> for PatientSummary {
    fn from(p: &Patient) -> Self {
        PatientSummary {
            id: p.id,
            name: p.name.clone(),
            email: p.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn valid_input() -> PatientInput {
        PatientInput {
            name: Some(" Jane Roe ".to_string()),
            birthdate: Some("1990-04-12".to_string()),
            gender: Some("female".to_string()),
            email: Some("Jane.Roe@Mail.com".to_string()),
            phone: Some("555-123-4567".to_string()),
            blood_type: Some("ab+".to_string()),
            allergies: Some(vec!["Penicillin".to_string(), " Penicillin ".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn should_default_status_to_outpatient() {
        let patient = valid_input().validate_new(today()).unwrap();
        assert_eq!(patient.status, PatientStatus::Outpatient);
        assert_eq!(patient.name, "Jane Roe");
        assert_eq!(patient.email, "jane.roe@mail.com");
        assert_eq!(patient.blood_type.as_deref(), Some("AB+"));
    }

    #[test]
    fn should_dedup_lists_on_save() {
        let patient = Patient::from_new_patient(valid_input().validate_new(today()).unwrap());
        assert_eq!(patient.allergies, vec!["Penicillin".to_string()]);
    }

    #[test]
    fn should_reject_future_birthdate() {
        let mut input = valid_input();
        input.birthdate = Some("2026-03-02".to_string());
        let errors = input.validate_new(today()).unwrap_err();
        assert!(errors.has_path("birthdate"));
    }

    #[test]
    fn should_reject_unknown_gender_and_status() {
        let mut input = valid_input();
        input.gender = Some("unknown".to_string());
        input.status = Some("deceased".to_string());
        let errors = input.validate_new(today()).unwrap_err();
        assert!(errors.has_path("gender"));
        assert!(errors.has_path("status"));
    }

    #[test]
    fn should_reject_short_list_items() {
        let input = PatientInput {
            treatments: Some(vec!["ok".to_string()]),
            ..Default::default()
        };
        let errors = input.validate_patch(today()).unwrap_err();
        assert!(errors.has_path("treatments.0"));
    }

    #[test]
    fn should_leave_untouched_fields_on_apply() {
        let mut patient = Patient::from_new_patient(valid_input().validate_new(today()).unwrap());
        let patch = PatientInput {
            status: Some("admitted".to_string()),
            ..Default::default()
        }
        .validate_patch(today())
        .unwrap();
        patient.apply(patch);
        assert_eq!(patient.status, PatientStatus::Admitted);
        assert_eq!(patient.name, "Jane Roe");
        assert_eq!(patient.gender, Gender::Female);
    }
}
