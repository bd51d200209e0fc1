// lib/src/services/patient_service.rs

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info;
use uuid::Uuid;

use models::medical::{Patient, PatientInput};

use crate::errors::{HospitalError, Result};
use crate::services::{ensure_unreferenced, name_matches};
use crate::storage_engine::{AppointmentStorageEngine, DocumentStorageEngine};

pub struct PatientService {
    patients: Arc<dyn DocumentStorageEngine<Patient>>,
    appointments: Arc<dyn AppointmentStorageEngine>,
}

fn duplicate_email(email: &str) -> HospitalError {
    HospitalError::Conflict(format!("A patient with email {} already exists", email))
}

impl PatientService {
    pub fn new(
        patients: Arc<dyn DocumentStorageEngine<Patient>>,
        appointments: Arc<dyn AppointmentStorageEngine>,
    ) -> Self {
        Self { patients, appointments }
    }

    pub async fn create(&self, input: &PatientInput) -> Result<Patient> {
        self.create_on(input, Local::now().date_naive()).await
    }

    /// Same as [`create`](Self::create) with an explicit "today" for the birthdate rule.
    pub async fn create_on(&self, input: &PatientInput, today: NaiveDate) -> Result<Patient> {
        let new_patient = input.validate_new(today)?;
        if self.patients.find_by_email(&new_patient.email).await?.is_some() {
            return Err(duplicate_email(&new_patient.email));
        }
        let patient = Patient::from_new_patient(new_patient);
        self.patients.insert(&patient).await?;
        info!("Created patient {}", patient.id);
        Ok(patient)
    }

    pub async fn get(&self, id: &Uuid) -> Result<Patient> {
        self.patients
            .get(id)
            .await?
            .ok_or_else(|| HospitalError::NotFound("Patient not found".to_string()))
    }

    /// All patients, newest first.
    pub async fn list(&self) -> Result<Vec<Patient>> {
        let mut patients = self.patients.list().await?;
        patients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(patients)
    }

    pub async fn update(&self, id: &Uuid, input: &PatientInput) -> Result<Patient> {
        let patch = input.validate_patch(Local::now().date_naive())?;
        let mut patient = self.get(id).await?;
        if let Some(email) = &patch.email {
            if let Some(other) = self.patients.find_by_email(email).await? {
                if other.id != patient.id {
                    return Err(duplicate_email(email));
                }
            }
        }
        patient.apply(patch);
        self.patients.replace(&patient).await?;
        Ok(patient)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<Patient> {
        self.get(id).await?;
        let id = *id;
        ensure_unreferenced(
            self.appointments.as_ref(),
            move |a| a.patient_id == id,
            "Patient has scheduled appointments and cannot be deleted",
        )
        .await?;
        let removed = self
            .patients
            .remove(&id)
            .await?
            .ok_or_else(|| HospitalError::NotFound("Patient not found".to_string()))?;
        info!("Deleted patient {}", id);
        Ok(removed)
    }

    pub async fn search(&self, fragment: &str) -> Result<Vec<Patient>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|p| name_matches(&p.name, fragment))
            .collect())
    }

    pub async fn count(&self) -> Result<usize> {
        self.patients.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn input(name: &str, email: &str) -> PatientInput {
        PatientInput {
            name: Some(name.to_string()),
            birthdate: Some("1985-04-12".to_string()),
            gender: Some("female".to_string()),
            email: Some(email.to_string()),
            phone: Some("555-123-4567".to_string()),
            allergies: Some(vec!["Penicillin".to_string(), " Penicillin ".to_string()]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn should_store_normalised_and_deduplicated_patient() {
        let db = Database::temporary().unwrap();
        let patient = db.patients.create(&input("Ada Lovelace", "Ada@Example.com ")).await.unwrap();
        assert_eq!(patient.email, "ada@example.com");
        assert_eq!(patient.allergies, vec!["Penicillin".to_string()]);
        assert_eq!(db.patients.get(&patient.id).await.unwrap(), patient);
    }

    #[tokio::test]
    async fn should_reject_duplicate_email() {
        let db = Database::temporary().unwrap();
        db.patients.create(&input("Ada Lovelace", "A@x.com")).await.unwrap();
        let err = db.patients.create(&input("Alan Turing", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, HospitalError::Conflict(_)));
    }

    #[tokio::test]
    async fn should_apply_partial_update() {
        let db = Database::temporary().unwrap();
        let patient = db.patients.create(&input("Ada Lovelace", "ada@x.com")).await.unwrap();
        let patch = PatientInput {
            status: Some("admitted".to_string()),
            ..Default::default()
        };
        let updated = db.patients.update(&patient.id, &patch).await.unwrap();
        assert_eq!(updated.status.as_str(), "admitted");
        assert_eq!(updated.name, patient.name);
        assert_eq!(updated.email, patient.email);
    }

    #[tokio::test]
    async fn should_search_and_delete() {
        let db = Database::temporary().unwrap();
        let ada = db.patients.create(&input("Ada Lovelace", "ada@x.com")).await.unwrap();
        db.patients.create(&input("Alan Turing", "alan@x.com")).await.unwrap();

        assert_eq!(db.patients.search("love").await.unwrap().len(), 1);
        db.patients.delete(&ada.id).await.unwrap();
        assert!(matches!(
            db.patients.get(&ada.id).await,
            Err(HospitalError::NotFound(_))
        ));
        assert!(matches!(
            db.patients.delete(&ada.id).await,
            Err(HospitalError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_block_deletion_only_while_visits_are_pending() {
        use models::medical::{AppointmentInput, DoctorInput, StatusInput};

        let db = Database::temporary().unwrap();
        let patient = db.patients.create(&input("Ada Lovelace", "ada@x.com")).await.unwrap();
        let doctor = db
            .doctors
            .create(&DoctorInput {
                name: Some("John Smith".to_string()),
                specialty: Some("Cardiology".to_string()),
                email: Some("js@h.com".to_string()),
                phone: Some("+15551234567".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let appointment = db
            .appointments
            .create(&AppointmentInput {
                doctor_id: Some(doctor.id.to_string()),
                patient_id: Some(patient.id.to_string()),
                date: Some("2099-01-05".to_string()),
                time: Some("10:00".to_string()),
                status: Some("rescheduled".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(matches!(
            db.patients.delete(&patient.id).await,
            Err(HospitalError::Conflict(_))
        ));

        let no_show = StatusInput {
            status: Some("no-show".to_string()),
        };
        db.appointments.update_status(&appointment.id, &no_show).await.unwrap();
        db.patients.delete(&patient.id).await.unwrap();
    }
}
