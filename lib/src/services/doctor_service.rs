// lib/src/services/doctor_service.rs

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use models::medical::{validate_slots, Doctor, DoctorInput, SlotInput, Specialty};
use models::ValidationErrors;

use crate::errors::{HospitalError, Result};
use crate::services::{ensure_unreferenced, name_matches};
use crate::storage_engine::{AppointmentStorageEngine, DocumentStorageEngine};

pub struct DoctorService {
    doctors: Arc<dyn DocumentStorageEngine<Doctor>>,
    appointments: Arc<dyn AppointmentStorageEngine>,
}

impl DoctorService {
    pub fn new(
        doctors: Arc<dyn DocumentStorageEngine<Doctor>>,
        appointments: Arc<dyn AppointmentStorageEngine>,
    ) -> Self {
        Self { doctors, appointments }
    }

    pub async fn create(&self, input: &DoctorInput) -> Result<Doctor> {
        let new_doctor = input.validate_new()?;
        if self.doctors.find_by_email(&new_doctor.email).await?.is_some() {
            return Err(HospitalError::Conflict(format!(
                "A doctor with email {} already exists",
                new_doctor.email
            )));
        }
        let doctor = Doctor::from_new_doctor(new_doctor);
        self.doctors.insert(&doctor).await?;
        info!("Created doctor {} ({})", doctor.id, doctor.email);
        Ok(doctor)
    }

    pub async fn get(&self, id: &Uuid) -> Result<Doctor> {
        self.doctors
            .get(id)
            .await?
            .ok_or_else(|| HospitalError::NotFound("Doctor not found".to_string()))
    }

    /// All doctors ordered by name.
    pub async fn list(&self) -> Result<Vec<Doctor>> {
        let mut doctors = self.doctors.list().await?;
        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(doctors)
    }

    pub async fn update(&self, id: &Uuid, input: &DoctorInput) -> Result<Doctor> {
        let patch = input.validate_patch()?;
        let mut doctor = self.get(id).await?;
        if let Some(email) = &patch.email {
            if let Some(other) = self.doctors.find_by_email(email).await? {
                if other.id != doctor.id {
                    return Err(HospitalError::Conflict(format!(
                        "A doctor with email {} already exists",
                        email
                    )));
                }
            }
        }
        doctor.apply(patch);
        self.doctors.replace(&doctor).await?;
        Ok(doctor)
    }

    /// Replaces the doctor's weekly availability wholesale.
    pub async fn update_slots(&self, id: &Uuid, slots: &[SlotInput]) -> Result<Doctor> {
        let mut errors = ValidationErrors::new();
        let slots = validate_slots(slots, "availableSlots", &mut errors);
        let slots = errors.finish(slots)?;

        let mut doctor = self.get(id).await?;
        doctor.available_slots = slots;
        doctor.updated_at = chrono::Utc::now();
        self.doctors.replace(&doctor).await?;
        Ok(doctor)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<Doctor> {
        self.get(id).await?;
        let id = *id;
        ensure_unreferenced(
            self.appointments.as_ref(),
            move |a| a.doctor_id == id,
            "Doctor has scheduled appointments and cannot be deleted",
        )
        .await?;
        let removed = self
            .doctors
            .remove(&id)
            .await?
            .ok_or_else(|| HospitalError::NotFound("Doctor not found".to_string()))?;
        info!("Deleted doctor {}", id);
        Ok(removed)
    }

    pub async fn search(&self, fragment: &str) -> Result<Vec<Doctor>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|d| name_matches(&d.name, fragment))
            .collect())
    }

    pub async fn by_specialty(&self, specialty: &str) -> Result<Vec<Doctor>> {
        let specialty: Specialty = specialty
            .parse()
            .map_err(|_| HospitalError::BadRequest(format!("Unknown specialty: {}", specialty)))?;
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|d| d.specialty == specialty)
            .collect())
    }

    pub async fn count(&self) -> Result<usize> {
        self.doctors.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn input(name: &str, email: &str) -> DoctorInput {
        DoctorInput {
            name: Some(name.to_string()),
            specialty: Some("Cardiology".to_string()),
            email: Some(email.to_string()),
            phone: Some("+15551234567".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn should_reject_case_insensitive_duplicate_email() {
        let db = Database::temporary().unwrap();
        db.doctors.create(&input("John Smith", "A@x.com")).await.unwrap();
        let err = db.doctors.create(&input("Jane Smith", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, HospitalError::Conflict(_)));
    }

    #[tokio::test]
    async fn should_allow_keeping_own_email_on_update() {
        let db = Database::temporary().unwrap();
        let doctor = db.doctors.create(&input("John Smith", "john@h.com")).await.unwrap();
        let other = db.doctors.create(&input("Jane Doe", "jane@h.com")).await.unwrap();

        let patch = DoctorInput {
            email: Some(" JOHN@h.com ".to_string()),
            name: Some("John Q Smith".to_string()),
            ..Default::default()
        };
        let updated = db.doctors.update(&doctor.id, &patch).await.unwrap();
        assert_eq!(updated.name, "John Q Smith");
        assert_eq!(updated.specialty, doctor.specialty);

        let steal = DoctorInput {
            email: Some("john@h.com".to_string()),
            ..Default::default()
        };
        let err = db.doctors.update(&other.id, &steal).await.unwrap_err();
        assert!(matches!(err, HospitalError::Conflict(_)));
    }

    #[tokio::test]
    async fn should_search_names_case_insensitively() {
        let db = Database::temporary().unwrap();
        db.doctors.create(&input("John Smith", "js@h.com")).await.unwrap();
        db.doctors.create(&input("Anna Smithers", "as@h.com")).await.unwrap();
        db.doctors.create(&input("Bob Jones", "bj@h.com")).await.unwrap();

        let found = db.doctors.search("SMITH").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|d| d.name.to_lowercase().contains("smith")));
    }

    #[tokio::test]
    async fn should_filter_by_specialty() {
        let db = Database::temporary().unwrap();
        db.doctors.create(&input("John Smith", "js@h.com")).await.unwrap();
        let mut derm = input("Dana Skin", "ds@h.com");
        derm.specialty = Some("Dermatology".to_string());
        db.doctors.create(&derm).await.unwrap();

        let cardio = db.doctors.by_specialty("Cardiology").await.unwrap();
        assert_eq!(cardio.len(), 1);
        assert!(matches!(
            db.doctors.by_specialty("Astrology").await,
            Err(HospitalError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn should_validate_slot_replacement() {
        let db = Database::temporary().unwrap();
        let doctor = db.doctors.create(&input("John Smith", "js@h.com")).await.unwrap();

        let slot = |day: &str, start: &str, end: &str| SlotInput {
            day: Some(day.to_string()),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
        };
        let updated = db
            .doctors
            .update_slots(&doctor.id, &[slot("Monday", "09:00", "17:00")])
            .await
            .unwrap();
        assert_eq!(updated.available_slots.len(), 1);

        let err = db
            .doctors
            .update_slots(&doctor.id, &[slot("Monday", "09:00", "12:00"), slot("Monday", "13:00", "17:00")])
            .await
            .unwrap_err();
        assert!(matches!(err, HospitalError::Validation(_)));
    }

    #[tokio::test]
    async fn should_allow_deleting_doctor_with_only_completed_history() {
        use models::medical::{AppointmentInput, PatientInput, StatusInput};

        let db = Database::temporary().unwrap();
        let doctor = db.doctors.create(&input("John Smith", "js@h.com")).await.unwrap();
        let patient = db
            .patients
            .create(&PatientInput {
                name: Some("Ada Lovelace".to_string()),
                birthdate: Some("1985-04-12".to_string()),
                gender: Some("female".to_string()),
                email: Some("ada@x.com".to_string()),
                phone: Some("555-123-4567".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let booking = AppointmentInput {
            doctor_id: Some(doctor.id.to_string()),
            patient_id: Some(patient.id.to_string()),
            date: Some("2099-01-05".to_string()),
            time: Some("09:00".to_string()),
            ..Default::default()
        };
        let appointment = db.appointments.create(&booking).await.unwrap();

        let err = db.doctors.delete(&doctor.id).await.unwrap_err();
        assert!(matches!(err, HospitalError::Conflict(ref m) if m.contains("scheduled appointments")));

        let completed = StatusInput {
            status: Some("completed".to_string()),
        };
        db.appointments.update_status(&appointment.id, &completed).await.unwrap();
        db.doctors.delete(&doctor.id).await.unwrap();
        assert_eq!(db.doctors.count().await.unwrap(), 0);

        let view = db.appointments.get(&appointment.id).await.unwrap();
        assert!(view.doctor.is_none());
        assert_eq!(view.patient.unwrap().email, "ada@x.com");
    }

    #[tokio::test]
    async fn should_report_missing_doctor() {
        let db = Database::temporary().unwrap();
        let err = db.doctors.get(&Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, HospitalError::NotFound(ref m) if m == "Doctor not found"));
    }
}
