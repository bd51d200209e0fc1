// lib/src/services/stats_service.rs

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use models::medical::{Doctor, Patient};

use crate::errors::Result;
use crate::storage_engine::{AppointmentStorageEngine, DocumentStorageEngine};

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub doctors: usize,
    pub patients: usize,
    pub appointments: usize,
    pub today_appointments: usize,
}

pub struct StatsService {
    doctors: Arc<dyn DocumentStorageEngine<Doctor>>,
    patients: Arc<dyn DocumentStorageEngine<Patient>>,
    appointments: Arc<dyn AppointmentStorageEngine>,
}

impl StatsService {
    pub fn new(
        doctors: Arc<dyn DocumentStorageEngine<Doctor>>,
        patients: Arc<dyn DocumentStorageEngine<Patient>>,
        appointments: Arc<dyn AppointmentStorageEngine>,
    ) -> Self {
        Self {
            doctors,
            patients,
            appointments,
        }
    }

    pub async fn collect(&self) -> Result<Stats> {
        self.collect_on(Local::now().date_naive()).await
    }

    pub async fn collect_on(&self, today: NaiveDate) -> Result<Stats> {
        let (doctors, patients, appointments) = tokio::try_join!(
            self.doctors.count(),
            self.patients.count(),
            self.appointments.list_appointments(),
        )?;
        let today_appointments = appointments.iter().filter(|a| a.date == today).count();
        Ok(Stats {
            doctors,
            patients,
            appointments: appointments.len(),
            today_appointments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use models::medical::{AppointmentInput, DoctorInput, PatientInput};

    #[tokio::test]
    async fn should_count_everything_and_today() {
        let db = Database::temporary().unwrap();
        let today = NaiveDate::from_ymd_opt(2031, 2, 3).unwrap();

        let empty = db.stats.collect_on(today).await.unwrap();
        assert_eq!(empty.doctors + empty.patients + empty.appointments, 0);

        let doctor = db
            .doctors
            .create(&DoctorInput {
                name: Some("Lisa Cuddy".to_string()),
                specialty: Some("Endocrinology".to_string()),
                email: Some("cuddy@h.com".to_string()),
                phone: Some("+15551112222".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let patient = db
            .patients
            .create(&PatientInput {
                name: Some("Alan Turing".to_string()),
                birthdate: Some("1970-06-23".to_string()),
                gender: Some("male".to_string()),
                email: Some("alan@h.com".to_string()),
                phone: Some("555-987-6543".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        for (date, time) in [("2031-02-03", "09:00"), ("2031-02-03", "10:00"), ("2031-02-04", "09:00")] {
            db.appointments
                .create_on(
                    &AppointmentInput {
                        doctor_id: Some(doctor.id.to_string()),
                        patient_id: Some(patient.id.to_string()),
                        date: Some(date.to_string()),
                        time: Some(time.to_string()),
                        ..Default::default()
                    },
                    today,
                )
                .await
                .unwrap();
        }

        let stats = db.stats.collect_on(today).await.unwrap();
        assert_eq!(
            stats,
            Stats {
                doctors: 1,
                patients: 1,
                appointments: 3,
                today_appointments: 2,
            }
        );
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["todayAppointments"], 2);
    }
}
