// lib/src/storage_engine/appointment_storage.rs

use async_trait::async_trait;
use sled::{Db, Transactional, Tree};
use tracing::debug;
use uuid::Uuid;

use models::medical::Appointment;

use crate::errors::Result;
use crate::storage_engine::storage_utils::{
    abort, decode_document, decode_in_tx, encode_document, id_from_key, id_key, IndexAbort,
};

pub const SLOT_TAKEN: &str = "Doctor already has an appointment scheduled at this time";

#[async_trait]
pub trait AppointmentStorageEngine: Send + Sync + 'static {
    /// Stores a new appointment, claiming its slot when it is not cancelled.
    async fn insert_appointment(&self, appointment: &Appointment) -> Result<()>;
    /// Overwrites an appointment, releasing and claiming slots as its
    /// doctor, date, time or status moved.
    async fn replace_appointment(&self, appointment: &Appointment) -> Result<()>;
    async fn remove_appointment(&self, id: &Uuid) -> Result<Option<Appointment>>;
    async fn get_appointment(&self, id: &Uuid) -> Result<Option<Appointment>>;
    /// Id of the appointment currently holding `slot_key`, if any.
    async fn slot_holder(&self, slot_key: &str) -> Result<Option<Uuid>>;
    async fn list_appointments(&self) -> Result<Vec<Appointment>>;
    async fn count_appointments(&self) -> Result<usize>;
}

/// Appointments keyed by id, plus the `appointment_slots` tree mapping each
/// occupied slot key to the appointment holding it.
pub struct SledAppointmentStorage {
    appointments: Tree,
    slots: Tree,
}

impl SledAppointmentStorage {
    pub fn new(db: &Db) -> Result<Self> {
        Ok(Self {
            appointments: db.open_tree("appointments")?,
            slots: db.open_tree("appointment_slots")?,
        })
    }
}

#[async_trait]
impl AppointmentStorageEngine for SledAppointmentStorage {
    async fn insert_appointment(&self, appointment: &Appointment) -> Result<()> {
        let key = id_key(&appointment.id);
        let slot = appointment.slot_key();
        let claims = appointment.occupies_slot();
        let bytes = encode_document(appointment)?;

        (&self.appointments, &self.slots).transaction(|(appointments, slots)| {
            if claims {
                if slots.get(slot.as_bytes())?.is_some() {
                    return abort(IndexAbort::Duplicate(SLOT_TAKEN.to_string()));
                }
                slots.insert(slot.as_bytes(), key.as_slice())?;
            }
            appointments.insert(key.as_slice(), bytes.as_slice())?;
            Ok(())
        })?;

        debug!("Inserted appointment {} (slot {})", appointment.id, slot);
        Ok(())
    }

    async fn replace_appointment(&self, appointment: &Appointment) -> Result<()> {
        let id = appointment.id;
        let key = id_key(&id);
        let slot = appointment.slot_key();
        let claims = appointment.occupies_slot();
        let bytes = encode_document(appointment)?;

        (&self.appointments, &self.slots).transaction(|(appointments, slots)| {
            let previous: Appointment = match appointments.get(key.as_slice())? {
                Some(raw) => decode_in_tx(&raw)?,
                None => return abort(IndexAbort::Missing("Appointment not found".to_string())),
            };

            let old_slot = previous.slot_key();
            if previous.occupies_slot() && (!claims || old_slot != slot) {
                if let Some(holder) = slots.get(old_slot.as_bytes())? {
                    if holder.as_ref() == key.as_slice() {
                        slots.remove(old_slot.as_bytes())?;
                    }
                }
            }

            if claims {
                match slots.get(slot.as_bytes())? {
                    Some(holder) if holder.as_ref() != key.as_slice() => {
                        return abort(IndexAbort::Duplicate(SLOT_TAKEN.to_string()));
                    }
                    Some(_) => {}
                    None => {
                        slots.insert(slot.as_bytes(), key.as_slice())?;
                    }
                }
            }

            appointments.insert(key.as_slice(), bytes.as_slice())?;
            Ok(())
        })?;

        debug!("Replaced appointment {}", id);
        Ok(())
    }

    async fn remove_appointment(&self, id: &Uuid) -> Result<Option<Appointment>> {
        let key = id_key(id);

        let removed = (&self.appointments, &self.slots).transaction(|(appointments, slots)| {
            let previous: Appointment = match appointments.remove(key.as_slice())? {
                Some(raw) => decode_in_tx(&raw)?,
                None => return Ok(None),
            };
            let slot = previous.slot_key();
            if let Some(holder) = slots.get(slot.as_bytes())? {
                if holder.as_ref() == key.as_slice() {
                    slots.remove(slot.as_bytes())?;
                }
            }
            Ok(Some(previous))
        })?;

        if removed.is_some() {
            debug!("Removed appointment {}", id);
        }
        Ok(removed)
    }

    async fn get_appointment(&self, id: &Uuid) -> Result<Option<Appointment>> {
        match self.appointments.get(id_key(id))? {
            Some(raw) => Ok(Some(decode_document(&raw)?)),
            None => Ok(None),
        }
    }

    async fn slot_holder(&self, slot_key: &str) -> Result<Option<Uuid>> {
        match self.slots.get(slot_key.as_bytes())? {
            Some(raw) => Ok(Some(id_from_key(&raw)?)),
            None => Ok(None),
        }
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        let mut out = Vec::with_capacity(self.appointments.len());
        for item in self.appointments.iter() {
            let (_key, value) = item?;
            out.push(decode_document(&value)?);
        }
        Ok(out)
    }

    async fn count_appointments(&self) -> Result<usize> {
        Ok(self.appointments.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HospitalError;
    use crate::storage_engine::open_temporary_db;
    use chrono::NaiveDate;
    use models::medical::{AppointmentStatus, NewAppointment};

    fn appointment(doctor_id: Uuid, time: &str, status: AppointmentStatus) -> Appointment {
        Appointment::from_new_appointment(NewAppointment {
            doctor_id,
            patient_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
            time: time.to_string(),
            status,
            notes: None,
        })
    }

    #[tokio::test]
    async fn should_reject_second_booking_in_same_slot() {
        let db = open_temporary_db().unwrap();
        let store = SledAppointmentStorage::new(&db).unwrap();
        let doctor = Uuid::new_v4();

        store
            .insert_appointment(&appointment(doctor, "09:00", AppointmentStatus::Scheduled))
            .await
            .unwrap();
        // 9:00 and 09:00 are the same slot
        let err = store
            .insert_appointment(&appointment(doctor, "9:00", AppointmentStatus::Scheduled))
            .await
            .unwrap_err();
        assert!(matches!(err, HospitalError::Conflict(ref m) if m == SLOT_TAKEN));
        assert_eq!(store.count_appointments().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_not_claim_slot_for_cancelled_booking() {
        let db = open_temporary_db().unwrap();
        let store = SledAppointmentStorage::new(&db).unwrap();
        let doctor = Uuid::new_v4();

        let cancelled = appointment(doctor, "10:00", AppointmentStatus::Cancelled);
        store.insert_appointment(&cancelled).await.unwrap();
        assert!(store.slot_holder(&cancelled.slot_key()).await.unwrap().is_none());

        store
            .insert_appointment(&appointment(doctor, "10:00", AppointmentStatus::Scheduled))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn should_move_slot_on_replace() {
        let db = open_temporary_db().unwrap();
        let store = SledAppointmentStorage::new(&db).unwrap();
        let doctor = Uuid::new_v4();

        let mut appt = appointment(doctor, "11:00", AppointmentStatus::Scheduled);
        store.insert_appointment(&appt).await.unwrap();
        let old_slot = appt.slot_key();

        appt.time = "11:30".to_string();
        store.replace_appointment(&appt).await.unwrap();

        assert!(store.slot_holder(&old_slot).await.unwrap().is_none());
        assert_eq!(store.slot_holder(&appt.slot_key()).await.unwrap(), Some(appt.id));
    }

    #[tokio::test]
    async fn should_release_and_reclaim_slot_with_status() {
        let db = open_temporary_db().unwrap();
        let store = SledAppointmentStorage::new(&db).unwrap();
        let doctor = Uuid::new_v4();

        let mut first = appointment(doctor, "12:00", AppointmentStatus::Scheduled);
        store.insert_appointment(&first).await.unwrap();

        first.status = AppointmentStatus::Cancelled;
        store.replace_appointment(&first).await.unwrap();

        let second = appointment(doctor, "12:00", AppointmentStatus::Scheduled);
        store.insert_appointment(&second).await.unwrap();

        first.status = AppointmentStatus::Scheduled;
        let err = store.replace_appointment(&first).await.unwrap_err();
        assert!(matches!(err, HospitalError::Conflict(_)));

        let stored = store.get_appointment(&first.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Cancelled);
        assert_eq!(store.slot_holder(&second.slot_key()).await.unwrap(), Some(second.id));
    }

    #[tokio::test]
    async fn should_free_slot_on_remove() {
        let db = open_temporary_db().unwrap();
        let store = SledAppointmentStorage::new(&db).unwrap();
        let doctor = Uuid::new_v4();

        let appt = appointment(doctor, "13:00", AppointmentStatus::Scheduled);
        store.insert_appointment(&appt).await.unwrap();
        assert!(store.remove_appointment(&appt.id).await.unwrap().is_some());
        assert!(store.slot_holder(&appt.slot_key()).await.unwrap().is_none());
        assert!(store.get_appointment(&appt.id).await.unwrap().is_none());
    }
}
