// lib/src/storage_engine/document_storage.rs

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sled::{Db, Transactional, Tree};
use tracing::debug;
use uuid::Uuid;

use models::medical::{Doctor, Patient, User};

use crate::errors::Result;
use crate::storage_engine::storage_utils::{
    abort, decode_document, decode_in_tx, encode_document, id_from_key, id_key, IndexAbort,
};

/// A record kept in its own sled tree with a unique, case-normalised email index.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the sled tree holding the records.
    const COLLECTION: &'static str;
    /// Human readable label used in error messages.
    const LABEL: &'static str;

    fn id(&self) -> Uuid;
    fn email(&self) -> &str;
    fn name(&self) -> &str;
}

impl Document for Doctor {
    const COLLECTION: &'static str = "doctors";
    const LABEL: &'static str = "doctor";

    fn id(&self) -> Uuid {
        self.id
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Document for Patient {
    const COLLECTION: &'static str = "patients";
    const LABEL: &'static str = "patient";

    fn id(&self) -> Uuid {
        self.id
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
pub trait DocumentStorageEngine<T: Document>: Send + Sync + 'static {
    /// Stores a new record. Fails with a conflict if its email is already indexed.
    async fn insert(&self, doc: &T) -> Result<()>;
    /// Overwrites an existing record, moving its email index entry when the email changed.
    async fn replace(&self, doc: &T) -> Result<()>;
    /// Deletes a record and its index entry, returning what was removed.
    async fn remove(&self, id: &Uuid) -> Result<Option<T>>;
    async fn get(&self, id: &Uuid) -> Result<Option<T>>;
    /// Looks a record up by its already normalised email.
    async fn find_by_email(&self, email: &str) -> Result<Option<T>>;
    async fn list(&self) -> Result<Vec<T>>;
    async fn count(&self) -> Result<usize>;
}

/// Sled-backed implementation of [`DocumentStorageEngine`].
///
/// Records live in the `T::COLLECTION` tree keyed by raw UUID bytes. The
/// `<collection>_by_email` tree maps each email to its owner's id and is only
/// ever written inside the same transaction as the record, so it acts as the
/// store-level uniqueness constraint.
pub struct SledDocumentStorage<T> {
    records: Tree,
    emails: Tree,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> SledDocumentStorage<T> {
    pub fn new(db: &Db) -> Result<Self> {
        let records = db.open_tree(T::COLLECTION)?;
        let emails = db.open_tree(format!("{}_by_email", T::COLLECTION))?;
        Ok(Self {
            records,
            emails,
            _marker: PhantomData,
        })
    }

    fn duplicate_message(email: &str) -> String {
        format!("A {} with email {} already exists", T::LABEL, email)
    }
}

#[async_trait]
impl<T: Document> DocumentStorageEngine<T> for SledDocumentStorage<T> {
    async fn insert(&self, doc: &T) -> Result<()> {
        let key = id_key(&doc.id());
        let email = doc.email().to_string();
        let bytes = encode_document(doc)?;

        (&self.records, &self.emails).transaction(|(records, emails)| {
            if emails.get(email.as_bytes())?.is_some() {
                return abort(IndexAbort::Duplicate(Self::duplicate_message(&email)));
            }
            emails.insert(email.as_bytes(), key.as_slice())?;
            records.insert(key.as_slice(), bytes.as_slice())?;
            Ok(())
        })?;

        debug!("Inserted {} {}", T::LABEL, doc.id());
        Ok(())
    }

    async fn replace(&self, doc: &T) -> Result<()> {
        let id = doc.id();
        let key = id_key(&id);
        let email = doc.email().to_string();
        let bytes = encode_document(doc)?;

        (&self.records, &self.emails).transaction(|(records, emails)| {
            let previous: T = match records.get(key.as_slice())? {
                Some(raw) => decode_in_tx(&raw)?,
                None => return abort(IndexAbort::Missing(format!("{} {} not found", T::LABEL, id))),
            };
            if previous.email() != email {
                if let Some(holder) = emails.get(email.as_bytes())? {
                    if holder.as_ref() != key.as_slice() {
                        return abort(IndexAbort::Duplicate(Self::duplicate_message(&email)));
                    }
                }
                emails.remove(previous.email().as_bytes())?;
                emails.insert(email.as_bytes(), key.as_slice())?;
            }
            records.insert(key.as_slice(), bytes.as_slice())?;
            Ok(())
        })?;

        debug!("Replaced {} {}", T::LABEL, id);
        Ok(())
    }

    async fn remove(&self, id: &Uuid) -> Result<Option<T>> {
        let key = id_key(id);

        let removed = (&self.records, &self.emails).transaction(|(records, emails)| {
            let previous: T = match records.remove(key.as_slice())? {
                Some(raw) => decode_in_tx(&raw)?,
                None => return Ok(None),
            };
            if let Some(holder) = emails.get(previous.email().as_bytes())? {
                if holder.as_ref() == key.as_slice() {
                    emails.remove(previous.email().as_bytes())?;
                }
            }
            Ok(Some(previous))
        })?;

        if removed.is_some() {
            debug!("Removed {} {}", T::LABEL, id);
        }
        Ok(removed)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        match self.records.get(id_key(id))? {
            Some(raw) => Ok(Some(decode_document(&raw)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<T>> {
        let Some(raw_id) = self.emails.get(email.as_bytes())? else {
            return Ok(None);
        };
        let id = id_from_key(&raw_id)?;
        self.get(&id).await
    }

    async fn list(&self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        for item in self.records.iter() {
            let (_key, value) = item?;
            out.push(decode_document(&value)?);
        }
        Ok(out)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HospitalError;
    use crate::storage_engine::open_temporary_db;
    use models::medical::{DoctorInput, Specialty};

    fn doctor(email: &str) -> Doctor {
        Doctor::from_new_doctor(
            DoctorInput {
                name: Some("Meredith Grey".to_string()),
                specialty: Some(Specialty::Surgery.to_string()),
                email: Some(email.to_string()),
                phone: Some("+15550001111".to_string()),
                ..Default::default()
            }
            .validate_new()
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn should_round_trip_document() {
        let db = open_temporary_db().unwrap();
        let store = SledDocumentStorage::<Doctor>::new(&db).unwrap();
        let d = doctor("grey@seattle.org");
        store.insert(&d).await.unwrap();

        assert_eq!(store.get(&d.id).await.unwrap(), Some(d.clone()));
        assert_eq!(store.find_by_email("grey@seattle.org").await.unwrap(), Some(d));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_enforce_unique_email_index() {
        let db = open_temporary_db().unwrap();
        let store = SledDocumentStorage::<Doctor>::new(&db).unwrap();
        store.insert(&doctor("same@h.com")).await.unwrap();

        let err = store.insert(&doctor("same@h.com")).await.unwrap_err();
        assert!(matches!(err, HospitalError::Conflict(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn should_move_email_index_on_replace() {
        let db = open_temporary_db().unwrap();
        let store = SledDocumentStorage::<Doctor>::new(&db).unwrap();
        let mut d = doctor("old@h.com");
        store.insert(&d).await.unwrap();

        d.email = "new@h.com".to_string();
        store.replace(&d).await.unwrap();

        assert!(store.find_by_email("old@h.com").await.unwrap().is_none());
        assert_eq!(store.find_by_email("new@h.com").await.unwrap().map(|x| x.id), Some(d.id));
        // the old address is free again
        store.insert(&doctor("old@h.com")).await.unwrap();
    }

    #[tokio::test]
    async fn should_release_index_on_remove() {
        let db = open_temporary_db().unwrap();
        let store = SledDocumentStorage::<Doctor>::new(&db).unwrap();
        let d = doctor("gone@h.com");
        store.insert(&d).await.unwrap();

        assert!(store.remove(&d.id).await.unwrap().is_some());
        assert!(store.remove(&d.id).await.unwrap().is_none());
        assert!(store.find_by_email("gone@h.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_report_missing_record_on_replace() {
        let db = open_temporary_db().unwrap();
        let store = SledDocumentStorage::<Doctor>::new(&db).unwrap();
        let err = store.replace(&doctor("ghost@h.com")).await.unwrap_err();
        assert!(matches!(err, HospitalError::NotFound(_)));
    }
}
