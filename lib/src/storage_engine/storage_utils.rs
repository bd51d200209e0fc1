// lib/src/storage_engine/storage_utils.rs

use bincode::{
    config::{self, BigEndian, Configuration, Fixint},
    serde::{decode_from_slice, encode_to_vec},
};
use serde::{de::DeserializeOwned, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use uuid::Uuid;

use crate::errors::{HospitalError, Result};

/// Provides a standard bincode configuration for every stored document.
pub fn bincode_config() -> Configuration<BigEndian, Fixint> {
    config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

pub fn encode_document<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(encode_to_vec(value, bincode_config())?)
}

pub fn decode_document<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, _): (T, usize) = decode_from_slice(bytes, bincode_config())?;
    Ok(value)
}

pub fn id_key(id: &Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

pub fn id_from_key(bytes: &[u8]) -> Result<Uuid> {
    Ok(Uuid::from_slice(bytes)?)
}

/// Reasons a multi-tree write gives up without touching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexAbort {
    /// A unique index entry is already held by another record.
    Duplicate(String),
    /// The record being rewritten no longer exists.
    Missing(String),
    /// A stored value could not be decoded.
    Corrupt(String),
}

pub(crate) fn abort<T>(reason: IndexAbort) -> std::result::Result<T, ConflictableTransactionError<IndexAbort>> {
    Err(ConflictableTransactionError::Abort(reason))
}

pub(crate) fn decode_in_tx<T: DeserializeOwned>(
    bytes: &[u8],
) -> std::result::Result<T, ConflictableTransactionError<IndexAbort>> {
    decode_document(bytes).map_err(|e| ConflictableTransactionError::Abort(IndexAbort::Corrupt(e.to_string())))
}

impl From<TransactionError<IndexAbort>> for HospitalError {
    fn from(err: TransactionError<IndexAbort>) -> Self {
        match err {
            TransactionError::Abort(IndexAbort::Duplicate(msg)) => HospitalError::Conflict(msg),
            TransactionError::Abort(IndexAbort::Missing(msg)) => HospitalError::NotFound(msg),
            TransactionError::Abort(IndexAbort::Corrupt(msg)) => {
                HospitalError::InternalError(format!("Corrupt record: {}", msg))
            }
            TransactionError::Storage(e) => HospitalError::DatabaseError(e.to_string()),
        }
    }
}
