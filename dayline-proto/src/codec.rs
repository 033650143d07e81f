//! Serialization for the store batch contract.
//!
//! Provides postcard encode/decode for [`BatchUpdate`] and task record
//! lists, used wherever the engine and store exchange bytes rather than
//! in-process values.

use crate::batch::BatchUpdate;
use crate::task::TaskRecord;

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Encodes a [`BatchUpdate`] into a byte vector using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the batch cannot be serialized.
pub fn encode_batch(batch: &BatchUpdate) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(batch).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a [`BatchUpdate`] from a byte slice using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the bytes cannot be deserialized.
pub fn decode_batch(bytes: &[u8]) -> Result<BatchUpdate, CodecError> {
    postcard::from_bytes(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Encodes a list of task records using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the records cannot be serialized.
pub fn encode_records(records: &[TaskRecord]) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(records).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a list of task records from a byte slice using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the bytes cannot be deserialized.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<TaskRecord>, CodecError> {
    postcard::from_bytes(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
}
