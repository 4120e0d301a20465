use fjall::Slice;
use std::error::Error;
use stepwise::collection::{Document, RecordId};
use stepwise::errors::{ErrorKind, MigrateError};
use thiserror::Error;

/// Failure while turning documents and keys into bytes or back.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FjallCodecError {
    #[error("Serialization failed: {0}")]
    SerializationError(String),
    #[error("Deserialization failed: {0}")]
    DeserializationError(String),
    #[error("Invalid record key of {0} bytes")]
    InvalidKey(usize),
}

impl From<FjallCodecError> for MigrateError {
    fn from(err: FjallCodecError) -> Self {
        MigrateError::new(&err.to_string(), ErrorKind::EncodingError)
    }
}

pub type FjallCodecResult<T> = Result<T, FjallCodecError>;

/// Serializes a document with bincode.
pub(crate) fn encode_document(document: &Document) -> FjallCodecResult<Vec<u8>> {
    bincode::serde::encode_to_vec(document, bincode::config::legacy())
        .map_err(|e| FjallCodecError::SerializationError(e.to_string()))
}

pub(crate) fn decode_document(bytes: &[u8]) -> FjallCodecResult<Document> {
    bincode::serde::decode_from_slice(bytes, bincode::config::legacy())
        .map(|(document, _)| document)
        .map_err(|e| FjallCodecError::DeserializationError(e.to_string()))
}

/// Record ids are stored big-endian so partition order is insertion order.
pub(crate) fn encode_key(id: &RecordId) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

pub(crate) fn decode_key(key: &Slice) -> FjallCodecResult<RecordId> {
    let bytes = <[u8; 8]>::try_from(&key[..]).map_err(|_| FjallCodecError::InvalidKey(key.len()))?;
    Ok(RecordId::from_value(u64::from_be_bytes(bytes)))
}

/// Maps a fjall failure to a [MigrateError].
pub(crate) fn to_migrate_error(error: impl Error) -> MigrateError {
    let error_msg = error.to_string();
    let error_kind = if error_msg.contains("closed") || error_msg.contains("poisoned") {
        ErrorKind::StoreAlreadyClosed
    } else if error_msg.contains("timed out") {
        ErrorKind::Timeout
    } else {
        ErrorKind::StorageError
    };
    MigrateError::new(&format!("Fjall Error: {}", error_msg), error_kind)
}
