//! Error types for the core crate.

use crate::objects::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown object: {0}")]
    UnknownObject(ObjectId),

    #[error("object is locked: {0}")]
    ObjectLocked(ObjectId),

    #[error("object {id} is not a {expected} object")]
    WrongKind { id: ObjectId, expected: &'static str },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
