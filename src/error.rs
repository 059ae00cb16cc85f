use thiserror::Error;

use crate::services::directory::DirectoryError;
use crate::services::store::StoreError;

/// Errors surfaced by connection engine operations
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Member {member_id} already swiped on creator {creator_id}")]
    AlreadySwiped { member_id: String, creator_id: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Update conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Profile directory error: {0}")]
    Directory(String),
}

impl ConnectionError {
    /// Short machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadySwiped { .. } => "already_swiped",
            Self::InvalidState(_) => "invalid_state",
            Self::Unauthorized(_) => "unauthorized",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::Conflict(_) => "conflict",
            Self::InvalidInput(_) => "invalid_input",
            Self::Storage(_) => "storage_error",
            Self::Directory(_) => "directory_error",
        }
    }

    /// HTTP status the routes answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::AlreadySwiped { .. } => 409,
            Self::InvalidState(_) => 409,
            Self::Unauthorized(_) => 403,
            Self::ConstraintViolation(_) => 409,
            Self::Conflict(_) => 409,
            Self::InvalidInput(_) => 400,
            Self::Storage(_) => 500,
            Self::Directory(_) => 502,
        }
    }
}

impl From<StoreError> for ConnectionError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicatePair { creator_id, member_id } => ConnectionError::ConstraintViolation(
                format!("connection already exists for creator {} and member {}", creator_id, member_id),
            ),
            StoreError::Backend(message) => ConnectionError::Storage(message),
        }
    }
}

impl From<DirectoryError> for ConnectionError {
    fn from(value: DirectoryError) -> Self {
        match value {
            DirectoryError::NotFound(what) => ConnectionError::NotFound(what),
            DirectoryError::Unavailable(message) => ConnectionError::Directory(message),
        }
    }
}
