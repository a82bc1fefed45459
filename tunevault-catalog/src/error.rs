//! Error types for tunevault-catalog
//!
//! Every catalog operation fails with a [`CatalogError`]. The HTTP layer never
//! shows these to callers; it logs them and answers with a fixed envelope.

use thiserror::Error;

use crate::blob::{DecodeError, UserId};
use crate::content::FetchError;
use crate::db::StoreError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Which user list a dangling reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Composer,
    SongWriter,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Composer => write!(f, "composer"),
            UserRole::SongWriter => write!(f, "song writer"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Missing or empty request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No recording with this id
    #[error("Recording not found: {0}")]
    NotFound(i64),

    /// Relational store call failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Content store retrieval failed or was interrupted
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Blob bytes are not the expected structured text
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A composer/song-writer id resolves to no user
    #[error("Dangling reference: {role} id {id} has no user")]
    DanglingReference { role: UserRole, id: UserId },
}

impl CatalogError {
    /// Short machine-readable kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::InvalidInput(_) => "invalid_input",
            CatalogError::NotFound(_) => "not_found",
            CatalogError::Store(_) => "store_error",
            CatalogError::Fetch(_) => "fetch_error",
            CatalogError::Decode(_) => "decode_error",
            CatalogError::DanglingReference { .. } => "dangling_reference",
        }
    }
}
