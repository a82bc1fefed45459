//! Relational catalog access
//!
//! The catalog reads recordings and users through the [`CatalogStore`]
//! trait. [`SqliteCatalog`] is the production implementation; tests may
//! substitute their own.

mod models;
mod sqlite;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::query::{GenreFilter, SearchFilter};

pub use models::{Recording, RecordingSummary};
pub use sqlite::SqliteCatalog;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Catalog store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of recordings and users
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All recordings matching any predicate of `filter`
    async fn search_recordings(&self, filter: &SearchFilter) -> Result<Vec<Recording>, StoreError>;

    /// All recordings whose genre equals the filter's exactly
    async fn recordings_by_genre(&self, filter: &GenreFilter)
        -> Result<Vec<Recording>, StoreError>;

    /// The fields a detail lookup starts from, `None` if no such recording
    async fn recording_summary(&self, id: i64) -> Result<Option<RecordingSummary>, StoreError>;

    /// Nickname of user `id`, `None` if no such user
    async fn user_nickname(&self, id: i64) -> Result<Option<String>, StoreError>;
}
