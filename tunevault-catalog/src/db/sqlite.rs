//! SQLite-backed catalog store

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::future::Future;
use std::time::Duration;

use super::{CatalogStore, Recording, RecordingSummary, StoreError};
use crate::query::{GenreFilter, SearchFilter};

const RECORDING_COLUMNS: &str = "SELECT id, title, artist, genre, cid1, created_at FROM music WHERE ";

#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| StoreError::Timeout(self.query_timeout))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn search_recordings(&self, filter: &SearchFilter) -> Result<Vec<Recording>, StoreError> {
        let mut builder = QueryBuilder::<Sqlite>::new(RECORDING_COLUMNS);
        filter.push_sql(&mut builder);
        builder.push(" ORDER BY id");

        self.bounded(builder.build_query_as::<Recording>().fetch_all(&self.pool))
            .await
    }

    async fn recordings_by_genre(
        &self,
        filter: &GenreFilter,
    ) -> Result<Vec<Recording>, StoreError> {
        let mut builder = QueryBuilder::<Sqlite>::new(RECORDING_COLUMNS);
        filter.push_sql(&mut builder);
        builder.push(" ORDER BY id");

        self.bounded(builder.build_query_as::<Recording>().fetch_all(&self.pool))
            .await
    }

    async fn recording_summary(&self, id: i64) -> Result<Option<RecordingSummary>, StoreError> {
        self.bounded(
            sqlx::query_as::<_, RecordingSummary>(
                "SELECT title, genre, artist, cid1 FROM music WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn user_nickname(&self, id: i64) -> Result<Option<String>, StoreError> {
        self.bounded(
            sqlx::query_scalar::<_, String>("SELECT nickname FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }
}
