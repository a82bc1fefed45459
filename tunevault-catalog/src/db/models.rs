//! Catalog records read by the service

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Full persisted recording row, as returned by search and chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recording {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub genre: String,
    /// CID of the track metadata blob
    pub cid1: String,
    pub created_at: NaiveDateTime,
}

/// Projection loaded at the start of a detail lookup
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RecordingSummary {
    pub title: String,
    pub genre: String,
    pub artist: String,
    pub cid1: String,
}
