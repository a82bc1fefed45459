//! tunevault-catalog library
//!
//! Music catalog service: searches recordings, lists genre charts, and
//! assembles recording details from the relational catalog plus a
//! content-addressed blob store.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod blob;
pub mod content;
pub mod db;
pub mod detail;
pub mod error;
pub mod query;

pub use crate::error::{CatalogError, CatalogResult};

use crate::content::{ContentStore, FetchPolicy};
use crate::db::CatalogStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub content: Arc<dyn ContentStore>,
    pub fetch_policy: FetchPolicy,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        content: Arc<dyn ContentStore>,
        fetch_policy: FetchPolicy,
    ) -> Self {
        Self {
            catalog,
            content,
            fetch_policy,
        }
    }
}

/// Build application router
///
/// Callers are expected to be authenticated before reaching these routes.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let music = Router::new()
        .route("/music", get(api::search_music))
        .route("/music/chart", get(api::get_chart))
        .route("/music/:id", get(api::get_detail));

    Router::new()
        .merge(music)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
