//! Music catalog endpoints
//!
//! - `GET /music?search=<terms>`: recordings whose title or artist contains any term
//! - `GET /music/chart?genre=<genre>`: recordings of exactly that genre
//! - `GET /music/:id`: assembled recording detail

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::envelope::{respond, Operation};
use crate::db::{CatalogStore, Recording};
use crate::detail::{DetailPipeline, DetailView};
use crate::error::{CatalogError, CatalogResult};
use crate::query::{build_genre_filter, build_search_filter};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartParams {
    pub genre: Option<String>,
}

/// GET /music?search=<terms>
pub async fn search_music(
    State(state): State<AppState>,
    params: Option<Query<SearchParams>>,
) -> Response {
    let raw = params.and_then(|Query(p)| p.search);
    respond(
        Operation::SearchMusic,
        find_by_search(state.catalog.as_ref(), raw.as_deref()).await,
    )
}

/// GET /music/chart?genre=<genre>
pub async fn get_chart(
    State(state): State<AppState>,
    params: Option<Query<ChartParams>>,
) -> Response {
    let genre = params.and_then(|Query(p)| p.genre);
    respond(
        Operation::GetChart,
        find_by_genre(state.catalog.as_ref(), genre.as_deref()).await,
    )
}

/// GET /music/:id
pub async fn get_detail(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let span = info_span!(
        "music_detail",
        request_id = %Uuid::new_v4(),
        recording_id = %raw_id
    );

    let result = detail_for(&state, &raw_id).instrument(span.clone()).await;
    span.in_scope(|| respond(Operation::GetDetail, result))
}

pub async fn find_by_search(
    catalog: &dyn CatalogStore,
    raw_query: Option<&str>,
) -> CatalogResult<Vec<Recording>> {
    let filter = build_search_filter(raw_query)?;
    Ok(catalog.search_recordings(&filter).await?)
}

pub async fn find_by_genre(
    catalog: &dyn CatalogStore,
    genre: Option<&str>,
) -> CatalogResult<Vec<Recording>> {
    let filter = build_genre_filter(genre)?;
    Ok(catalog.recordings_by_genre(&filter).await?)
}

async fn detail_for(state: &AppState, raw_id: &str) -> CatalogResult<DetailView> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| CatalogError::InvalidInput(format!("recording id {:?} is not numeric", raw_id)))?;

    DetailPipeline::new(
        state.catalog.as_ref(),
        state.content.as_ref(),
        &state.fetch_policy,
    )
    .assemble(id)
    .await
}
