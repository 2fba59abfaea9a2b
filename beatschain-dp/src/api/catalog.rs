//! Catalog read endpoints
//!
//! Thin JSON wrappers over [`UnifiedDataProvider`](crate::provider::UnifiedDataProvider).

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use beatschain_common::{Beat, Producer};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Largest featured listing a caller may ask for
const MAX_FEATURED_LIMIT: usize = 100;

/// Query parameters for GET /api/featured-beats
#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    /// Raw so a malformed value becomes a JSON 400 rather than a plain-text rejection
    pub limit: Option<String>,
}

/// GET /api/producers
pub async fn list_producers(State(state): State<AppState>) -> Json<Vec<Producer>> {
    Json(state.provider.get_all_producers().await)
}

/// GET /api/producers/:id
pub async fn get_producer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Producer>> {
    state
        .provider
        .get_producer(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("producer {}", id)))
}

/// GET /api/producers/:id/beats
pub async fn get_producer_beats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Beat>> {
    Json(state.provider.get_producer_beats(&id).await)
}

/// GET /api/beats/:id
pub async fn get_beat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Beat>> {
    state
        .provider
        .get_beat(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("beat {}", id)))
}

/// GET /api/featured-beats?limit=N
pub async fn get_featured_beats(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> ApiResult<Json<Vec<Beat>>> {
    let limit = parse_limit(query.limit.as_deref())?;
    Ok(Json(state.provider.get_featured_beats(limit).await))
}

fn parse_limit(raw: Option<&str>) -> ApiResult<Option<usize>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<usize>() {
        Ok(limit) if limit <= MAX_FEATURED_LIMIT => Ok(Some(limit)),
        Ok(_) => Err(ApiError::BadRequest(format!(
            "limit must be at most {}",
            MAX_FEATURED_LIMIT
        ))),
        Err(_) => Err(ApiError::BadRequest(format!(
            "limit must be a non-negative integer, got '{}'",
            raw
        ))),
    }
}

/// Build catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/producers", get(list_producers))
        .route("/api/producers/:id", get(get_producer))
        .route("/api/producers/:id/beats", get(get_producer_beats))
        .route("/api/beats/:id", get(get_beat))
        .route("/api/featured-beats", get(get_featured_beats))
}
