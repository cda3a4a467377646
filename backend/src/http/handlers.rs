//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for the actual work.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, Instrument};
use uuid::Uuid;

use super::dto::{search_request_from_pairs, CruiseResponse, HealthResponse, SearchRequest};
use super::error::AppError;
use super::state::AppState;
use crate::api::{CruiseId, SearchResponse};
use crate::db::services as db_services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Track search
// =============================================================================

/// GET /v1/tracks/search
///
/// Query-string form of the search; list parameters may repeat.
pub async fn search_tracks(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> HandlerResult<SearchResponse> {
    let request = search_request_from_pairs(&pairs)?;
    run_search(&state, request).await
}

/// POST /v1/tracks/search
pub async fn search_tracks_json(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> HandlerResult<SearchResponse> {
    run_search(&state, request).await
}

async fn run_search(state: &AppState, request: SearchRequest) -> HandlerResult<SearchResponse> {
    let span = tracing::info_span!(
        "track_search",
        request_id = %Uuid::new_v4(),
        shapes = request.shapes.len(),
        ids = request.ids.len(),
    );

    async move {
        let response = state.engine.execute(&request).await?;
        info!(
            cruises = response.len(),
            warnings = response.warnings.len(),
            "search finished"
        );
        Ok::<_, AppError>(Json(response))
    }
    .instrument(span)
    .await
}

// =============================================================================
// Cruises
// =============================================================================

/// GET /v1/cruises/{cruise_id}
pub async fn get_cruise(
    State(state): State<AppState>,
    Path(cruise_id): Path<String>,
) -> HandlerResult<CruiseResponse> {
    let cruise_id = CruiseId::new(cruise_id);
    let (track, metadata) = db_services::get_cruise(state.repository.as_ref(), &cruise_id).await?;

    if track.is_none() && metadata.is_none() {
        return Err(AppError::NotFound(format!("Cruise {} not found", cruise_id)));
    }

    Ok(Json(CruiseResponse::new(cruise_id, track, metadata)))
}
