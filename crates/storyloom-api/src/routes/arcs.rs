//! Routes for arc listing and the detection sweep.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use storyloom_core::repository::ArcFilter;
use storyloom_detection::SweepReport;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::view::{ArcView, arc_view};
use crate::state::AppState;

const MAX_PAGE_SIZE: i64 = 200;

/// Query parameters for GET /.
#[derive(Debug, Deserialize)]
pub struct ListArcsParams {
    /// Restrict to one world.
    pub world_id: Option<Uuid>,
    /// Restrict to one dweller.
    pub dweller_id: Option<Uuid>,
    /// Page size, capped at 200.
    pub limit: Option<i64>,
    /// Rows skipped.
    pub offset: Option<i64>,
}

/// Request body for POST /detect. Both fields are optional; an empty
/// body object sweeps every story.
#[derive(Debug, Default, Deserialize)]
pub struct DetectRequest {
    /// Restrict the sweep to one world.
    #[serde(default)]
    pub world_id: Option<Uuid>,
    /// Restrict the sweep to one dweller.
    #[serde(default)]
    pub dweller_id: Option<Uuid>,
}

/// GET /
#[instrument(skip(state))]
async fn list_arcs(
    State(state): State<AppState>,
    Query(params): Query<ListArcsParams>,
) -> Result<Json<Vec<ArcView>>, ApiError> {
    let filter = ArcFilter {
        world_id: params.world_id,
        dweller_id: params.dweller_id,
        limit: params.limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE),
        offset: params.offset.unwrap_or(0).max(0),
    };

    let arcs = state.arcs.list(&filter).await?;
    let mut views = Vec::with_capacity(arcs.len());
    for arc in arcs {
        views.push(arc_view(&state, arc).await?);
    }
    Ok(Json(views))
}

/// POST /detect
#[instrument(skip(state, request), fields(world_id = ?request.world_id, dweller_id = ?request.dweller_id))]
async fn detect(
    State(state): State<AppState>,
    Json(request): Json<DetectRequest>,
) -> Result<Json<SweepReport>, ApiError> {
    let report = state
        .detector
        .sweep(request.world_id, request.dweller_id)
        .await?;

    info!(
        processed = report.processed,
        clustered = report.clustered,
        arcs_created = report.arcs_created,
        arcs_merged = report.arcs_merged,
        failures = report.failures.len(),
        "detection sweep complete"
    );

    Ok(Json(report))
}

/// Returns the router for arc endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_arcs))
        .route("/detect", post(detect))
}
