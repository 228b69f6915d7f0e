//! Project reporting handlers

use axum::{
    extract::{Path, State},
    Json,
};
use ch_core::traits::Id;
use ch_models::{Lot, ProjectStats};
use ch_progress::{ProgressStore, ProjectStatsService};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/v1/projects/:id/stats
pub async fn get_project_stats(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<ProjectStats>> {
    let stats = ProjectStatsService::new(state.store.clone())
        .compute(id)
        .await?;
    Ok(Json(stats))
}

/// GET /api/v1/projects/:id/lots
pub async fn list_project_lots(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vec<Lot>>> {
    let lots = state.store.project_lots(id).await?;
    Ok(Json(lots))
}
