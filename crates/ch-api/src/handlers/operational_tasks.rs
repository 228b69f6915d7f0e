//! Operational task update handlers
//!
//! These are the inbound triggers from planning tools. The write commits
//! synchronously; the dependent block/article recalculation is queued and
//! runs after the response is sent.

use axum::{
    extract::{Path, State},
    Json,
};
use ch_core::traits::Id;
use ch_models::{OperationalTask, OperationalTaskStatus};
use ch_progress::{RecalcEvent, RecalculationService};
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressDto {
    #[validate(range(min = 0, max = 100, message = "must be between 0 and 100"))]
    pub progress: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusDto {
    pub status: OperationalTaskStatus,
}

/// PUT /api/v1/operational_tasks/:id/progress
pub async fn update_progress(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateProgressDto>,
) -> ApiResult<Json<OperationalTask>> {
    dto.validate()?;

    tracing::info!(user = %user.login, id, progress = dto.progress, "operational progress update");

    let task = RecalculationService::new(state.store.clone())
        .update_operational_progress(id, dto.progress)
        .await?;

    state.dispatcher.dispatch(RecalcEvent::OperationalTask(id));

    Ok(Json(task))
}

/// PUT /api/v1/operational_tasks/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateStatusDto>,
) -> ApiResult<Json<OperationalTask>> {
    let task = RecalculationService::new(state.store.clone())
        .update_operational_status(id, dto.status)
        .await?;

    state.dispatcher.dispatch(RecalcEvent::OperationalTask(id));

    Ok(Json(task))
}
