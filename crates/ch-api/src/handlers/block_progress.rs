//! Block progress reporting handlers

use axum::{
    extract::{Path, State},
    Json,
};
use ch_core::traits::Id;
use ch_models::BlockArticleProgress;
use ch_progress::{BlockProgressService, BlockProgressUpdate, BlockSubTaskUpdate};
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlockProgressDto {
    pub floor_number: Option<i32>,
    #[validate]
    pub sub_task_progress: Vec<SubTaskProgressDto>,
    pub pv_document_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubTaskProgressDto {
    pub sub_task_id: Id,
    #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100"))]
    pub percentage: f64,
}

/// PUT /api/v1/blocks/:block_id/articles/:article_id/progress
pub async fn update_block_progress(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((block_id, article_id)): Path<(Id, Id)>,
    Json(dto): Json<UpdateBlockProgressDto>,
) -> ApiResult<Json<BlockArticleProgress>> {
    dto.validate()?;

    tracing::info!(
        user = %user.login,
        block_id,
        article_id,
        floor = ?dto.floor_number,
        updates = dto.sub_task_progress.len(),
        "block progress reported"
    );

    let row = BlockProgressService::new(state.store.clone())
        .update_block_sub_task_progress(BlockProgressUpdate {
            block_id,
            article_id,
            floor_number: dto.floor_number,
            sub_tasks: dto
                .sub_task_progress
                .iter()
                .map(|s| BlockSubTaskUpdate {
                    sub_task_id: s.sub_task_id,
                    percentage: s.percentage,
                })
                .collect(),
            pv_document_url: dto.pv_document_url,
        })
        .await?;

    Ok(Json(row))
}
