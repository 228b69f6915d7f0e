//! Market article read handlers

use axum::{
    extract::{Path, State},
    Json,
};
use ch_core::traits::Id;
use ch_models::BlockArticleProgress;
use ch_progress::{article_rollup, ProgressStore};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleProgressResponse {
    pub article_id: Id,
    pub total_amount: f64,
    pub progress: f64,
    pub earned_value: f64,
    pub task_count: usize,
}

/// GET /api/v1/articles/:id/progress
///
/// The article rollup computed fresh from its subtree, for dashboards that
/// want the live value rather than the last block write.
pub async fn get_article_progress(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<ArticleProgressResponse>> {
    let snapshot = state
        .store
        .article_snapshot(id)
        .await?
        .ok_or_else(|| ApiError::not_found("MarketArticle", id))?;

    let rollup = article_rollup(&snapshot);

    Ok(Json(ArticleProgressResponse {
        article_id: snapshot.id,
        total_amount: snapshot.total_amount,
        progress: rollup.progress,
        earned_value: rollup.earned_value,
        task_count: snapshot.tasks.len(),
    }))
}

/// GET /api/v1/articles/:id/blocks
pub async fn list_article_blocks(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vec<BlockArticleProgress>>> {
    let rows = state.store.block_progress_for_article(id).await?;
    Ok(Json(rows))
}
