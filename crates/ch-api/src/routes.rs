//! API routes

use axum::{
    extract::State,
    routing::{get, put},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{articles, block_progress, operational_tasks, projects};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_router())
}

fn api_v1_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route(
            "/blocks/:block_id/articles/:article_id/progress",
            put(block_progress::update_block_progress),
        )
        .route(
            "/operational_tasks/:id/progress",
            put(operational_tasks::update_progress),
        )
        .route(
            "/operational_tasks/:id/status",
            put(operational_tasks::update_status),
        )
        .route("/projects/:id/stats", get(projects::get_project_stats))
        .route("/projects/:id/lots", get(projects::list_project_lots))
        .route("/articles/:id/progress", get(articles::get_article_progress))
        .route("/articles/:id/blocks", get(articles::list_article_blocks))
}

async fn api_root(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "instanceName": state.config.instance.app_title,
        "coreVersion": env!("CARGO_PKG_VERSION"),
        "_links": {
            "self": { "href": "/api/v1" },
            "projectStats": { "href": "/api/v1/projects/{id}/stats" },
            "projectLots": { "href": "/api/v1/projects/{id}/lots" },
            "articleProgress": { "href": "/api/v1/articles/{id}/progress" },
            "articleBlocks": { "href": "/api/v1/articles/{id}/blocks" },
            "blockProgress": {
                "href": "/api/v1/blocks/{blockId}/articles/{articleId}/progress"
            },
            "operationalTasks": { "href": "/api/v1/operational_tasks/{id}/progress" }
        }
    }))
}
