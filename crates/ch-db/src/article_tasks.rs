//! Article task repository
//!
//! Database operations for the work units under a market article.

use chrono::{DateTime, Utc};
use ch_core::traits::Id;
use ch_models::ArticleTask;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// Article task database entity
#[derive(Debug, Clone, FromRow)]
pub struct ArticleTaskRow {
    pub id: i64,
    pub article_id: i64,
    pub designation: String,
    pub duration_days: f64,
    pub operational_task_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleTaskRow> for ArticleTask {
    fn from(row: ArticleTaskRow) -> Self {
        ArticleTask {
            id: Some(row.id),
            article_id: row.article_id,
            designation: row.designation,
            duration_days: row.duration_days,
            operational_task_id: row.operational_task_id,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Article task repository implementation
pub struct ArticleTaskRepository {
    pool: PgPool,
}

impl ArticleTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ArticleTaskRow>> {
        let row = sqlx::query_as::<_, ArticleTaskRow>(
            r#"
            SELECT id, article_id, designation, duration_days, operational_task_id,
                   created_at, updated_at
            FROM article_tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find the tasks of one article
    pub async fn find_by_article(&self, article_id: Id) -> RepositoryResult<Vec<ArticleTaskRow>> {
        let rows = sqlx::query_as::<_, ArticleTaskRow>(
            r#"
            SELECT id, article_id, designation, duration_days, operational_task_id,
                   created_at, updated_at
            FROM article_tasks
            WHERE article_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Resolve the article task linked to an operational task, if any
    pub async fn find_by_operational_task(
        &self,
        operational_task_id: Id,
    ) -> RepositoryResult<Option<ArticleTaskRow>> {
        let row = sqlx::query_as::<_, ArticleTaskRow>(
            r#"
            SELECT id, article_id, designation, duration_days, operational_task_id,
                   created_at, updated_at
            FROM article_tasks
            WHERE operational_task_id = $1
            "#,
        )
        .bind(operational_task_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Set the task's duration (used by the auto-extension path)
    pub async fn update_duration(&self, id: Id, duration_days: f64) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE article_tasks SET duration_days = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(duration_days)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Article task with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
