//! Operational task repository
//!
//! Database operations for subcontractor/engineer work assignments.

use chrono::{DateTime, Utc};
use ch_core::traits::Id;
use ch_models::{OperationalTask, OperationalTaskStatus};
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// Operational task database entity
#[derive(Debug, Clone, FromRow)]
pub struct OperationalTaskRow {
    pub id: i64,
    pub designation: String,
    pub progress: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OperationalTaskRow> for OperationalTask {
    fn from(row: OperationalTaskRow) -> Self {
        OperationalTask {
            id: Some(row.id),
            designation: row.designation,
            progress: row.progress,
            status: OperationalTaskStatus::parse(&row.status).unwrap_or_default(),
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Operational task repository implementation
pub struct OperationalTaskRepository {
    pool: PgPool,
}

impl OperationalTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<OperationalTaskRow>> {
        let row = sqlx::query_as::<_, OperationalTaskRow>(
            r#"
            SELECT id, designation, progress, status, created_at, updated_at
            FROM operational_tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_progress(&self, id: Id, progress: i32) -> RepositoryResult<OperationalTaskRow> {
        let row = sqlx::query_as::<_, OperationalTaskRow>(
            r#"
            UPDATE operational_tasks
            SET progress = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, designation, progress, status, created_at, updated_at
            "#,
        )
        .bind(progress)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("Operational task with id {} not found", id))
        })?;

        Ok(row)
    }

    /// Transition the task's status; terminal Done also forces progress to 100
    pub async fn update_status(
        &self,
        id: Id,
        status: OperationalTaskStatus,
    ) -> RepositoryResult<OperationalTaskRow> {
        let row = sqlx::query_as::<_, OperationalTaskRow>(
            r#"
            UPDATE operational_tasks
            SET status = $1,
                progress = CASE WHEN $1 = 'done' THEN 100 ELSE progress END,
                updated_at = NOW()
            WHERE id = $2
            RETURNING id, designation, progress, status, created_at, updated_at
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("Operational task with id {} not found", id))
        })?;

        Ok(row)
    }
}
