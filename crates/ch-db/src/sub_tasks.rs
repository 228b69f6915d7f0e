//! Sub-task repository
//!
//! Database operations for the finest-grained completion units.

use chrono::{DateTime, Utc};
use ch_core::traits::Id;
use ch_models::SubTask;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// Sub-task database entity
#[derive(Debug, Clone, FromRow)]
pub struct SubTaskRow {
    pub id: i64,
    pub task_id: i64,
    pub code: String,
    pub designation: String,
    pub completion_percentage: f64,
    pub weight: f64,
    pub is_reserve: bool,
    pub duration_days: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubTaskRow> for SubTask {
    fn from(row: SubTaskRow) -> Self {
        SubTask {
            id: Some(row.id),
            task_id: row.task_id,
            code: row.code,
            designation: row.designation,
            completion_percentage: row.completion_percentage,
            weight: row.weight,
            is_reserve: row.is_reserve,
            duration_days: row.duration_days,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// DTO for creating a sub-task
#[derive(Debug, Clone)]
pub struct CreateSubTaskDto {
    pub task_id: i64,
    pub code: String,
    pub designation: String,
    pub weight: f64,
    pub is_reserve: bool,
    pub duration_days: f64,
}

/// Sub-task repository implementation
pub struct SubTaskRepository {
    pool: PgPool,
}

impl SubTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<SubTaskRow>> {
        let row = sqlx::query_as::<_, SubTaskRow>(
            r#"
            SELECT id, task_id, code, designation, completion_percentage, weight,
                   is_reserve, duration_days, created_at, updated_at
            FROM sub_tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find the sub-tasks of one task
    pub async fn find_by_task(&self, task_id: Id) -> RepositoryResult<Vec<SubTaskRow>> {
        let rows = sqlx::query_as::<_, SubTaskRow>(
            r#"
            SELECT id, task_id, code, designation, completion_percentage, weight,
                   is_reserve, duration_days, created_at, updated_at
            FROM sub_tasks
            WHERE task_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_duration(&self, id: Id, duration_days: f64) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE sub_tasks SET duration_days = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(duration_days)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Sub-task with id {} not found",
                id
            )));
        }

        Ok(())
    }

    pub async fn create(&self, dto: CreateSubTaskDto) -> RepositoryResult<SubTaskRow> {
        let row = sqlx::query_as::<_, SubTaskRow>(
            r#"
            INSERT INTO sub_tasks (
                task_id, code, designation, completion_percentage, weight,
                is_reserve, duration_days, created_at, updated_at
            ) VALUES (
                $1, $2, $3, 0, $4, $5, $6, NOW(), NOW()
            )
            RETURNING id, task_id, code, designation, completion_percentage, weight,
                      is_reserve, duration_days, created_at, updated_at
            "#,
        )
        .bind(dto.task_id)
        .bind(&dto.code)
        .bind(&dto.designation)
        .bind(dto.weight)
        .bind(dto.is_reserve)
        .bind(dto.duration_days)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
