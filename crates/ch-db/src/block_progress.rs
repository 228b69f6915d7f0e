//! Block/floor article progress repository
//!
//! Database operations for per-block, per-floor progress records. The
//! (block, article, floor) triple identifies at most one row; a NULL floor
//! is matched with IS NOT DISTINCT FROM so it behaves as a value.

use chrono::{DateTime, Utc};
use ch_core::traits::Id;
use ch_models::BlockArticleProgress;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// Block article progress database entity
#[derive(Debug, Clone, FromRow)]
pub struct BlockProgressRow {
    pub id: i64,
    pub block_id: i64,
    pub article_id: i64,
    pub floor_number: Option<i32>,
    pub completion_percentage: f64,
    pub completed_amount: f64,
    pub pv_required: bool,
    pub pv_uploaded: bool,
    pub pv_document_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BlockProgressRow> for BlockArticleProgress {
    fn from(row: BlockProgressRow) -> Self {
        BlockArticleProgress {
            id: Some(row.id),
            block_id: row.block_id,
            article_id: row.article_id,
            floor_number: row.floor_number,
            completion_percentage: row.completion_percentage,
            completed_amount: row.completed_amount,
            pv_required: row.pv_required,
            pv_uploaded: row.pv_uploaded,
            pv_document_url: row.pv_document_url,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// One sub-task percentage write inside a batch
#[derive(Debug, Clone, Copy)]
pub struct SubTaskPercentageWrite {
    pub sub_task_id: i64,
    pub percentage: f64,
}

/// Block progress repository implementation
pub struct BlockProgressRepository {
    pool: PgPool,
}

impl BlockProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Locate the unique row for a (block, article, floor) triple
    pub async fn find_unique(
        &self,
        block_id: Id,
        article_id: Id,
        floor_number: Option<i32>,
    ) -> RepositoryResult<Option<BlockProgressRow>> {
        let row = sqlx::query_as::<_, BlockProgressRow>(
            r#"
            SELECT id, block_id, article_id, floor_number, completion_percentage,
                   completed_amount, pv_required, pv_uploaded, pv_document_url,
                   created_at, updated_at
            FROM block_article_progress
            WHERE block_id = $1
              AND article_id = $2
              AND floor_number IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(block_id)
        .bind(article_id)
        .bind(floor_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// All progress rows referencing one article
    pub async fn find_by_article(&self, article_id: Id) -> RepositoryResult<Vec<BlockProgressRow>> {
        let rows = sqlx::query_as::<_, BlockProgressRow>(
            r#"
            SELECT id, block_id, article_id, floor_number, completion_percentage,
                   completed_amount, pv_required, pv_uploaded, pv_document_url,
                   created_at, updated_at
            FROM block_article_progress
            WHERE article_id = $1
            ORDER BY block_id ASC, floor_number ASC NULLS FIRST
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Apply a sub-task percentage batch and the resulting row overwrite in
    /// one transaction. Either every write lands or none does.
    pub async fn apply_batch(
        &self,
        row_id: Id,
        sub_task_writes: &[SubTaskPercentageWrite],
        completion_percentage: f64,
        completed_amount: f64,
        pv_document_url: Option<&str>,
    ) -> RepositoryResult<BlockProgressRow> {
        let mut tx = self.pool.begin().await?;

        for write in sub_task_writes {
            let result = sqlx::query(
                "UPDATE sub_tasks SET completion_percentage = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(write.percentage)
            .bind(write.sub_task_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound(format!(
                    "Sub-task with id {} not found",
                    write.sub_task_id
                )));
            }
        }

        let row = sqlx::query_as::<_, BlockProgressRow>(
            r#"
            UPDATE block_article_progress
            SET completion_percentage = $1,
                completed_amount = $2,
                pv_uploaded = CASE WHEN $3::text IS NOT NULL THEN TRUE ELSE pv_uploaded END,
                pv_document_url = COALESCE($3, pv_document_url),
                updated_at = NOW()
            WHERE id = $4
            RETURNING id, block_id, article_id, floor_number, completion_percentage,
                      completed_amount, pv_required, pv_uploaded, pv_document_url,
                      created_at, updated_at
            "#,
        )
        .bind(completion_percentage)
        .bind(completed_amount)
        .bind(pv_document_url)
        .bind(row_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("Block progress row with id {} not found", row_id))
        })?;

        tx.commit().await?;

        Ok(row)
    }

    /// Overwrite progress on every row of one article in a single statement
    pub async fn overwrite_for_article(
        &self,
        article_id: Id,
        completion_percentage: f64,
        completed_amount: f64,
    ) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE block_article_progress
            SET completion_percentage = $1,
                completed_amount = $2,
                updated_at = NOW()
            WHERE article_id = $3
            "#,
        )
        .bind(completion_percentage)
        .bind(completed_amount)
        .bind(article_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
