//! Lot repository
//!
//! Database operations for lots within a market.

use chrono::{DateTime, Utc};
use ch_core::traits::Id;
use ch_models::Lot;
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

/// Lot database entity
#[derive(Debug, Clone, FromRow)]
pub struct LotRow {
    pub id: i64,
    pub market_id: i64,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LotRow> for Lot {
    fn from(row: LotRow) -> Self {
        Lot {
            id: Some(row.id),
            market_id: row.market_id,
            name: row.name,
            position: row.position,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Lot repository implementation
pub struct LotRepository {
    pool: PgPool,
}

impl LotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find every lot under a project's markets, in display order
    pub async fn find_by_project(&self, project_id: Id) -> RepositoryResult<Vec<LotRow>> {
        let rows = sqlx::query_as::<_, LotRow>(
            r#"
            SELECT l.id, l.market_id, l.name, l.position, l.created_at, l.updated_at
            FROM lots l
            JOIN markets m ON m.id = l.market_id
            WHERE m.project_id = $1
            ORDER BY l.position ASC, l.id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
