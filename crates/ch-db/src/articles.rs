//! Market article repository
//!
//! Database operations for priced contract line items.

use chrono::{DateTime, Utc};
use ch_core::traits::Id;
use ch_models::MarketArticle;
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

/// Market article database entity
#[derive(Debug, Clone, FromRow)]
pub struct MarketArticleRow {
    pub id: i64,
    pub lot_id: i64,
    pub code: String,
    pub designation: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_amount: f64,
    pub pv_required: bool,
    pub pv_uploaded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MarketArticleRow> for MarketArticle {
    fn from(row: MarketArticleRow) -> Self {
        MarketArticle {
            id: Some(row.id),
            lot_id: row.lot_id,
            code: row.code,
            designation: row.designation,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_amount: row.total_amount,
            pv_required: row.pv_required,
            pv_uploaded: row.pv_uploaded,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Market article repository implementation
pub struct MarketArticleRepository {
    pool: PgPool,
}

impl MarketArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<MarketArticleRow>> {
        let row = sqlx::query_as::<_, MarketArticleRow>(
            r#"
            SELECT id, lot_id, code, designation, quantity, unit_price,
                   total_amount, pv_required, pv_uploaded, created_at, updated_at
            FROM market_articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find every article under a project, walking markets and lots
    pub async fn find_by_project(&self, project_id: Id) -> RepositoryResult<Vec<MarketArticleRow>> {
        let rows = sqlx::query_as::<_, MarketArticleRow>(
            r#"
            SELECT a.id, a.lot_id, a.code, a.designation, a.quantity, a.unit_price,
                   a.total_amount, a.pv_required, a.pv_uploaded, a.created_at, a.updated_at
            FROM market_articles a
            JOIN lots l ON l.id = a.lot_id
            JOIN markets m ON m.id = l.market_id
            WHERE m.project_id = $1
            ORDER BY l.position ASC, a.id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
