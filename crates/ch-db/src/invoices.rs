//! Invoice repository
//!
//! Read path for the billing value feed. Only validated and accounted
//! invoices contribute to cumulative billing.

use chrono::{DateTime, NaiveDate, Utc};
use ch_core::traits::Id;
use ch_models::{Invoice, InvoiceStatus};
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

/// Invoice database entity
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub id: i64,
    pub project_id: i64,
    pub reference: String,
    pub status: String,
    pub total_amount: f64,
    pub invoice_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice {
            id: Some(row.id),
            project_id: row.project_id,
            reference: row.reference,
            status: InvoiceStatus::parse(&row.status).unwrap_or_default(),
            total_amount: row.total_amount,
            invoice_date: row.invoice_date,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Invoice repository implementation
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Billable invoices of one project, oldest first
    pub async fn find_billable_by_project(&self, project_id: Id) -> RepositoryResult<Vec<InvoiceRow>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, project_id, reference, status, total_amount, invoice_date,
                   created_at, updated_at
            FROM invoices
            WHERE project_id = $1
              AND status IN ('validated', 'accounted')
            ORDER BY invoice_date ASC NULLS LAST, id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
