//! Whole-project rollup, planned trend, and the billing feed
//!
//! Everything here is recomputed fresh per call from the article subtrees
//! and the invoice list; no cached aggregate is read.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ch_core::traits::Id;
use ch_models::{Invoice, ProjectStats, SeriesPoint};

use crate::error::{EngineError, EngineResult};
use crate::rollup::article_rollup;
use crate::store::ProgressStore;

pub struct ProjectStatsService {
    store: Arc<dyn ProgressStore>,
}

impl ProjectStatsService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Project stats as of today.
    pub async fn compute(&self, project_id: Id) -> EngineResult<ProjectStats> {
        self.compute_at(project_id, Utc::now().date_naive()).await
    }

    /// Project stats with an explicit "today", so the schedule baseline is
    /// reproducible.
    pub async fn compute_at(&self, project_id: Id, today: NaiveDate) -> EngineResult<ProjectStats> {
        let project = self
            .store
            .project(project_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Project", project_id))?;

        let snapshots = self.store.project_article_snapshots(project_id).await?;

        let mut total_market_amount = 0.0;
        let mut production_cost = 0.0;
        for snapshot in &snapshots {
            total_market_amount += snapshot.total_amount;
            production_cost += article_rollup(snapshot).earned_value;
        }

        let progress_percentage = if total_market_amount > 0.0 {
            production_cost / total_market_amount * 100.0
        } else {
            0.0
        };

        let invoices = self.store.billable_invoices(project_id).await?;
        let total_billed: f64 = invoices.iter().map(|i| i.total_amount).sum();

        Ok(ProjectStats {
            production_cost,
            total_market_amount,
            total_billed,
            estimated_production: estimated_production(
                project.start_date,
                project.end_date,
                today,
                total_market_amount,
            ),
            progress_percentage,
            billing_history: cumulative_billing(&invoices),
            planned_trend: planned_trend(
                project.start_date,
                project.end_date,
                total_market_amount,
            ),
        })
    }
}

/// Schedule-based production expectation, independent of reported progress.
///
/// Before the start date nothing is expected; past the end date the full
/// market amount is. In between the expectation grows linearly with elapsed
/// calendar days.
pub fn estimated_production(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
    total_market_amount: f64,
) -> f64 {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => return 0.0,
    };

    if today >= end {
        return total_market_amount;
    }
    if today <= start {
        return 0.0;
    }

    let total_days = (end - start).num_days();
    if total_days <= 0 {
        // today is strictly between start and end, so this cannot happen,
        // but a zero denominator must never slip through
        return total_market_amount;
    }
    let elapsed_days = (today - start).num_days();

    elapsed_days as f64 / total_days as f64 * total_market_amount
}

/// Two-point straight-line spending target; empty when the project has no
/// schedule bounds or no market amount to spread over them.
pub fn planned_trend(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    total_market_amount: f64,
) -> Vec<SeriesPoint> {
    match (start, end) {
        (Some(start), Some(end)) if total_market_amount > 0.0 => vec![
            SeriesPoint::new(start, 0.0),
            SeriesPoint::new(end, total_market_amount),
        ],
        _ => Vec::new(),
    }
}

/// Running billed total per invoice date, as a step series.
///
/// Invoices are expected billable and date-ascending; undated invoices count
/// toward totals elsewhere but cannot be placed on a time axis, so they are
/// skipped here.
pub fn cumulative_billing(invoices: &[Invoice]) -> Vec<SeriesPoint> {
    let mut running = 0.0;
    invoices
        .iter()
        .filter_map(|invoice| {
            let date = invoice.invoice_date?;
            running += invoice.total_amount;
            Some(SeriesPoint::new(date, running))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryStore;
    use ch_models::{InvoiceStatus, Project};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(project_id: Id, status: InvoiceStatus, amount: f64, day: NaiveDate) -> Invoice {
        Invoice {
            project_id,
            reference: format!("INV-{}", day),
            status,
            total_amount: amount,
            invoice_date: Some(day),
            ..Default::default()
        }
    }

    #[test]
    fn test_estimated_production_midway() {
        // 2024-01-01 to 2024-12-31, read on 2024-07-02: 183 of 365 days
        let value = estimated_production(
            Some(date(2024, 1, 1)),
            Some(date(2024, 12, 31)),
            date(2024, 7, 2),
            1_000_000.0,
        );
        assert!((500_000.0..=510_000.0).contains(&value), "got {}", value);
    }

    #[test]
    fn test_estimated_production_outside_bounds() {
        let start = Some(date(2024, 1, 1));
        let end = Some(date(2024, 12, 31));
        assert_eq!(estimated_production(start, end, date(2023, 6, 1), 500.0), 0.0);
        assert_eq!(estimated_production(start, end, date(2024, 1, 1), 500.0), 0.0);
        assert_eq!(estimated_production(start, end, date(2024, 12, 31), 500.0), 500.0);
        assert_eq!(estimated_production(start, end, date(2025, 3, 1), 500.0), 500.0);
    }

    #[test]
    fn test_estimated_production_without_dates() {
        assert_eq!(estimated_production(None, Some(date(2024, 6, 1)), date(2024, 3, 1), 500.0), 0.0);
        assert_eq!(estimated_production(Some(date(2024, 1, 1)), None, date(2024, 3, 1), 500.0), 0.0);
    }

    #[test]
    fn test_planned_trend_two_points() {
        let trend = planned_trend(Some(date(2024, 1, 1)), Some(date(2024, 12, 31)), 800.0);
        assert_eq!(
            trend,
            vec![
                SeriesPoint::new(date(2024, 1, 1), 0.0),
                SeriesPoint::new(date(2024, 12, 31), 800.0),
            ]
        );
    }

    #[test]
    fn test_planned_trend_undefined_cases() {
        assert!(planned_trend(None, Some(date(2024, 12, 31)), 800.0).is_empty());
        assert!(planned_trend(Some(date(2024, 1, 1)), None, 800.0).is_empty());
        assert!(planned_trend(Some(date(2024, 1, 1)), Some(date(2024, 12, 31)), 0.0).is_empty());
    }

    #[test]
    fn test_cumulative_billing_steps() {
        let invoices = vec![
            invoice(1, InvoiceStatus::Validated, 100.0, date(2024, 2, 1)),
            invoice(1, InvoiceStatus::Accounted, 200.0, date(2024, 4, 1)),
        ];
        let series = cumulative_billing(&invoices);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].amount, 100.0);
        assert_eq!(series[1].amount, 300.0);
    }

    #[tokio::test]
    async fn test_compute_rolls_whole_project_up() {
        let store = Arc::new(InMemoryStore::new());
        let project_id = store.add_project(Project {
            name: "Tour Horizon".into(),
            code: Some("TH-01".into()),
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2024, 12, 31)),
            ..Default::default()
        });

        // Article 1: 600k at 50%, article 2: 400k at 100%
        let article_a = store.add_article(project_id, 600_000.0);
        let op_a = store.add_operational_task(50);
        store.add_task(article_a, 10.0, Some(op_a));

        let article_b = store.add_article(project_id, 400_000.0);
        let op_b = store.add_operational_task(100);
        store.add_task(article_b, 10.0, Some(op_b));

        // Draft invoice must not count
        store.add_invoice(invoice(project_id, InvoiceStatus::Validated, 100.0, date(2024, 2, 1)));
        store.add_invoice(invoice(project_id, InvoiceStatus::Draft, 50.0, date(2024, 3, 1)));
        store.add_invoice(invoice(project_id, InvoiceStatus::Accounted, 200.0, date(2024, 4, 1)));

        let stats = ProjectStatsService::new(store)
            .compute_at(project_id, date(2024, 7, 2))
            .await
            .unwrap();

        assert_eq!(stats.total_market_amount, 1_000_000.0);
        assert_eq!(stats.production_cost, 700_000.0);
        assert_eq!(stats.progress_percentage, 70.0);
        assert_eq!(stats.total_billed, 300.0);
        assert_eq!(
            stats.billing_history.iter().map(|p| p.amount).collect::<Vec<_>>(),
            vec![100.0, 300.0]
        );
        assert_eq!(stats.planned_trend.len(), 2);
        assert!(
            (500_000.0..=510_000.0).contains(&stats.estimated_production),
            "got {}",
            stats.estimated_production
        );
    }

    #[tokio::test]
    async fn test_empty_project_is_all_zero() {
        let store = Arc::new(InMemoryStore::new());
        let project_id = store.add_project(Project {
            name: "Chantier vide".into(),
            code: Some("CV-01".into()),
            ..Default::default()
        });

        let stats = ProjectStatsService::new(store)
            .compute_at(project_id, date(2024, 7, 2))
            .await
            .unwrap();

        assert_eq!(stats.total_market_amount, 0.0);
        assert_eq!(stats.production_cost, 0.0);
        assert_eq!(stats.progress_percentage, 0.0);
        assert!(stats.billing_history.is_empty());
        assert!(stats.planned_trend.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let err = ProjectStatsService::new(store)
            .compute_at(404, date(2024, 7, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
