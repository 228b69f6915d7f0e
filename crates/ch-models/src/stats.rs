//! Reporting types produced by the progress engine
//!
//! Consumed by dashboards and financial comparison charts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated amount in a chart series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Whole-project earned-value snapshot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    /// Sum of article earned values (production to date)
    pub production_cost: f64,
    /// Sum of article contract amounts
    pub total_market_amount: f64,
    /// Cumulative billed amount over validated/accounted invoices
    pub total_billed: f64,
    /// Schedule-based production expectation at the time of the read
    pub estimated_production: f64,
    /// production_cost / total_market_amount, in percent
    pub progress_percentage: f64,
    /// Cumulative billed amount step series
    pub billing_history: Vec<SeriesPoint>,
    /// Two-point linear spending target from start to end date
    pub planned_trend: Vec<SeriesPoint>,
}
