//! Market article, task, and sub-task models
//!
//! Tables: market_articles, article_tasks, sub_tasks

use chrono::{DateTime, Utc};
use ch_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Market article entity
///
/// A priced contract line item (quantity x unit price) within a lot.
/// `total_amount` is the basis for all earned-value conversions downstream.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MarketArticle {
    pub id: Option<Id>,
    pub lot_id: Id,
    pub code: String,
    pub designation: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// quantity x unit_price, computed once at structure setup
    pub total_amount: f64,
    /// Whether a completion-evidence document (PV) is required
    pub pv_required: bool,
    pub pv_uploaded: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MarketArticle {
    /// Compute the contract amount from quantity and unit price
    pub fn compute_total_amount(quantity: f64, unit_price: f64) -> f64 {
        quantity * unit_price
    }
}

impl Identifiable for MarketArticle {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for MarketArticle {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// Article task entity
///
/// A unit of physical work under an article. Its `duration_days` is the
/// weight used when rolling task completions up to the article level. When
/// `operational_task_id` is set, the linked operational task's progress is
/// authoritative and sub-task completion is not separately aggregated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArticleTask {
    pub id: Option<Id>,
    pub article_id: Id,
    pub designation: String,
    pub duration_days: f64,
    pub operational_task_id: Option<Id>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for ArticleTask {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

/// Sub-task entity
///
/// The finest-grained trackable unit of completion. `weight` is its relative
/// importance within the parent task; reserve items are excluded from
/// completion aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: Option<Id>,
    pub task_id: Id,
    pub code: String,
    pub designation: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub completion_percentage: f64,
    pub weight: f64,
    pub is_reserve: bool,
    pub duration_days: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for SubTask {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_amount() {
        assert_eq!(MarketArticle::compute_total_amount(40.0, 25_000.0), 1_000_000.0);
        assert_eq!(MarketArticle::compute_total_amount(0.0, 25_000.0), 0.0);
    }

    #[test]
    fn test_persistence_state() {
        let mut article = MarketArticle::default();
        assert!(article.is_new_record());

        article.id = Some(42);
        assert!(article.is_persisted());
        assert_eq!(Identifiable::id(&article), Some(42));
    }

    #[test]
    fn test_sub_task_percentage_validation() {
        let mut sub_task = SubTask {
            task_id: 1,
            completion_percentage: 50.0,
            ..Default::default()
        };
        assert!(sub_task.validate().is_ok());

        sub_task.completion_percentage = 120.0;
        assert!(sub_task.validate().is_err());
    }
}
