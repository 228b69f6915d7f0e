//! In-memory tree snapshots the aggregation math runs over
//!
//! The engine never aggregates against live rows; it loads a snapshot of the
//! article subtree, computes, then writes results back through the store.

use ch_core::traits::Id;

/// Leaf completion unit
#[derive(Debug, Clone, PartialEq)]
pub struct SubTaskSnapshot {
    pub id: Id,
    pub completion_percentage: f64,
    pub weight: f64,
    pub is_reserve: bool,
}

/// One task with its sub-tasks and optional authoritative operational progress
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSnapshot {
    pub id: Id,
    pub duration_days: f64,
    /// When set, this value overrides sub-task aggregation entirely
    pub operational_progress: Option<f64>,
    pub sub_tasks: Vec<SubTaskSnapshot>,
}

/// One market article with its tasks
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleSnapshot {
    pub id: Id,
    pub total_amount: f64,
    pub tasks: Vec<TaskSnapshot>,
}

/// Result of rolling an article up: physical progress and earned value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArticleRollup {
    /// Duration-weighted completion percentage, in [0, 100]
    pub progress: f64,
    /// total_amount x progress / 100
    pub earned_value: f64,
}
