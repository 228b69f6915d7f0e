//! Block/floor article progress model
//!
//! Table: block_article_progress

use chrono::{DateTime, Utc};
use ch_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};

/// One article's progress within one physical block and optional floor.
///
/// There is at most one record per (block, article, floor) triple; rows are
/// created once during structure setup and only mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlockArticleProgress {
    pub id: Option<Id>,
    pub block_id: Id,
    pub article_id: Id,
    pub floor_number: Option<i32>,
    pub completion_percentage: f64,
    /// Monetary value of completed work, derived from article progress
    pub completed_amount: f64,
    pub pv_required: bool,
    pub pv_uploaded: bool,
    pub pv_document_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for BlockArticleProgress {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for BlockArticleProgress {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
