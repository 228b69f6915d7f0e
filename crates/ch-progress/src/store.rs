//! The repository-style interface the engine reads and writes through
//!
//! Keeping the engine behind this trait lets the aggregation services run
//! against an in-memory store in tests and leaves room to swap a caching
//! implementation in later without touching call sites.

use async_trait::async_trait;
use ch_core::traits::Id;
use ch_models::{
    ArticleTask, BlockArticleProgress, Invoice, Lot, OperationalTask, OperationalTaskStatus,
    Project, SubTask,
};

use crate::error::EngineResult;
use crate::snapshot::ArticleSnapshot;

mod pg;

pub use pg::PgProgressStore;

/// One sub-task percentage write inside a block batch
#[derive(Debug, Clone, Copy)]
pub struct SubTaskPercentageUpdate {
    pub sub_task_id: Id,
    pub percentage: f64,
}

/// The full write-back of a block batch update: leaf percentages plus the
/// recomputed row values, applied atomically by the implementation.
#[derive(Debug, Clone)]
pub struct BlockBatchWrite {
    pub row_id: Id,
    pub sub_task_updates: Vec<SubTaskPercentageUpdate>,
    pub completion_percentage: f64,
    pub completed_amount: f64,
    pub pv_document_url: Option<String>,
}

/// Attributes for inserting a sub-task through the schedule service
#[derive(Debug, Clone)]
pub struct NewSubTaskRecord {
    pub task_id: Id,
    pub code: String,
    pub designation: String,
    pub weight: f64,
    pub is_reserve: bool,
    pub duration_days: f64,
}

/// Store interface for the progress engine
#[async_trait]
pub trait ProgressStore: Send + Sync {
    // Tree reads

    /// Load one article subtree (tasks, sub-tasks, operational progress)
    async fn article_snapshot(&self, article_id: Id) -> EngineResult<Option<ArticleSnapshot>>;

    /// Load every article subtree under a project, in lot order
    async fn project_article_snapshots(&self, project_id: Id) -> EngineResult<Vec<ArticleSnapshot>>;

    async fn project(&self, project_id: Id) -> EngineResult<Option<Project>>;

    /// Lots under the project's markets, in display order
    async fn project_lots(&self, project_id: Id) -> EngineResult<Vec<Lot>>;

    /// Billable invoices of a project, oldest first
    async fn billable_invoices(&self, project_id: Id) -> EngineResult<Vec<Invoice>>;

    // Block progress

    async fn find_block_progress(
        &self,
        block_id: Id,
        article_id: Id,
        floor_number: Option<i32>,
    ) -> EngineResult<Option<BlockArticleProgress>>;

    async fn block_progress_for_article(
        &self,
        article_id: Id,
    ) -> EngineResult<Vec<BlockArticleProgress>>;

    /// Apply a block batch atomically; fails with NotFound if any referenced
    /// sub-task or the row itself is missing
    async fn apply_block_batch(&self, batch: BlockBatchWrite)
        -> EngineResult<BlockArticleProgress>;

    /// Overwrite progress on every block row of one article; returns the
    /// number of rows touched
    async fn overwrite_article_progress(
        &self,
        article_id: Id,
        completion_percentage: f64,
        completed_amount: f64,
    ) -> EngineResult<u64>;

    // Schedule reads/writes

    async fn article_task(&self, task_id: Id) -> EngineResult<Option<ArticleTask>>;

    async fn article_task_for_operational(
        &self,
        operational_task_id: Id,
    ) -> EngineResult<Option<ArticleTask>>;

    async fn sub_task(&self, sub_task_id: Id) -> EngineResult<Option<SubTask>>;

    async fn task_sub_tasks(&self, task_id: Id) -> EngineResult<Vec<SubTask>>;

    async fn insert_sub_task(&self, record: NewSubTaskRecord) -> EngineResult<SubTask>;

    async fn set_sub_task_duration(&self, sub_task_id: Id, duration_days: f64) -> EngineResult<()>;

    async fn set_task_duration(&self, task_id: Id, duration_days: f64) -> EngineResult<()>;

    // Operational task writes (inbound trigger path)

    async fn set_operational_progress(&self, id: Id, progress: i32)
        -> EngineResult<OperationalTask>;

    async fn set_operational_status(
        &self,
        id: Id,
        status: OperationalTaskStatus,
    ) -> EngineResult<OperationalTask>;
}
