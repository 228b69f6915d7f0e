//! Article-wide recalculation triggered by operational task updates
//!
//! Planning tools push progress into operational tasks; when a linked task
//! moves, every block progress row of the owning article is recomputed from
//! the current subtree and overwritten in one statement.

use std::sync::Arc;

use ch_core::error::ValidationErrors;
use ch_core::traits::Id;
use ch_models::{OperationalTask, OperationalTaskStatus};

use crate::error::{EngineError, EngineResult};
use crate::rollup::article_rollup;
use crate::store::ProgressStore;

/// What one article recalculation produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecalcOutcome {
    pub article_id: Id,
    pub progress: f64,
    pub earned_value: f64,
    pub rows_updated: u64,
}

pub struct RecalculationService {
    store: Arc<dyn ProgressStore>,
}

impl RecalculationService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Write an operational task's progress. Recalculation is the caller's
    /// concern (normally the dispatcher, after the write commits).
    pub async fn update_operational_progress(
        &self,
        operational_task_id: Id,
        progress: i32,
    ) -> EngineResult<OperationalTask> {
        if !(0..=100).contains(&progress) {
            let mut errors = ValidationErrors::new();
            errors.add("progress", "must be between 0 and 100");
            return Err(errors.into());
        }
        self.store
            .set_operational_progress(operational_task_id, progress)
            .await
    }

    /// Move an operational task to a new status. `Done` forces progress to
    /// 100 in the same write.
    pub async fn update_operational_status(
        &self,
        operational_task_id: Id,
        status: OperationalTaskStatus,
    ) -> EngineResult<OperationalTask> {
        self.store
            .set_operational_status(operational_task_id, status)
            .await
    }

    /// Recalculate the article linked to an operational task.
    ///
    /// Operational tasks without a schedule link are a normal case (not every
    /// planning row maps into a market), so a missing link is `Ok(None)`,
    /// not an error.
    pub async fn recalculate_for_operational_task(
        &self,
        operational_task_id: Id,
    ) -> EngineResult<Option<RecalcOutcome>> {
        let task = match self
            .store
            .article_task_for_operational(operational_task_id)
            .await?
        {
            Some(task) => task,
            None => return Ok(None),
        };

        Ok(Some(self.recalculate_article(task.article_id).await?))
    }

    /// Recompute one article's rollup and overwrite all of its block rows.
    pub async fn recalculate_article(&self, article_id: Id) -> EngineResult<RecalcOutcome> {
        let snapshot = self
            .store
            .article_snapshot(article_id)
            .await?
            .ok_or_else(|| EngineError::not_found("MarketArticle", article_id))?;

        let rollup = article_rollup(&snapshot);

        let rows_updated = self
            .store
            .overwrite_article_progress(article_id, rollup.progress, rollup.earned_value)
            .await?;

        tracing::debug!(
            article_id,
            progress = rollup.progress,
            earned_value = rollup.earned_value,
            rows_updated,
            "article recalculated"
        );

        Ok(RecalcOutcome {
            article_id,
            progress: rollup.progress,
            earned_value: rollup.earned_value,
            rows_updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryStore;

    #[tokio::test]
    async fn test_operational_update_then_recalc_overwrites_all_rows() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 200_000.0);
        let op_id = store.add_operational_task(0);
        store.add_task(article_id, 10.0, Some(op_id));
        let row_a = store.add_block_row(1, article_id, None);
        let row_b = store.add_block_row(2, article_id, Some(3));

        let service = RecalculationService::new(store.clone());
        service.update_operational_progress(op_id, 50).await.unwrap();
        let outcome = service
            .recalculate_for_operational_task(op_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.article_id, article_id);
        assert_eq!(outcome.progress, 50.0);
        assert_eq!(outcome.earned_value, 100_000.0);
        assert_eq!(outcome.rows_updated, 2);
        assert_eq!(store.block_row(row_a).unwrap().completion_percentage, 50.0);
        assert_eq!(store.block_row(row_b).unwrap().completed_amount, 100_000.0);
    }

    #[tokio::test]
    async fn test_unlinked_operational_task_is_a_no_op() {
        let store = Arc::new(InMemoryStore::new());
        let op_id = store.add_operational_task(40);

        let outcome = RecalculationService::new(store)
            .recalculate_for_operational_task(op_id)
            .await
            .unwrap();

        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_done_status_forces_full_progress() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 80_000.0);
        let op_id = store.add_operational_task(30);
        store.add_task(article_id, 5.0, Some(op_id));
        store.add_block_row(1, article_id, None);

        let service = RecalculationService::new(store);
        let task = service
            .update_operational_status(op_id, OperationalTaskStatus::Done)
            .await
            .unwrap();
        assert_eq!(task.progress, 100);

        let outcome = service
            .recalculate_for_operational_task(op_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.progress, 100.0);
        assert_eq!(outcome.earned_value, 80_000.0);
    }

    #[tokio::test]
    async fn test_progress_range_validated() {
        let store = Arc::new(InMemoryStore::new());
        let op_id = store.add_operational_task(0);

        let err = RecalculationService::new(store)
            .update_operational_progress(op_id, 120)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_recalculate_missing_article_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let err = RecalculationService::new(store)
            .recalculate_article(404)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recalc_with_no_rows_reports_zero_updates() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 10_000.0);
        let op_id = store.add_operational_task(25);
        store.add_task(article_id, 4.0, Some(op_id));

        let outcome = RecalculationService::new(store)
            .recalculate_article(article_id)
            .await
            .unwrap();
        assert_eq!(outcome.rows_updated, 0);
        assert_eq!(outcome.progress, 25.0);
    }
}
