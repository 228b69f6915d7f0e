//! Batch sub-task progress edits scoped to one block/floor context
//!
//! A site manager reports progress for one article within one block (and
//! optionally one floor). The service validates the percentages, applies them
//! to an in-memory snapshot of the article subtree, rolls the article up, and
//! persists leaf writes and the recomputed row in a single atomic batch.

use std::sync::Arc;

use ch_core::error::ValidationErrors;
use ch_core::traits::Id;
use ch_models::BlockArticleProgress;

use crate::error::{EngineError, EngineResult};
use crate::rollup::article_rollup;
use crate::store::{BlockBatchWrite, ProgressStore, SubTaskPercentageUpdate};

/// One sub-task percentage reported from the field
#[derive(Debug, Clone, Copy)]
pub struct BlockSubTaskUpdate {
    pub sub_task_id: Id,
    pub percentage: f64,
}

/// A batch update for one (block, article, floor) progress row
#[derive(Debug, Clone)]
pub struct BlockProgressUpdate {
    pub block_id: Id,
    pub article_id: Id,
    pub floor_number: Option<i32>,
    pub sub_tasks: Vec<BlockSubTaskUpdate>,
    pub pv_document_url: Option<String>,
}

pub struct BlockProgressService {
    store: Arc<dyn ProgressStore>,
}

impl BlockProgressService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Apply a batch of sub-task percentages and recompute the block row.
    ///
    /// Nothing is written unless the whole batch is valid: every percentage
    /// in [0, 100], the progress row present, and every sub-task id part of
    /// the article's subtree.
    pub async fn update_block_sub_task_progress(
        &self,
        update: BlockProgressUpdate,
    ) -> EngineResult<BlockArticleProgress> {
        validate_percentages(&update)?;

        let row = self
            .store
            .find_block_progress(update.block_id, update.article_id, update.floor_number)
            .await?
            .ok_or_else(|| {
                EngineError::NotFound(format!(
                    "No progress row for block {} article {} floor {:?}",
                    update.block_id, update.article_id, update.floor_number
                ))
            })?;

        let mut snapshot = self
            .store
            .article_snapshot(update.article_id)
            .await?
            .ok_or_else(|| EngineError::not_found("MarketArticle", update.article_id))?;

        // Apply the writes to the snapshot before rolling up, so the stored
        // row reflects the values being persisted in the same batch.
        for sub_task in &update.sub_tasks {
            let leaf = snapshot
                .tasks
                .iter_mut()
                .flat_map(|t| t.sub_tasks.iter_mut())
                .find(|s| s.id == sub_task.sub_task_id)
                .ok_or_else(|| EngineError::not_found("SubTask", sub_task.sub_task_id))?;
            leaf.completion_percentage = sub_task.percentage;
        }

        let rollup = article_rollup(&snapshot);

        let row_id = row
            .id
            .ok_or_else(|| EngineError::Database("progress row without id".into()))?;

        self.store
            .apply_block_batch(BlockBatchWrite {
                row_id,
                sub_task_updates: update
                    .sub_tasks
                    .iter()
                    .map(|s| SubTaskPercentageUpdate {
                        sub_task_id: s.sub_task_id,
                        percentage: s.percentage,
                    })
                    .collect(),
                completion_percentage: rollup.progress,
                completed_amount: rollup.earned_value,
                pv_document_url: update.pv_document_url,
            })
            .await
    }
}

fn validate_percentages(update: &BlockProgressUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for (index, sub_task) in update.sub_tasks.iter().enumerate() {
        if !(0.0..=100.0).contains(&sub_task.percentage) || !sub_task.percentage.is_finite() {
            errors.add(
                format!("subTasks[{}].percentage", index),
                format!(
                    "must be between 0 and 100, got {}",
                    sub_task.percentage
                ),
            );
        }
    }
    if update.sub_tasks.is_empty() {
        errors.add_base("at least one sub-task update is required");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryStore;

    fn service(store: Arc<InMemoryStore>) -> BlockProgressService {
        BlockProgressService::new(store)
    }

    /// A 100k article with one 10-day task split 60/40 by weight
    fn seed(store: &InMemoryStore) -> (Id, Id, Id, Id, Id) {
        let article_id = store.add_article(1, 100_000.0);
        let task_id = store.add_task(article_id, 10.0, None);
        let heavy = store.add_sub_task(task_id, 0.0, 60.0, false);
        let light = store.add_sub_task(task_id, 0.0, 40.0, false);
        let row_id = store.add_block_row(7, article_id, Some(2));
        (article_id, task_id, heavy, light, row_id)
    }

    #[tokio::test]
    async fn test_batch_update_recomputes_row() {
        let store = Arc::new(InMemoryStore::new());
        let (article_id, _, heavy, light, row_id) = seed(&store);

        let row = service(store.clone())
            .update_block_sub_task_progress(BlockProgressUpdate {
                block_id: 7,
                article_id,
                floor_number: Some(2),
                sub_tasks: vec![
                    BlockSubTaskUpdate { sub_task_id: heavy, percentage: 100.0 },
                    BlockSubTaskUpdate { sub_task_id: light, percentage: 0.0 },
                ],
                pv_document_url: None,
            })
            .await
            .unwrap();

        assert_eq!(row.completion_percentage, 60.0);
        assert_eq!(row.completed_amount, 60_000.0);
        assert_eq!(store.sub_task_value(heavy), Some(100.0));
        assert_eq!(store.block_row(row_id).unwrap().completion_percentage, 60.0);
    }

    #[tokio::test]
    async fn test_out_of_range_percentage_rejected_before_writes() {
        let store = Arc::new(InMemoryStore::new());
        let (article_id, _, heavy, _, _) = seed(&store);

        let err = service(store.clone())
            .update_block_sub_task_progress(BlockProgressUpdate {
                block_id: 7,
                article_id,
                floor_number: Some(2),
                sub_tasks: vec![BlockSubTaskUpdate { sub_task_id: heavy, percentage: 140.0 }],
                pv_document_url: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(store.sub_task_value(heavy), Some(0.0));
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let (article_id, ..) = seed(&store);

        let err = service(store)
            .update_block_sub_task_progress(BlockProgressUpdate {
                block_id: 7,
                article_id,
                floor_number: Some(2),
                sub_tasks: vec![],
                pv_document_url: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_row_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let (article_id, _, heavy, _, _) = seed(&store);

        // Wrong floor: the (block, article, floor) triple has no row
        let err = service(store)
            .update_block_sub_task_progress(BlockProgressUpdate {
                block_id: 7,
                article_id,
                floor_number: Some(9),
                sub_tasks: vec![BlockSubTaskUpdate { sub_task_id: heavy, percentage: 50.0 }],
                pv_document_url: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_foreign_sub_task_id_fails_whole_batch() {
        let store = Arc::new(InMemoryStore::new());
        let (article_id, _, heavy, _, row_id) = seed(&store);

        let err = service(store.clone())
            .update_block_sub_task_progress(BlockProgressUpdate {
                block_id: 7,
                article_id,
                floor_number: Some(2),
                sub_tasks: vec![
                    BlockSubTaskUpdate { sub_task_id: heavy, percentage: 100.0 },
                    BlockSubTaskUpdate { sub_task_id: 9999, percentage: 50.0 },
                ],
                pv_document_url: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::NotFound(_)));
        // The valid half of the batch must not have been applied
        assert_eq!(store.sub_task_value(heavy), Some(0.0));
        assert_eq!(store.block_row(row_id).unwrap().completion_percentage, 0.0);
    }

    #[tokio::test]
    async fn test_pv_url_marks_row_uploaded() {
        let store = Arc::new(InMemoryStore::new());
        let (article_id, _, heavy, light, _) = seed(&store);

        let row = service(store)
            .update_block_sub_task_progress(BlockProgressUpdate {
                block_id: 7,
                article_id,
                floor_number: Some(2),
                sub_tasks: vec![
                    BlockSubTaskUpdate { sub_task_id: heavy, percentage: 100.0 },
                    BlockSubTaskUpdate { sub_task_id: light, percentage: 100.0 },
                ],
                pv_document_url: Some("https://docs.example.com/pv/42.pdf".into()),
            })
            .await
            .unwrap();

        assert!(row.pv_uploaded);
        assert_eq!(
            row.pv_document_url.as_deref(),
            Some("https://docs.example.com/pv/42.pdf")
        );
    }

    #[tokio::test]
    async fn test_reserve_leaves_do_not_move_the_row() {
        let store = Arc::new(InMemoryStore::new());
        let (article_id, task_id, heavy, light, _) = seed(&store);
        let reserve = store.add_sub_task(task_id, 0.0, 100.0, true);

        let row = service(store)
            .update_block_sub_task_progress(BlockProgressUpdate {
                block_id: 7,
                article_id,
                floor_number: Some(2),
                sub_tasks: vec![
                    BlockSubTaskUpdate { sub_task_id: heavy, percentage: 100.0 },
                    BlockSubTaskUpdate { sub_task_id: light, percentage: 0.0 },
                    BlockSubTaskUpdate { sub_task_id: reserve, percentage: 100.0 },
                ],
                pv_document_url: None,
            })
            .await
            .unwrap();

        // Reserve percentage is stored but excluded from aggregation
        assert_eq!(row.completion_percentage, 60.0);
    }
}
