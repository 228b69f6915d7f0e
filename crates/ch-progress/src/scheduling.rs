//! Sub-task schedule writes with parent-duration auto-extension
//!
//! A task can never be shorter than the sum of its sub-task durations.
//! Whenever a sub-task is added or its duration grows, the parent task's
//! duration is raised to that floor if it fell below it. Reserve sub-tasks
//! count toward the floor even though they are excluded from progress
//! aggregation: reserve work still occupies schedule time.

use std::sync::Arc;

use ch_core::error::ValidationErrors;
use ch_core::traits::Id;
use ch_models::SubTask;

use crate::error::{EngineError, EngineResult};
use crate::store::{NewSubTaskRecord, ProgressStore};

/// Attributes for creating a sub-task under an existing task
#[derive(Debug, Clone)]
pub struct NewSubTask {
    pub task_id: Id,
    pub code: String,
    pub designation: String,
    pub weight: f64,
    pub is_reserve: bool,
    pub duration_days: f64,
}

pub struct ScheduleService {
    store: Arc<dyn ProgressStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Create a sub-task at 0% completion, extending the parent task's
    /// duration when the sub-task durations now exceed it.
    pub async fn add_sub_task(&self, new: NewSubTask) -> EngineResult<SubTask> {
        validate_new(&new)?;

        let task = self
            .store
            .article_task(new.task_id)
            .await?
            .ok_or_else(|| EngineError::not_found("ArticleTask", new.task_id))?;

        let created = self
            .store
            .insert_sub_task(NewSubTaskRecord {
                task_id: new.task_id,
                code: new.code,
                designation: new.designation,
                weight: new.weight,
                is_reserve: new.is_reserve,
                duration_days: new.duration_days,
            })
            .await?;

        self.extend_parent_if_needed(new.task_id, task.duration_days)
            .await?;

        Ok(created)
    }

    /// Change a sub-task's duration, then re-check the parent floor.
    ///
    /// Shrinking a sub-task never shrinks the parent: manually planned slack
    /// stays in place.
    pub async fn set_sub_task_duration(
        &self,
        sub_task_id: Id,
        duration_days: f64,
    ) -> EngineResult<()> {
        if !(duration_days.is_finite() && duration_days >= 0.0) {
            let mut errors = ValidationErrors::new();
            errors.add("durationDays", "must be a non-negative number");
            return Err(errors.into());
        }

        let sub_task = self
            .store
            .sub_task(sub_task_id)
            .await?
            .ok_or_else(|| EngineError::not_found("SubTask", sub_task_id))?;

        let task = self
            .store
            .article_task(sub_task.task_id)
            .await?
            .ok_or_else(|| EngineError::not_found("ArticleTask", sub_task.task_id))?;

        self.store
            .set_sub_task_duration(sub_task_id, duration_days)
            .await?;

        self.extend_parent_if_needed(sub_task.task_id, task.duration_days)
            .await
    }

    async fn extend_parent_if_needed(
        &self,
        task_id: Id,
        current_duration: f64,
    ) -> EngineResult<()> {
        let sub_tasks = self.store.task_sub_tasks(task_id).await?;
        let floor: f64 = sub_tasks.iter().map(|s| s.duration_days).sum();

        if floor > current_duration {
            tracing::debug!(
                task_id,
                from = current_duration,
                to = floor,
                "extending task duration to sub-task floor"
            );
            self.store.set_task_duration(task_id, floor).await?;
        }
        Ok(())
    }
}

fn validate_new(new: &NewSubTask) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if new.code.trim().is_empty() {
        errors.add("code", "must not be blank");
    }
    if new.designation.trim().is_empty() {
        errors.add("designation", "must not be blank");
    }
    if !(new.weight.is_finite() && new.weight >= 0.0) {
        errors.add("weight", "must be a non-negative number");
    }
    if !(new.duration_days.is_finite() && new.duration_days >= 0.0) {
        errors.add("durationDays", "must be a non-negative number");
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

    fn new_sub_task(task_id: Id, duration: f64) -> NewSubTask {
        NewSubTask {
            task_id,
            code: "ST-A".into(),
            designation: "pose".into(),
            weight: 1.0,
            is_reserve: false,
            duration_days: duration,
        }
    }

    #[tokio::test]
    async fn test_add_sub_task_starts_at_zero() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 1000.0);
        let task_id = store.add_task(article_id, 10.0, None);

        let created = ScheduleService::new(store)
            .add_sub_task(new_sub_task(task_id, 3.0))
            .await
            .unwrap();

        assert_eq!(created.completion_percentage, 0.0);
        assert_eq!(created.task_id, task_id);
    }

    #[tokio::test]
    async fn test_add_extends_parent_duration() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 1000.0);
        let task_id = store.add_task(article_id, 5.0, None);
        store.add_sub_task_with_duration(task_id, 0.0, 1.0, false, 4.0);

        ScheduleService::new(store.clone())
            .add_sub_task(new_sub_task(task_id, 3.0))
            .await
            .unwrap();

        // 4 + 3 = 7 exceeds the planned 5
        assert_eq!(store.task(task_id).unwrap().duration_days, 7.0);
    }

    #[tokio::test]
    async fn test_add_within_parent_leaves_duration_alone() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 1000.0);
        let task_id = store.add_task(article_id, 10.0, None);

        ScheduleService::new(store.clone())
            .add_sub_task(new_sub_task(task_id, 3.0))
            .await
            .unwrap();

        assert_eq!(store.task(task_id).unwrap().duration_days, 10.0);
    }

    #[tokio::test]
    async fn test_reserve_durations_count_toward_floor() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 1000.0);
        let task_id = store.add_task(article_id, 2.0, None);
        store.add_sub_task_with_duration(task_id, 0.0, 1.0, true, 4.0);

        ScheduleService::new(store.clone())
            .add_sub_task(new_sub_task(task_id, 1.0))
            .await
            .unwrap();

        assert_eq!(store.task(task_id).unwrap().duration_days, 5.0);
    }

    #[tokio::test]
    async fn test_grow_duration_extends_parent() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 1000.0);
        let task_id = store.add_task(article_id, 5.0, None);
        let sub_task_id = store.add_sub_task_with_duration(task_id, 0.0, 1.0, false, 2.0);

        ScheduleService::new(store.clone())
            .set_sub_task_duration(sub_task_id, 8.0)
            .await
            .unwrap();

        assert_eq!(store.task(task_id).unwrap().duration_days, 8.0);
    }

    #[tokio::test]
    async fn test_shrink_duration_never_shrinks_parent() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 1000.0);
        let task_id = store.add_task(article_id, 10.0, None);
        let sub_task_id = store.add_sub_task_with_duration(task_id, 0.0, 1.0, false, 6.0);

        ScheduleService::new(store.clone())
            .set_sub_task_duration(sub_task_id, 1.0)
            .await
            .unwrap();

        assert_eq!(store.task(task_id).unwrap().duration_days, 10.0);
    }

    #[tokio::test]
    async fn test_unknown_parent_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let err = ScheduleService::new(store)
            .add_sub_task(new_sub_task(404, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_negative_duration_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 1000.0);
        let task_id = store.add_task(article_id, 5.0, None);
        let sub_task_id = store.add_sub_task(task_id, 0.0, 1.0, false);

        let err = ScheduleService::new(store)
            .set_sub_task_duration(sub_task_id, -2.0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_blank_code_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let article_id = store.add_article(1, 1000.0);
        let task_id = store.add_task(article_id, 5.0, None);

        let mut new = new_sub_task(task_id, 1.0);
        new.code = "  ".into();
        let err = ScheduleService::new(store)
            .add_sub_task(new)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
