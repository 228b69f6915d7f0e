//! Pure aggregation math: sub-tasks to task, tasks to article
//!
//! One canonical sub-task aggregation rule is used everywhere: reserve items
//! are filtered out, then a weight-weighted average is taken, falling back to
//! a plain arithmetic mean when no positive weight remains. Every division
//! guards its denominator so a degenerate tree yields 0, never NaN.

use crate::snapshot::{ArticleRollup, ArticleSnapshot, TaskSnapshot};

/// Clamp a percentage into [0, 100]
pub fn clamp_percentage(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Completion percentage of one task.
///
/// A linked operational task's progress is authoritative and short-circuits
/// sub-task aggregation. Otherwise non-reserve sub-tasks are combined by
/// weight; with zero total weight the plain mean is used. A task with no
/// countable sub-tasks is 0% complete — its duration still weighs on the
/// article denominator, so unstarted work drags article progress down rather
/// than disappearing from it.
pub fn task_completion(task: &TaskSnapshot) -> f64 {
    if let Some(progress) = task.operational_progress {
        return clamp_percentage(progress);
    }

    let counted: Vec<_> = task.sub_tasks.iter().filter(|s| !s.is_reserve).collect();
    if counted.is_empty() {
        return 0.0;
    }

    let total_weight: f64 = counted.iter().map(|s| s.weight).sum();
    let value = if total_weight > 0.0 {
        counted
            .iter()
            .map(|s| s.completion_percentage * s.weight)
            .sum::<f64>()
            / total_weight
    } else {
        counted
            .iter()
            .map(|s| s.completion_percentage)
            .sum::<f64>()
            / counted.len() as f64
    };

    clamp_percentage(value)
}

/// Roll one article up: duration-weighted average of task completions, then
/// conversion to earned monetary value.
///
/// Duration, not contract value, is the weight at this level: longer tasks
/// dominate article progress regardless of price.
pub fn article_rollup(article: &ArticleSnapshot) -> ArticleRollup {
    let total_duration: f64 = article.tasks.iter().map(|t| t.duration_days).sum();

    let progress = if total_duration > 0.0 {
        clamp_percentage(
            article
                .tasks
                .iter()
                .map(|t| t.duration_days * task_completion(t))
                .sum::<f64>()
                / total_duration,
        )
    } else {
        0.0
    };

    ArticleRollup {
        progress,
        earned_value: article.total_amount * progress / 100.0,
    }
}
