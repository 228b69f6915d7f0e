//! # ch-progress
//!
//! Progress aggregation and earned-value engine for Chantier RS.
//!
//! This crate rolls completion percentages up from sub-tasks through tasks,
//! market articles, lots, and the whole project, converting physical progress
//! into monetary production value:
//!
//! - [`rollup`] — the pure weighted-aggregation math (task and article level)
//! - [`store`] — the repository-style interface the engine reads and writes
//!   through, with a PostgreSQL implementation over `ch-db`
//! - [`block_update`] — batch sub-task edits for one block/floor context
//! - [`scheduling`] — sub-task schedule writes with parent-duration
//!   auto-extension
//! - [`recalculate`] — article-wide recalculation triggered by operational
//!   task updates
//! - [`dispatcher`] — the fire-and-forget queue the recalculation runs behind
//! - [`stats`] — whole-project rollup, planned trend, and the billing feed

pub mod block_update;
pub mod dispatcher;
pub mod error;
pub mod recalculate;
pub mod rollup;
pub mod scheduling;
pub mod snapshot;
pub mod stats;
pub mod store;

#[cfg(any(test, feature = "test-util"))]
pub mod test_support;

pub use block_update::{BlockProgressService, BlockProgressUpdate, BlockSubTaskUpdate};
pub use dispatcher::{RecalcDispatcher, RecalcEvent};
pub use error::{EngineError, EngineResult};
pub use recalculate::{RecalcOutcome, RecalculationService};
pub use rollup::{article_rollup, task_completion};
pub use scheduling::{NewSubTask, ScheduleService};
pub use snapshot::{ArticleRollup, ArticleSnapshot, SubTaskSnapshot, TaskSnapshot};
pub use stats::ProjectStatsService;
pub use store::{PgProgressStore, ProgressStore};
