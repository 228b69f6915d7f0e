//! # ch-models
//!
//! Domain models for Chantier RS.
//!
//! This crate contains the entity structs for the market-contract structure
//! (projects, markets, lots, articles, tasks, sub-tasks), block/floor progress
//! records, operational tasks, invoices, and the reporting types produced by
//! the progress engine.

pub use ch_core::traits::{Id, Identifiable, ProjectScoped, Timestamped};

pub mod article;
pub mod block_progress;
pub mod invoice;
pub mod market;
pub mod operational_task;
pub mod project;
pub mod stats;

// Re-exports for convenience
pub use article::{ArticleTask, MarketArticle, SubTask};
pub use block_progress::BlockArticleProgress;
pub use invoice::{Invoice, InvoiceStatus};
pub use market::{Lot, Market};
pub use operational_task::{OperationalTask, OperationalTaskStatus};
pub use project::Project;
pub use stats::{ProjectStats, SeriesPoint};
