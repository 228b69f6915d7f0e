//! # ch-db
//!
//! Database layer for Chantier RS.
//!
//! This crate provides PostgreSQL database access using SQLx, including:
//!
//! - Connection pool management
//! - One repository per aggregate of the market structure
//! - Row structs mapping to the `ch-models` entities
//!
//! ## Example
//!
//! ```ignore
//! use ch_db::{Database, DatabaseConfig};
//! use ch_db::articles::MarketArticleRepository;
//!
//! let config = DatabaseConfig::with_url("postgres://localhost/chantier");
//! let db = Database::connect(&config).await?;
//!
//! let repo = MarketArticleRepository::new(db.pool().clone());
//! let article = repo.find_by_id(1).await?;
//! ```

pub mod article_tasks;
pub mod articles;
pub mod block_progress;
pub mod invoices;
pub mod lots;
pub mod operational_tasks;
pub mod pool;
pub mod projects;
pub mod repository;
pub mod sub_tasks;

// Re-exports
pub use article_tasks::{ArticleTaskRepository, ArticleTaskRow};
pub use articles::{MarketArticleRepository, MarketArticleRow};
pub use block_progress::{BlockProgressRepository, BlockProgressRow, SubTaskPercentageWrite};
pub use invoices::{InvoiceRepository, InvoiceRow};
pub use lots::{LotRepository, LotRow};
pub use operational_tasks::{OperationalTaskRepository, OperationalTaskRow};
pub use pool::{Database, DatabaseConfig};
pub use projects::{ProjectRepository, ProjectRow};
pub use repository::{RepositoryError, RepositoryResult};
pub use sub_tasks::{CreateSubTaskDto, SubTaskRepository, SubTaskRow};
