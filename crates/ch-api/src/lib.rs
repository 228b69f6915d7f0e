//! # ch-api
//!
//! REST API handlers for Chantier RS.
//!
//! Thin axum handlers over the `ch-progress` engine: request DTOs are
//! validated here, engine errors are mapped to HTTP statuses, and
//! recalculation is queued after the write path responds.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::AppState;
pub use routes::router;
