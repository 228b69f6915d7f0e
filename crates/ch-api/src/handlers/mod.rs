//! Request handlers, grouped by resource

pub mod articles;
pub mod block_progress;
pub mod operational_tasks;
pub mod projects;
