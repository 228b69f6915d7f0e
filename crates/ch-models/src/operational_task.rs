//! Operational task model
//!
//! Table: operational_tasks

use chrono::{DateTime, Utc};
use ch_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};

/// Operational task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OperationalTaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    Cancelled,
}

impl OperationalTaskStatus {
    /// Terminal states force progress to 100 or freeze it
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Operational task entity
///
/// A separately tracked work assignment (subcontractor/engineer workflow).
/// Its own 0-100 progress overrides sub-task-derived completion on the
/// article task it is linked to.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OperationalTask {
    pub id: Option<Id>,
    pub designation: String,
    pub progress: i32,
    pub status: OperationalTaskStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for OperationalTask {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for OperationalTask {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            OperationalTaskStatus::Pending,
            OperationalTaskStatus::InProgress,
            OperationalTaskStatus::Done,
            OperationalTaskStatus::Cancelled,
        ] {
            assert_eq!(OperationalTaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OperationalTaskStatus::parse("unknown"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OperationalTaskStatus::Done.is_terminal());
        assert!(OperationalTaskStatus::Cancelled.is_terminal());
        assert!(!OperationalTaskStatus::InProgress.is_terminal());
    }
}
