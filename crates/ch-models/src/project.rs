//! Project model
//!
//! Table: projects

use chrono::{DateTime, NaiveDate, Utc};
use ch_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Project entity
///
/// A construction project. The schedule bounds and estimated cost feed the
/// planned-trend and time-elapsed production baseline calculations.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Option<Id>,

    /// Display name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Short project code (e.g. site reference)
    pub code: Option<String>,

    /// Estimated total cost at signature
    pub estimated_cost: Option<f64>,

    /// Contractual start of works
    pub start_date: Option<NaiveDate>,

    /// Contractual end of works
    pub end_date: Option<NaiveDate>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether both schedule bounds are known
    pub fn has_schedule(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }
}

impl Identifiable for Project {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Project {
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
    fn test_project_schedule() {
        let mut project = Project::new("Residence Les Oliviers");
        assert!(!project.has_schedule());

        project.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        project.end_date = NaiveDate::from_ymd_opt(2024, 12, 31);
        assert!(project.has_schedule());
    }
}
