//! Market and Lot models
//!
//! Tables: markets, lots

use chrono::{DateTime, Utc};
use ch_core::traits::{Id, Identifiable, ProjectScoped, Timestamped};
use serde::{Deserialize, Serialize};

/// Market entity
///
/// A market contract groups the lots of one project.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: Option<Id>,
    pub project_id: Id,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Market {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl ProjectScoped for Market {
    fn project_id(&self) -> Option<Id> {
        Some(self.project_id)
    }
}

impl Timestamped for Market {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// Lot entity
///
/// Groups the articles of one trade (masonry, electrical, ...) within a
/// market. Displayed in explicit `position` order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: Option<Id>,
    pub market_id: Id,
    pub name: String,
    pub position: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Lot {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_scoping() {
        let market = Market {
            project_id: 3,
            name: "Marché principal".into(),
            ..Default::default()
        };
        assert_eq!(ProjectScoped::project_id(&market), Some(3));
        assert!(market.is_new_record());
    }

    #[test]
    fn test_lot_serializes_camel_case() {
        let lot = Lot {
            id: Some(1),
            market_id: 2,
            name: "Gros oeuvre".into(),
            position: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&lot).unwrap();
        assert_eq!(json["marketId"], 2);
        assert_eq!(json["name"], "Gros oeuvre");
    }
}
