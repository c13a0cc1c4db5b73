//! Event entity - a club-run activity with optional fee.
//!
//! `payment_methods` is stored as a JSON object keyed by method name, e.g.
//! `{"cash": {"enabled": true, "remark": "at the door"}, "bankTransfer": {...}}`.
//! An entry counts as accepted unless it carries `"enabled": false`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Informational progression of an event, set explicitly by managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Not yet accepting registrations (initial state)
    #[sea_orm(string_value = "planning")]
    Planning,
    /// Accepting registrations
    #[sea_orm(string_value = "open")]
    Open,
    /// Registration closed
    #[sea_orm(string_value = "closed")]
    Closed,
    /// Event has taken place (terminal)
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Called off (terminal)
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl EventStatus {
    /// The wire/database string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning club
    #[sea_orm(indexed)]
    pub club_id: i64,
    /// Event name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Target capacity; 0 means unspecified. Informational only.
    pub quota: i32,
    /// Current status
    pub status: EventStatus,
    /// First day of the event
    pub start_date: Date,
    /// Last day of the event
    pub end_date: Date,
    /// Participation fee, never negative
    pub fee: i64,
    /// Accepted payment methods, see module docs
    pub payment_methods: Json,
    /// Whether non-members may see and join the event
    pub is_public: bool,
}

impl Model {
    /// Names of the payment methods this event accepts.
    #[must_use]
    pub fn accepted_payment_methods(&self) -> Vec<String> {
        accepted_methods(&self.payment_methods)
    }

    /// Whether participants owe nothing.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.fee == 0
    }
}

/// Extracts accepted method names from a `payment_methods` JSON value.
///
/// Objects yield their keys (minus entries with `"enabled": false`); arrays of
/// strings are accepted as a plain list. Anything else accepts nothing.
#[must_use]
pub fn accepted_methods(value: &Json) -> Vec<String> {
    match value {
        Json::Object(map) => map
            .iter()
            .filter(|(_, entry)| entry.get("enabled").and_then(Json::as_bool) != Some(false))
            .map(|(name, _)| name.clone())
            .collect(),
        Json::Array(items) => items
            .iter()
            .filter_map(Json::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Defines relationships between Event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event belongs to one club
    #[sea_orm(
        belongs_to = "super::club::Entity",
        from = "Column::ClubId",
        to = "super::club::Column::Id",
        on_delete = "Cascade"
    )]
    Club,
    /// One event has many participations
    #[sea_orm(has_many = "super::event_participation::Entity")]
    Participations,
}

impl Related<super::club::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Club.def()
    }
}

impl Related<super::event_participation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepted_methods_from_object() {
        let value = json!({
            "cash": {"enabled": true, "remark": "at the door"},
            "bankTransfer": {"enabled": false, "bank": "X"},
            "linePay": {}
        });
        let mut methods = accepted_methods(&value);
        methods.sort();
        assert_eq!(methods, vec!["cash".to_string(), "linePay".to_string()]);
    }

    #[test]
    fn test_accepted_methods_from_list_and_other() {
        assert_eq!(
            accepted_methods(&json!(["cash", 3, "bankTransfer"])),
            vec!["cash".to_string(), "bankTransfer".to_string()]
        );
        assert!(accepted_methods(&json!(null)).is_empty());
        assert!(accepted_methods(&json!({})).is_empty());
    }
}
