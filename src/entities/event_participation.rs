//! Event participation entity - a user's registration for an event.
//!
//! Unique per (user, event); the index is created alongside the table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment state of a participation. Moves one way only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Payment declared but not yet checked by a manager
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Payment checked (or nothing was owed)
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
}

impl PaymentStatus {
    /// The wire/database string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }
}

/// Event participation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_participations")]
pub struct Model {
    /// Unique identifier for the participation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Participating user
    #[sea_orm(indexed)]
    pub user_id: i64,
    /// Event joined
    #[sea_orm(indexed)]
    pub event_id: i64,
    /// One of the event's accepted methods; None for free events
    pub payment_method: Option<String>,
    /// Payment state
    pub payment_status: PaymentStatus,
}

/// Defines relationships between `EventParticipation` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each participation belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each participation belongs to one event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
