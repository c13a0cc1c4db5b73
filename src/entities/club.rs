//! Club entity - an organizational unit with members, events and finances.
//!
//! `member_count` is deliberately absent: it is derived from accepted
//! memberships on every read (see `core::stats`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a club. Only a global admin changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ClubStatus {
    /// Awaiting admin review (initial state)
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Operating normally
    #[sea_orm(string_value = "active")]
    Active,
    /// Turned down by an admin (terminal)
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Temporarily halted
    #[sea_orm(string_value = "suspended")]
    Suspended,
    /// Permanently closed (terminal)
    #[sea_orm(string_value = "disbanded")]
    Disbanded,
}

impl ClubStatus {
    /// The wire/database string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
            Self::Disbanded => "disbanded",
        }
    }
}

/// Club database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clubs")]
pub struct Model {
    /// Unique identifier for the club
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Club name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Current lifecycle status
    pub status: ClubStatus,
    /// Declared capacity; informational, not enforced on join
    pub max_member: i32,
    /// Set once at creation and never updated
    pub foundation_date: Date,
    /// Optional image reference (path or URL managed elsewhere)
    pub image: Option<String>,
}

/// Defines relationships between Club and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One club has many memberships
    #[sea_orm(has_many = "super::membership::Entity")]
    Memberships,
    /// One club runs many events
    #[sea_orm(has_many = "super::event::Entity")]
    Events,
    /// One club keeps many finance records
    #[sea_orm(has_many = "super::finance_record::Entity")]
    FinanceRecords,
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::finance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinanceRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
