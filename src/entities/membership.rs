//! Membership entity - links one user to one club.
//!
//! A (user, club) pair has at most one row; the unique index is created in
//! `config::database::create_tables`. Rows are never hard-deleted by the
//! membership flow, history is kept through `status`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a user's relationship with a club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    /// Join request awaiting a manager decision
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Full member
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Request turned down
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Former member who left on their own
    #[sea_orm(string_value = "left")]
    Left,
}

impl MembershipStatus {
    /// The wire/database string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Left => "left",
        }
    }
}

/// Title given to the founder of a club.
pub const PRESIDENT_POSITION: &str = "社長";

/// Membership database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "memberships")]
pub struct Model {
    /// Unique identifier for the membership
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Member user
    #[sea_orm(indexed)]
    pub user_id: i64,
    /// Club the membership belongs to
    #[sea_orm(indexed)]
    pub club_id: i64,
    /// Current status
    pub status: MembershipStatus,
    /// Manager role flag, meaningful only while accepted
    pub is_manager: bool,
    /// Optional position label such as "社長" or "treasurer"
    pub position: Option<String>,
}

impl Model {
    /// True when this row grants manager privileges over its club.
    #[must_use]
    pub fn grants_manager(&self) -> bool {
        self.is_manager && self.status == MembershipStatus::Accepted
    }
}

/// Defines relationships between Membership and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each membership belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each membership belongs to one club
    #[sea_orm(
        belongs_to = "super::club::Entity",
        from = "Column::ClubId",
        to = "super::club::Column::Id",
        on_delete = "Cascade"
    )]
    Club,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::club::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Club.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
