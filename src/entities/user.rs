//! User entity - an account that can create and join clubs.
//!
//! `is_admin` is the global privilege axis; per-club privileges live on
//! [`super::membership`] rows and are never stored here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across the system
    #[sea_orm(unique)]
    pub username: String,
    /// Contact e-mail address
    pub email: String,
    /// bcrypt hash of the password, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Optional display name
    pub name: Option<String>,
    /// Optional free-form contact (phone, chat handle)
    pub contact: Option<String>,
    /// Global administrator flag
    pub is_admin: bool,
    /// When the account was registered
    pub date_joined: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user holds many memberships
    #[sea_orm(has_many = "super::membership::Entity")]
    Memberships,
    /// One user has many event participations
    #[sea_orm(has_many = "super::event_participation::Entity")]
    Participations,
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::event_participation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
