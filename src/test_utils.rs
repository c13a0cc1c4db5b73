//! Shared test utilities for `clubhouse`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults. Every helper goes through
//! the same core functions the HTTP layer uses, so fixtures obey the same rules.

use crate::{
    core::{
        access::load_actor,
        club::{self, NewClub},
        event::{self, NewEvent},
        finance::{self, NewFinanceRecord},
        membership, participation,
        user::{self, NewUser},
    },
    entities::{self, MembershipStatus, UserColumn},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Password used for every fixture account.
pub const TEST_PASSWORD: &str = "password123";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers an ordinary user named `username` with [`TEST_PASSWORD`].
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    user::register(
        db,
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
            name: None,
            contact: None,
        },
    )
    .await
}

/// Creates an admin account named `username` with [`TEST_PASSWORD`].
pub async fn create_test_admin(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    user::ensure_admin(db, username, &format!("{username}@example.com"), TEST_PASSWORD).await?;
    entities::User::find()
        .filter(UserColumn::Username.eq(username))
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            resource: "user",
            id: 0,
        })
}

/// Founds a club as `founder`.
///
/// # Defaults
/// * `description`: empty
/// * `max_member`: 10
/// * `image`: None
pub async fn create_test_club(
    db: &DatabaseConnection,
    founder: &entities::user::Model,
    name: &str,
) -> Result<entities::club::Model> {
    let actor = load_actor(db, founder.id).await?;
    club::create_club(
        db,
        &actor,
        NewClub {
            name: name.to_string(),
            description: String::new(),
            max_member: 10,
            image: None,
        },
    )
    .await
}

/// Sends a join request from `member` to the club.
pub async fn join_test_club(
    db: &DatabaseConnection,
    member: &entities::user::Model,
    club_id: i64,
) -> Result<entities::membership::Model> {
    let actor = load_actor(db, member.id).await?;
    membership::join_club(db, &actor, club_id).await
}

/// Joins `member` to the club and has `manager` accept the request.
pub async fn accept_test_member(
    db: &DatabaseConnection,
    manager: &entities::user::Model,
    member: &entities::user::Model,
    club_id: i64,
) -> Result<entities::membership::Model> {
    let request = join_test_club(db, member, club_id).await?;
    let actor = load_actor(db, manager.id).await?;
    membership::decide_membership(db, &actor, request.id, MembershipStatus::Accepted).await
}

/// Creates a free one-day event as `manager`.
///
/// # Defaults
/// * `quota`: 0
/// * `fee`: 0 (no payment methods)
/// * dates: 2026-06-01
pub async fn create_test_event(
    db: &DatabaseConnection,
    manager: &entities::user::Model,
    club_id: i64,
    name: &str,
    is_public: bool,
) -> Result<entities::event::Model> {
    let actor = load_actor(db, manager.id).await?;
    let day = NaiveDate::from_ymd_opt(2026, 6, 1).ok_or_else(|| Error::validation("bad date"))?;
    event::create_event(
        db,
        &actor,
        club_id,
        NewEvent {
            name: name.to_string(),
            description: String::new(),
            quota: 0,
            status: None,
            start_date: day,
            end_date: day,
            fee: 0,
            payment_methods: serde_json::json!({}),
            is_public,
        },
    )
    .await
}

/// Registers `participant` for a free event without a payment method.
pub async fn join_test_event(
    db: &DatabaseConnection,
    participant: &entities::user::Model,
    event_id: i64,
) -> Result<entities::event_participation::Model> {
    let actor = load_actor(db, participant.id).await?;
    participation::join_event(db, &actor, event_id, None).await
}

/// Books a ledger entry dated today as `manager`.
pub async fn create_test_finance_record(
    db: &DatabaseConnection,
    manager: &entities::user::Model,
    club_id: i64,
    amount: Decimal,
) -> Result<entities::finance_record::Model> {
    let actor = load_actor(db, manager.id).await?;
    finance::record_finance(
        db,
        &actor,
        club_id,
        NewFinanceRecord {
            amount,
            description: format!("entry of {amount}"),
            date: None,
        },
    )
    .await
}
