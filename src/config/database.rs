//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Composite uniqueness constraints
//! (one membership per user and club, one participation per user and event) cannot be
//! expressed on the entities and are created here as explicit unique indexes; the join
//! upserts in `core` rely on them.

use crate::entities::{
    Club, Event, EventParticipation, FinanceRecord, Membership, MembershipColumn,
    ParticipationColumn, User,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/clubhouse.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory that must exist before `SQLite` can create the database file.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Establishes a connection to the database named by `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    tracing::debug!("Connecting to database at {}", database_url);
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and unique indexes, skipping those that already exist.
///
/// Parents are created before children so foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut user_table = schema.create_table_from_entity(User);
    let mut club_table = schema.create_table_from_entity(Club);
    let mut membership_table = schema.create_table_from_entity(Membership);
    let mut event_table = schema.create_table_from_entity(Event);
    let mut participation_table = schema.create_table_from_entity(EventParticipation);
    let mut finance_table = schema.create_table_from_entity(FinanceRecord);

    for table in [
        &mut user_table,
        &mut club_table,
        &mut membership_table,
        &mut event_table,
        &mut participation_table,
        &mut finance_table,
    ] {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    let membership_unique = Index::create()
        .name("idx_memberships_user_club")
        .table(Membership)
        .col(MembershipColumn::UserId)
        .col(MembershipColumn::ClubId)
        .unique()
        .if_not_exists()
        .to_owned();
    let participation_unique = Index::create()
        .name("idx_event_participations_user_event")
        .table(EventParticipation)
        .col(ParticipationColumn::UserId)
        .col(ParticipationColumn::EventId)
        .unique()
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&membership_unique)).await?;
    db.execute(builder.build(&participation_unique)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ClubModel, MembershipModel, ParticipationModel, UserModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<ClubModel> = Club::find().limit(1).all(&db).await?;
        let _: Vec<MembershipModel> = Membership::find().limit(1).all(&db).await?;
        let _: Vec<ParticipationModel> = EventParticipation::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir("sqlite://data/clubhouse.sqlite?mode=rwc"),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://clubhouse.sqlite"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
    }
}
