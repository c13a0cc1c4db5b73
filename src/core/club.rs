//! Club business logic - creation, editing, admin status decisions and removal.
//!
//! Creating a club and granting its founder the president membership happen in
//! one database transaction, so a club without a manager is never visible.

use crate::{
    core::{
        access::{Action, Actor, Resource, authorize},
        lifecycle::{ClubAction, ensure_club_transition},
    },
    entities::{
        Club, ClubColumn, ClubStatus, Event, EventColumn, EventParticipation, FinanceRecord,
        FinanceRecordColumn, Membership, MembershipColumn, MembershipStatus, ParticipationColumn,
        club, membership::{self, PRESIDENT_POSITION},
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Fields accepted when founding a club.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClub {
    /// Club name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Declared capacity
    pub max_member: i32,
    /// Optional image reference
    #[serde(default)]
    pub image: Option<String>,
}

/// Editable club fields. Status and foundation date are not among them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClubUpdate {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New capacity
    #[serde(default)]
    pub max_member: Option<i32>,
    /// New image reference
    #[serde(default)]
    pub image: Option<String>,
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Club name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_max_member(max_member: i32) -> Result<i32> {
    if max_member < 0 {
        return Err(Error::validation("max_member cannot be negative"));
    }
    Ok(max_member)
}

/// Finds a club by id.
pub async fn get_club_by_id<C>(db: &C, club_id: i64) -> Result<Option<club::Model>>
where
    C: ConnectionTrait,
{
    Club::find_by_id(club_id).one(db).await.map_err(Into::into)
}

/// Finds a club by id or fails with `NotFound`.
pub async fn require_club<C>(db: &C, club_id: i64) -> Result<club::Model>
where
    C: ConnectionTrait,
{
    get_club_by_id(db, club_id).await?.ok_or(Error::NotFound {
        resource: "club",
        id: club_id,
    })
}

/// All clubs, oldest first. Public.
pub async fn list_clubs(db: &DatabaseConnection) -> Result<Vec<club::Model>> {
    Club::find()
        .order_by_asc(ClubColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Founds a club in `pending` status and makes the caller its president.
pub async fn create_club(
    db: &DatabaseConnection,
    actor: &Actor,
    new_club: NewClub,
) -> Result<club::Model> {
    authorize(actor, Action::CreateClub, Resource::System)?;
    let founder_id = actor.require_user()?;
    let name = validate_name(&new_club.name)?;
    let max_member = validate_max_member(new_club.max_member)?;

    let txn = db.begin().await?;

    let created = club::ActiveModel {
        name: Set(name),
        description: Set(new_club.description),
        status: Set(ClubStatus::Pending),
        max_member: Set(max_member),
        foundation_date: Set(chrono::Utc::now().date_naive()),
        image: Set(new_club.image),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    membership::ActiveModel {
        user_id: Set(founder_id),
        club_id: Set(created.id),
        status: Set(MembershipStatus::Accepted),
        is_manager: Set(true),
        position: Set(Some(PRESIDENT_POSITION.to_string())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(club_id = created.id, founder_id, "club created");
    Ok(created)
}

/// Edits a club. Allowed for its managers and for global admins.
pub async fn update_club(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    update: ClubUpdate,
) -> Result<club::Model> {
    let existing = require_club(db, club_id).await?;
    authorize(actor, Action::UpdateClub, Resource::Club { club_id })?;

    let mut model: club::ActiveModel = existing.into();
    if let Some(name) = update.name {
        model.name = Set(validate_name(&name)?);
    }
    if let Some(description) = update.description {
        model.description = Set(description);
    }
    if let Some(max_member) = update.max_member {
        model.max_member = Set(validate_max_member(max_member)?);
    }
    if let Some(image) = update.image {
        model.image = Set(Some(image));
    }

    model.update(db).await.map_err(Into::into)
}

/// Moves a club to `target`. Global admins only; the lifecycle table decides
/// which moves are legal.
pub async fn transition_club_status(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    target: ClubStatus,
) -> Result<club::Model> {
    authorize(actor, Action::TransitionClubStatus, Resource::Club { club_id })?;

    let txn = db.begin().await?;
    let existing = require_club(&txn, club_id).await?;
    let from = existing.status;
    ensure_club_transition(from, target)?;

    let mut model: club::ActiveModel = existing.into();
    model.status = Set(target);
    let updated = model.update(&txn).await?;
    txn.commit().await?;

    info!(
        club_id,
        from = from.as_str(),
        to = target.as_str(),
        "club status changed"
    );
    Ok(updated)
}

/// Applies an admin review decision.
pub async fn apply_club_action(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    action: ClubAction,
) -> Result<club::Model> {
    transition_club_status(db, actor, club_id, action.target_status()).await
}

/// Removes a club with its memberships, events, participations and finance
/// records. Global admins only.
pub async fn delete_club(db: &DatabaseConnection, actor: &Actor, club_id: i64) -> Result<()> {
    authorize(actor, Action::DeleteClub, Resource::Club { club_id })?;

    let txn = db.begin().await?;
    require_club(&txn, club_id).await?;

    let event_ids: Vec<i64> = Event::find()
        .select_only()
        .column(EventColumn::Id)
        .filter(EventColumn::ClubId.eq(club_id))
        .into_tuple()
        .all(&txn)
        .await?;

    if !event_ids.is_empty() {
        EventParticipation::delete_many()
            .filter(ParticipationColumn::EventId.is_in(event_ids))
            .exec(&txn)
            .await?;
    }
    Event::delete_many()
        .filter(EventColumn::ClubId.eq(club_id))
        .exec(&txn)
        .await?;
    Membership::delete_many()
        .filter(MembershipColumn::ClubId.eq(club_id))
        .exec(&txn)
        .await?;
    FinanceRecord::delete_many()
        .filter(FinanceRecordColumn::ClubId.eq(club_id))
        .exec(&txn)
        .await?;
    Club::delete_by_id(club_id).exec(&txn).await?;

    txn.commit().await?;
    info!(club_id, "club deleted");
    Ok(())
}

/// Clubs the caller belongs to in any status; every club for global admins.
pub async fn my_clubs(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<club::Model>> {
    authorize(actor, Action::ViewOwnClubs, Resource::System)?;
    if actor.is_admin() {
        return list_clubs(db).await;
    }

    Club::find()
        .filter(ClubColumn::Id.is_in(actor.affiliated_club_ids()))
        .order_by_asc(ClubColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
