//! Membership business logic - joining, manager decisions, promotion and leaving.
//!
//! Joining is an idempotent upsert against the (user, club) unique index:
//! concurrent identical requests cannot create two rows, and an existing row is
//! returned untouched whatever its status. Every path that could remove a
//! manager refuses to leave a club without one.

use crate::{
    core::{
        access::{Action, Actor, Resource, authorize},
        club::require_club,
        lifecycle::ensure_membership_transition,
        stats::manager_count,
    },
    entities::{Membership, MembershipColumn, MembershipStatus, User, membership, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A membership row together with the member's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    /// The membership row
    #[serde(flatten)]
    pub membership: membership::Model,
    /// Username of the member
    pub username: String,
}

/// Changes a manager (or the member) can request on one membership row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipUpdate {
    /// New status
    #[serde(default)]
    pub status: Option<MembershipStatus>,
    /// Promote or demote
    #[serde(default)]
    pub is_manager: Option<bool>,
    /// New position label
    #[serde(default)]
    pub position: Option<String>,
}

/// Finds a membership by id or fails with `NotFound`.
pub async fn require_membership<C>(db: &C, membership_id: i64) -> Result<membership::Model>
where
    C: ConnectionTrait,
{
    Membership::find_by_id(membership_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            resource: "membership",
            id: membership_id,
        })
}

/// The membership of `user_id` in `club_id`, if any.
pub async fn find_membership<C>(
    db: &C,
    user_id: i64,
    club_id: i64,
) -> Result<Option<membership::Model>>
where
    C: ConnectionTrait,
{
    Membership::find()
        .filter(MembershipColumn::UserId.eq(user_id))
        .filter(MembershipColumn::ClubId.eq(club_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Requests to join a club. Returns the existing row unchanged if there is one.
pub async fn join_club(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
) -> Result<membership::Model> {
    authorize(actor, Action::JoinClub, Resource::Club { club_id })?;
    let user_id = actor.require_user()?;
    require_club(db, club_id).await?;

    let row = membership::ActiveModel {
        user_id: Set(user_id),
        club_id: Set(club_id),
        status: Set(MembershipStatus::Pending),
        is_manager: Set(false),
        position: Set(None),
        ..Default::default()
    };

    let inserted = Membership::insert(row)
        .on_conflict(
            OnConflict::columns([MembershipColumn::UserId, MembershipColumn::ClubId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted > 0 {
        info!(user_id, club_id, "join request created");
    } else {
        debug!(user_id, club_id, "join request already exists");
    }

    find_membership(db, user_id, club_id)
        .await?
        .ok_or(Error::NotFound {
            resource: "membership",
            id: club_id,
        })
}

fn with_usernames(rows: Vec<(membership::Model, Option<user::Model>)>) -> Vec<MemberView> {
    rows.into_iter()
        .map(|(membership, user)| MemberView {
            membership,
            username: user.map(|u| u.username).unwrap_or_default(),
        })
        .collect()
}

/// Accepted members of a club. Public.
pub async fn list_members<C>(db: &C, club_id: i64) -> Result<Vec<MemberView>>
where
    C: ConnectionTrait,
{
    let rows = Membership::find()
        .filter(MembershipColumn::ClubId.eq(club_id))
        .filter(MembershipColumn::Status.eq(MembershipStatus::Accepted))
        .order_by_asc(MembershipColumn::Id)
        .find_also_related(User)
        .all(db)
        .await?;
    Ok(with_usernames(rows))
}

/// Every membership row of a club, any status. Club managers only.
pub async fn list_memberships(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
) -> Result<Vec<MemberView>> {
    require_club(db, club_id).await?;
    authorize(actor, Action::ManageMemberships, Resource::Club { club_id })?;

    let rows = Membership::find()
        .filter(MembershipColumn::ClubId.eq(club_id))
        .order_by_asc(MembershipColumn::Id)
        .find_also_related(User)
        .all(db)
        .await?;
    Ok(with_usernames(rows))
}

/// Accepts or rejects a pending join request.
pub async fn decide_membership(
    db: &DatabaseConnection,
    actor: &Actor,
    membership_id: i64,
    decision: MembershipStatus,
) -> Result<membership::Model> {
    let txn = db.begin().await?;
    let existing = require_membership(&txn, membership_id).await?;
    let updated = apply_decision(&txn, actor, existing, decision).await?;
    txn.commit().await?;
    Ok(updated)
}

async fn apply_decision<C>(
    db: &C,
    actor: &Actor,
    existing: membership::Model,
    decision: MembershipStatus,
) -> Result<membership::Model>
where
    C: ConnectionTrait,
{
    let membership_id = existing.id;
    let club_id = existing.club_id;
    authorize(actor, Action::ManageMemberships, Resource::Club { club_id })?;

    if !matches!(
        decision,
        MembershipStatus::Accepted | MembershipStatus::Rejected
    ) {
        return Err(Error::validation(
            "A manager decision must be 'accepted' or 'rejected'",
        ));
    }
    ensure_membership_transition(existing.status, decision)?;

    let mut model: membership::ActiveModel = existing.into();
    model.status = Set(decision);
    let updated = model.update(db).await?;

    info!(
        membership_id,
        club_id,
        status = decision.as_str(),
        "membership decided"
    );
    Ok(updated)
}

/// Promotes or demotes an accepted member, optionally relabelling their position.
///
/// Demoting the club's only manager is refused with `Conflict`.
pub async fn set_manager(
    db: &DatabaseConnection,
    actor: &Actor,
    membership_id: i64,
    is_manager: bool,
    position: Option<String>,
) -> Result<membership::Model> {
    let txn = db.begin().await?;
    let existing = require_membership(&txn, membership_id).await?;
    let updated = apply_manager_flag(&txn, actor, existing, is_manager, position).await?;
    txn.commit().await?;
    Ok(updated)
}

async fn apply_manager_flag<C>(
    db: &C,
    actor: &Actor,
    existing: membership::Model,
    is_manager: bool,
    position: Option<String>,
) -> Result<membership::Model>
where
    C: ConnectionTrait,
{
    let membership_id = existing.id;
    let club_id = existing.club_id;
    authorize(actor, Action::ManageMemberships, Resource::Club { club_id })?;

    if existing.status != MembershipStatus::Accepted {
        return Err(Error::validation(
            "Only accepted members can be promoted or demoted",
        ));
    }
    if existing.is_manager && !is_manager && manager_count(db, club_id).await? <= 1 {
        return Err(Error::conflict("A club must keep at least one manager"));
    }

    let mut model: membership::ActiveModel = existing.into();
    model.is_manager = Set(is_manager);
    if position.is_some() {
        model.position = Set(position);
    }
    let updated = model.update(db).await?;

    info!(membership_id, club_id, is_manager, "manager flag changed");
    Ok(updated)
}

/// Leaves a club: the caller's accepted membership becomes `left`.
///
/// The last manager cannot leave.
pub async fn leave_club(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
) -> Result<membership::Model> {
    let user_id = actor.require_user()?;
    let txn = db.begin().await?;
    require_club(&txn, club_id).await?;

    let existing = find_membership(&txn, user_id, club_id)
        .await?
        .ok_or(Error::NotFound {
            resource: "membership",
            id: club_id,
        })?;
    let updated = apply_leave(&txn, actor, existing).await?;
    txn.commit().await?;
    Ok(updated)
}

async fn apply_leave<C>(
    db: &C,
    actor: &Actor,
    existing: membership::Model,
) -> Result<membership::Model>
where
    C: ConnectionTrait,
{
    let user_id = existing.user_id;
    let club_id = existing.club_id;
    if actor.user_id() != Some(user_id) {
        return Err(Error::forbidden("Only the member can leave a club"));
    }
    ensure_membership_transition(existing.status, MembershipStatus::Left)?;
    authorize(actor, Action::LeaveClub, Resource::Club { club_id })?;

    if existing.grants_manager() && manager_count(db, club_id).await? <= 1 {
        return Err(Error::conflict(
            "The last manager cannot leave the club; promote someone first",
        ));
    }

    let mut model: membership::ActiveModel = existing.into();
    model.status = Set(MembershipStatus::Left);
    model.is_manager = Set(false);
    let updated = model.update(db).await?;

    info!(user_id, club_id, "member left club");
    Ok(updated)
}

/// Applies a PATCH to a membership row: a status decision, a self-initiated
/// leave, and/or a manager flag change.
///
/// All parts commit together or not at all.
pub async fn update_membership(
    db: &DatabaseConnection,
    actor: &Actor,
    membership_id: i64,
    update: MembershipUpdate,
) -> Result<membership::Model> {
    let txn = db.begin().await?;
    let mut current = require_membership(&txn, membership_id).await?;

    let changes_role = update.is_manager.is_some() || update.position.is_some();
    if changes_role {
        authorize(
            actor,
            Action::ManageMemberships,
            Resource::Club {
                club_id: current.club_id,
            },
        )?;
    }
    let resulting_status = update.status.unwrap_or(current.status);
    if changes_role && resulting_status != MembershipStatus::Accepted {
        return Err(Error::validation(
            "Only accepted members can be promoted or demoted",
        ));
    }

    match update.status {
        Some(MembershipStatus::Left) => {
            current = apply_leave(&txn, actor, current).await?;
        }
        Some(status) if status != current.status => {
            current = apply_decision(&txn, actor, current, status).await?;
        }
        _ => {}
    }

    if changes_role {
        let is_manager = update.is_manager.unwrap_or(current.is_manager);
        current = apply_manager_flag(&txn, actor, current, is_manager, update.position).await?;
    }

    txn.commit().await?;
    Ok(current)
}
