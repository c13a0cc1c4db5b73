//! Event participation - joining events and confirming payments.
//!
//! Joining is an upsert on the (user, event) unique index, like club joins.
//! Free events need no payment method and are stored as confirmed.

use crate::{
    core::{
        access::{Action, Actor, Resource, authorize},
        event::require_event,
        lifecycle::ensure_payment_transition,
    },
    entities::{
        EventParticipation, ParticipationColumn, PaymentStatus, User, event,
        event_participation,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use serde::Serialize;
use tracing::{debug, info};

/// A participation row together with the participant's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantView {
    /// The participation row
    #[serde(flatten)]
    pub participation: event_participation::Model,
    /// Username of the participant
    pub username: String,
    /// Payment status after applying the free-event rule
    pub effective_status: PaymentStatus,
}

/// Payment status as it should be read: participations in free events are
/// confirmed whatever is stored.
#[must_use]
pub fn effective_payment_status(
    event: &event::Model,
    participation: &event_participation::Model,
) -> PaymentStatus {
    if event.is_free() {
        PaymentStatus::Confirmed
    } else {
        participation.payment_status
    }
}

fn resolve_payment(
    event: &event::Model,
    payment_method: Option<String>,
) -> Result<(Option<String>, PaymentStatus)> {
    if event.is_free() {
        return Ok((None, PaymentStatus::Confirmed));
    }

    let method = payment_method
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| Error::validation("payment_method is required for events with a fee"))?;

    if !event.accepted_payment_methods().contains(&method) {
        return Err(Error::validation(format!(
            "Payment method '{method}' is not accepted for this event"
        )));
    }
    Ok((Some(method), PaymentStatus::Pending))
}

async fn find_participation<C>(
    db: &C,
    user_id: i64,
    event_id: i64,
) -> Result<Option<event_participation::Model>>
where
    C: ConnectionTrait,
{
    EventParticipation::find()
        .filter(ParticipationColumn::UserId.eq(user_id))
        .filter(ParticipationColumn::EventId.eq(event_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers the caller for an event.
///
/// Allowed for public events and for anyone holding a membership of any status
/// in the event's club. A repeated join returns the existing row unchanged.
pub async fn join_event(
    db: &DatabaseConnection,
    actor: &Actor,
    event_id: i64,
    payment_method: Option<String>,
) -> Result<event_participation::Model> {
    let event = require_event(db, event_id).await?;
    authorize(
        actor,
        Action::JoinEvent,
        Resource::Event {
            club_id: event.club_id,
            is_public: event.is_public,
        },
    )?;
    let user_id = actor.require_user()?;

    if let Some(existing) = find_participation(db, user_id, event_id).await? {
        debug!(user_id, event_id, "already registered for event");
        return Ok(existing);
    }

    let (payment_method, payment_status) = resolve_payment(&event, payment_method)?;
    let row = event_participation::ActiveModel {
        user_id: Set(user_id),
        event_id: Set(event_id),
        payment_method: Set(payment_method),
        payment_status: Set(payment_status),
        ..Default::default()
    };

    let inserted = EventParticipation::insert(row)
        .on_conflict(
            OnConflict::columns([ParticipationColumn::UserId, ParticipationColumn::EventId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted > 0 {
        info!(user_id, event_id, "joined event");
    }

    find_participation(db, user_id, event_id)
        .await?
        .ok_or(Error::NotFound {
            resource: "participation",
            id: event_id,
        })
}

/// Participants of an event with usernames. Managers of the event's club only.
pub async fn list_participants(
    db: &DatabaseConnection,
    actor: &Actor,
    event_id: i64,
) -> Result<Vec<ParticipantView>> {
    let event = require_event(db, event_id).await?;
    authorize(
        actor,
        Action::ManagePayments,
        Resource::Club {
            club_id: event.club_id,
        },
    )?;

    let rows = EventParticipation::find()
        .filter(ParticipationColumn::EventId.eq(event_id))
        .order_by_asc(ParticipationColumn::Id)
        .find_also_related(User)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(participation, user)| ParticipantView {
            effective_status: effective_payment_status(&event, &participation),
            participation,
            username: user.map(|u| u.username).unwrap_or_default(),
        })
        .collect())
}

/// Moves a participation's payment status. Managers of the event's club only,
/// and only `pending → confirmed`.
pub async fn update_payment_status(
    db: &DatabaseConnection,
    actor: &Actor,
    event_id: i64,
    participation_id: i64,
    target: PaymentStatus,
) -> Result<event_participation::Model> {
    let event = require_event(db, event_id).await?;
    authorize(
        actor,
        Action::ManagePayments,
        Resource::Club {
            club_id: event.club_id,
        },
    )?;

    let existing = EventParticipation::find_by_id(participation_id)
        .one(db)
        .await?
        .filter(|p| p.event_id == event_id)
        .ok_or(Error::NotFound {
            resource: "participation",
            id: participation_id,
        })?;
    ensure_payment_transition(existing.payment_status, target)?;

    let mut model: event_participation::ActiveModel = existing.into();
    model.payment_status = Set(target);
    let updated = model.update(db).await?;

    info!(
        participation_id,
        event_id,
        status = target.as_str(),
        "payment status changed"
    );
    Ok(updated)
}
