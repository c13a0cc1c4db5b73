//! Event business logic - manager-only CRUD and visibility-filtered reads.

use crate::{
    core::{
        access::{Action, Actor, Resource, authorize, can},
        club::require_club,
        lifecycle::ensure_event_transition,
    },
    entities::{
        Event, EventColumn, EventParticipation, EventStatus, ParticipationColumn, event,
        event::accepted_methods,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

fn empty_methods() -> Json {
    Json::Object(serde_json::Map::new())
}

/// Fields accepted when creating an event.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    /// Event name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Target capacity, 0 when unspecified
    #[serde(default)]
    pub quota: i32,
    /// Initial status, `planning` when omitted
    #[serde(default)]
    pub status: Option<EventStatus>,
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Fee, 0 for free events
    #[serde(default)]
    pub fee: i64,
    /// Accepted payment methods
    #[serde(default = "empty_methods")]
    pub payment_methods: Json,
    /// Visible to non-members
    #[serde(default)]
    pub is_public: bool,
}

/// Editable event fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New quota
    #[serde(default)]
    pub quota: Option<i32>,
    /// New status, subject to the event lifecycle
    #[serde(default)]
    pub status: Option<EventStatus>,
    /// New start date
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// New end date
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// New fee
    #[serde(default)]
    pub fee: Option<i64>,
    /// New payment methods
    #[serde(default)]
    pub payment_methods: Option<Json>,
    /// New visibility
    #[serde(default)]
    pub is_public: Option<bool>,
}

fn validate_event(
    name: &str,
    quota: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    fee: i64,
    payment_methods: &Json,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Event name cannot be empty"));
    }
    if quota < 0 {
        return Err(Error::validation("quota cannot be negative"));
    }
    if fee < 0 {
        return Err(Error::validation("fee cannot be negative"));
    }
    if start_date > end_date {
        return Err(Error::validation("start_date must not be after end_date"));
    }
    if fee > 0 && accepted_methods(payment_methods).is_empty() {
        return Err(Error::validation(
            "An event with a fee must accept at least one payment method",
        ));
    }
    Ok(())
}

/// Finds an event by id or fails with `NotFound`.
pub async fn require_event<C>(db: &C, event_id: i64) -> Result<event::Model>
where
    C: ConnectionTrait,
{
    Event::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            resource: "event",
            id: event_id,
        })
}

/// Finds an event that belongs to `club_id`. An event of another club is
/// reported as missing.
pub async fn require_event_in_club<C>(db: &C, club_id: i64, event_id: i64) -> Result<event::Model>
where
    C: ConnectionTrait,
{
    let event = require_event(db, event_id).await?;
    if event.club_id != club_id {
        return Err(Error::NotFound {
            resource: "event",
            id: event_id,
        });
    }
    Ok(event)
}

/// Events of a club as `actor` may see them: every event for the club's
/// managers, public events only for everyone else.
pub async fn list_events<C>(db: &C, actor: &Actor, club_id: i64) -> Result<Vec<event::Model>>
where
    C: ConnectionTrait,
{
    require_club(db, club_id).await?;

    let mut query = Event::find().filter(EventColumn::ClubId.eq(club_id));
    if !can(actor, Action::ListAllEvents, Resource::Club { club_id }) {
        query = query.filter(EventColumn::IsPublic.eq(true));
    }

    query
        .order_by_asc(EventColumn::StartDate)
        .order_by_asc(EventColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Reads one event. Non-public events need a membership of any status.
pub async fn get_event(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    event_id: i64,
) -> Result<event::Model> {
    let event = require_event_in_club(db, club_id, event_id).await?;
    authorize(
        actor,
        Action::ReadEvent,
        Resource::Event {
            club_id,
            is_public: event.is_public,
        },
    )?;
    Ok(event)
}

/// Creates an event under a club. Club managers only.
pub async fn create_event(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    new_event: NewEvent,
) -> Result<event::Model> {
    require_club(db, club_id).await?;
    authorize(actor, Action::ManageEvents, Resource::Club { club_id })?;
    validate_event(
        &new_event.name,
        new_event.quota,
        new_event.start_date,
        new_event.end_date,
        new_event.fee,
        &new_event.payment_methods,
    )?;

    let created = event::ActiveModel {
        club_id: Set(club_id),
        name: Set(new_event.name.trim().to_string()),
        description: Set(new_event.description),
        quota: Set(new_event.quota),
        status: Set(new_event.status.unwrap_or(EventStatus::Planning)),
        start_date: Set(new_event.start_date),
        end_date: Set(new_event.end_date),
        fee: Set(new_event.fee),
        payment_methods: Set(new_event.payment_methods),
        is_public: Set(new_event.is_public),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(event_id = created.id, club_id, "event created");
    Ok(created)
}

/// Edits an event. Club managers only; status changes follow the event lifecycle.
pub async fn update_event(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    event_id: i64,
    update: EventUpdate,
) -> Result<event::Model> {
    let existing = require_event_in_club(db, club_id, event_id).await?;
    authorize(actor, Action::ManageEvents, Resource::Club { club_id })?;

    if let Some(status) = update.status {
        ensure_event_transition(existing.status, status)?;
    }

    let name = update.name.unwrap_or_else(|| existing.name.clone());
    let quota = update.quota.unwrap_or(existing.quota);
    let start_date = update.start_date.unwrap_or(existing.start_date);
    let end_date = update.end_date.unwrap_or(existing.end_date);
    let fee = update.fee.unwrap_or(existing.fee);
    let payment_methods = update
        .payment_methods
        .unwrap_or_else(|| existing.payment_methods.clone());
    validate_event(&name, quota, start_date, end_date, fee, &payment_methods)?;

    let from = existing.status;
    let mut model: event::ActiveModel = existing.into();
    model.name = Set(name.trim().to_string());
    model.quota = Set(quota);
    model.start_date = Set(start_date);
    model.end_date = Set(end_date);
    model.fee = Set(fee);
    model.payment_methods = Set(payment_methods);
    if let Some(description) = update.description {
        model.description = Set(description);
    }
    if let Some(is_public) = update.is_public {
        model.is_public = Set(is_public);
    }
    if let Some(status) = update.status {
        model.status = Set(status);
    }
    let updated = model.update(db).await?;

    if updated.status != from {
        info!(
            event_id,
            from = from.as_str(),
            to = updated.status.as_str(),
            "event status changed"
        );
    }
    Ok(updated)
}

/// Deletes an event and its participations. Club managers only.
pub async fn delete_event(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
    event_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;
    require_event_in_club(&txn, club_id, event_id).await?;
    authorize(actor, Action::ManageEvents, Resource::Club { club_id })?;

    EventParticipation::delete_many()
        .filter(ParticipationColumn::EventId.eq(event_id))
        .exec(&txn)
        .await?;
    Event::delete_by_id(event_id).exec(&txn).await?;
    txn.commit().await?;

    info!(event_id, club_id, "event deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::access::load_actor;
    use crate::test_utils::*;
    use serde_json::json;

    fn paid_event(name: &str) -> NewEvent {
        NewEvent {
            name: name.to_string(),
            description: "Annual trip".to_string(),
            quota: 30,
            status: None,
            start_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 3).unwrap(),
            fee: 1500,
            payment_methods: json!({"cash": {"enabled": true}}),
            is_public: false,
        }
    }

    #[tokio::test]
    async fn test_create_event_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let club = create_test_club(&db, &founder, "Hiking").await?;
        let actor = load_actor(&db, founder.id).await?;

        let mut bad = paid_event("Trip");
        bad.payment_methods = json!({"cash": {"enabled": false}});
        let result = create_event(&db, &actor, club.id, bad).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut bad = paid_event("Trip");
        bad.fee = -1;
        assert!(create_event(&db, &actor, club.id, bad).await.is_err());

        let mut bad = paid_event("Trip");
        bad.end_date = NaiveDate::from_ymd_opt(2026, 4, 30).unwrap();
        assert!(create_event(&db, &actor, club.id, bad).await.is_err());

        let event = create_event(&db, &actor, club.id, paid_event("Trip")).await?;
        assert_eq!(event.status, EventStatus::Planning);
        assert_eq!(event.accepted_payment_methods(), vec!["cash".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_only_managers_create_events() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let bob = create_test_user(&db, "bob").await?;
        let club = create_test_club(&db, &founder, "Hiking").await?;
        accept_test_member(&db, &founder, &bob, club.id).await?;

        let bob_actor = load_actor(&db, bob.id).await?;
        let result = create_event(&db, &bob_actor, club.id, paid_event("Trip")).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        let result = create_event(&db, &Actor::anonymous(), club.id, paid_event("Trip")).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_listing_visibility() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let bob = create_test_user(&db, "bob").await?;
        let club = create_test_club(&db, &founder, "Hiking").await?;
        create_test_event(&db, &founder, club.id, "Open day", true).await?;
        create_test_event(&db, &founder, club.id, "Members night", false).await?;

        let founder_actor = load_actor(&db, founder.id).await?;
        assert_eq!(list_events(&db, &founder_actor, club.id).await?.len(), 2);

        // Plain members and strangers only see the public listing.
        accept_test_member(&db, &founder, &bob, club.id).await?;
        let bob_actor = load_actor(&db, bob.id).await?;
        let events = list_events(&db, &bob_actor, club.id).await?;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Open day");

        let events = list_events(&db, &Actor::anonymous(), club.id).await?;
        assert_eq!(events.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_private_event_detail() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let bob = create_test_user(&db, "bob").await?;
        let stranger = create_test_user(&db, "stranger").await?;
        let club = create_test_club(&db, &founder, "Hiking").await?;
        let public = create_test_event(&db, &founder, club.id, "Open day", true).await?;
        let private = create_test_event(&db, &founder, club.id, "Members night", false).await?;

        let stranger_actor = load_actor(&db, stranger.id).await?;
        let result = get_event(&db, &stranger_actor, club.id, private.id).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        assert!(get_event(&db, &stranger_actor, club.id, public.id).await.is_ok());
        assert!(
            get_event(&db, &Actor::anonymous(), club.id, public.id)
                .await
                .is_ok()
        );

        // A pending membership is enough to read the detail.
        join_test_club(&db, &bob, club.id).await?;
        let bob_actor = load_actor(&db, bob.id).await?;
        assert!(get_event(&db, &bob_actor, club.id, private.id).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_event_scoped_to_club() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let hiking = create_test_club(&db, &founder, "Hiking").await?;
        let chess = create_test_club(&db, &founder, "Chess").await?;
        let event = create_test_event(&db, &founder, hiking.id, "Open day", true).await?;

        let actor = load_actor(&db, founder.id).await?;
        let result = get_event(&db, &actor, chess.id, event.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_event_status() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let club = create_test_club(&db, &founder, "Hiking").await?;
        let event = create_test_event(&db, &founder, club.id, "Open day", true).await?;
        let actor = load_actor(&db, founder.id).await?;

        let opened = update_event(
            &db,
            &actor,
            club.id,
            event.id,
            EventUpdate {
                status: Some(EventStatus::Open),
                quota: Some(0),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(opened.status, EventStatus::Open);

        let result = update_event(
            &db,
            &actor,
            club.id,
            event.id,
            EventUpdate {
                status: Some(EventStatus::Planning),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));

        // Charging a fee without any accepted method is refused.
        let result = update_event(
            &db,
            &actor,
            club.id,
            event.id,
            EventUpdate {
                fee: Some(500),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_event_removes_participations() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let bob = create_test_user(&db, "bob").await?;
        let club = create_test_club(&db, &founder, "Hiking").await?;
        let event = create_test_event(&db, &founder, club.id, "Open day", true).await?;
        join_test_event(&db, &bob, event.id).await?;

        let actor = load_actor(&db, founder.id).await?;
        delete_event(&db, &actor, club.id, event.id).await?;

        assert_eq!(Event::find().count(&db).await?, 0);
        assert_eq!(EventParticipation::find().count(&db).await?, 0);
        Ok(())
    }
}
