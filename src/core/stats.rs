//! Aggregation views - derived, read-only numbers computed from live rows.
//!
//! Nothing here is stored. Each count or total is recomputed on every call so
//! it can never drift from the membership, participation and ledger tables.

use crate::{
    core::{
        access::{Action, Actor, Resource, authorize},
        club::{list_clubs, require_club},
        event::list_events,
        membership::{MemberView, list_members},
    },
    entities::{
        EventParticipation, FinanceRecord, FinanceRecordColumn, Membership, MembershipColumn,
        MembershipStatus, ParticipationColumn, User, club, event,
    },
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;

/// Current accepted members against declared capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemberCount {
    /// Accepted memberships
    pub current: u64,
    /// `max_member` of the club
    pub max: i32,
}

/// A club as shown in listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClubOverview {
    /// The club row
    #[serde(flatten)]
    pub club: club::Model,
    /// Member count
    pub member_count: MemberCount,
    /// Username of the president, if the club still has a manager
    pub president_name: Option<String>,
}

/// An event with its participant count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventOverview {
    /// The event row
    #[serde(flatten)]
    pub event: event::Model,
    /// Number of registrations
    pub participant_count: u64,
}

/// Everything the club page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClubDetail {
    /// Club with counts
    #[serde(flatten)]
    pub overview: ClubOverview,
    /// Accepted members
    pub members: Vec<MemberView>,
    /// Events the viewer may see
    pub events: Vec<EventOverview>,
}

/// Totals over a club's ledger, exact to the cent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinanceSummary {
    /// Sum of all amounts
    pub total: Decimal,
    /// Sum of positive amounts
    pub income: Decimal,
    /// Sum of negative amounts (zero or negative)
    pub expense: Decimal,
    /// Number of entries
    pub record_count: u64,
}

/// Accepted memberships of a club.
pub async fn member_count<C>(db: &C, club_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    Membership::find()
        .filter(MembershipColumn::ClubId.eq(club_id))
        .filter(MembershipColumn::Status.eq(MembershipStatus::Accepted))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Accepted memberships carrying the manager flag.
pub async fn manager_count<C>(db: &C, club_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    Membership::find()
        .filter(MembershipColumn::ClubId.eq(club_id))
        .filter(MembershipColumn::Status.eq(MembershipStatus::Accepted))
        .filter(MembershipColumn::IsManager.eq(true))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Registrations for an event.
pub async fn participant_count<C>(db: &C, event_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    EventParticipation::find()
        .filter(ParticipationColumn::EventId.eq(event_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Username of the longest-standing accepted manager.
pub async fn president_name<C>(db: &C, club_id: i64) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let row = Membership::find()
        .filter(MembershipColumn::ClubId.eq(club_id))
        .filter(MembershipColumn::Status.eq(MembershipStatus::Accepted))
        .filter(MembershipColumn::IsManager.eq(true))
        .order_by_asc(MembershipColumn::Id)
        .find_also_related(User)
        .one(db)
        .await?;
    Ok(row.and_then(|(_, user)| user).map(|u| u.username))
}

async fn ledger_amounts<C>(db: &C, club_id: i64) -> Result<Vec<Decimal>>
where
    C: ConnectionTrait,
{
    FinanceRecord::find()
        .select_only()
        .column(FinanceRecordColumn::Amount)
        .filter(FinanceRecordColumn::ClubId.eq(club_id))
        .into_tuple()
        .all(db)
        .await
        .map_err(Into::into)
}

fn summarize(amounts: &[Decimal]) -> FinanceSummary {
    let cents = |mut sum: Decimal| {
        sum.rescale(2);
        sum
    };
    let income: Decimal = amounts.iter().filter(|a| a.is_sign_positive()).sum();
    let expense: Decimal = amounts.iter().filter(|a| a.is_sign_negative()).sum();
    FinanceSummary {
        total: cents(amounts.iter().sum()),
        income: cents(income),
        expense: cents(expense),
        record_count: amounts.len() as u64,
    }
}

/// Signed sum of a club's ledger. Club managers only.
pub async fn finance_total(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
) -> Result<Decimal> {
    finance_summary(db, actor, club_id)
        .await
        .map(|summary| summary.total)
}

/// Income, expense and total of a club's ledger. Club managers only.
pub async fn finance_summary(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
) -> Result<FinanceSummary> {
    require_club(db, club_id).await?;
    authorize(actor, Action::ManageFinances, Resource::Club { club_id })?;
    Ok(summarize(&ledger_amounts(db, club_id).await?))
}

async fn overview<C>(db: &C, club: club::Model) -> Result<ClubOverview>
where
    C: ConnectionTrait,
{
    let current = member_count(db, club.id).await?;
    let president_name = president_name(db, club.id).await?;
    Ok(ClubOverview {
        member_count: MemberCount {
            current,
            max: club.max_member,
        },
        president_name,
        club,
    })
}

/// Every club with member count and president. Public.
pub async fn list_club_overviews(db: &DatabaseConnection) -> Result<Vec<ClubOverview>> {
    let mut overviews = Vec::new();
    for club in list_clubs(db).await? {
        overviews.push(overview(db, club).await?);
    }
    Ok(overviews)
}

/// A club page: counts, accepted members and the events `actor` may see.
pub async fn club_detail(
    db: &DatabaseConnection,
    actor: &Actor,
    club_id: i64,
) -> Result<ClubDetail> {
    let club = require_club(db, club_id).await?;
    authorize(actor, Action::ReadClubListing, Resource::Club { club_id })?;

    let members = list_members(db, club_id).await?;
    let mut events = Vec::new();
    for event in list_events(db, actor, club_id).await? {
        let participant_count = participant_count(db, event.id).await?;
        events.push(EventOverview {
            event,
            participant_count,
        });
    }

    Ok(ClubDetail {
        overview: overview(db, club).await?,
        members,
        events,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::access::load_actor;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[test]
    fn test_summarize_splits_income_and_expense() {
        let amounts = [100, -30, 20, -5].map(Decimal::from);
        let summary = summarize(&amounts);
        assert_eq!(summary.total, Decimal::from(85));
        assert_eq!(summary.income, Decimal::from(120));
        assert_eq!(summary.expense, Decimal::from(-35));
        assert_eq!(summary.record_count, 4);

        let empty = summarize(&[]);
        assert_eq!(empty.record_count, 0);
        assert!(empty.total.is_zero());
        assert_eq!(empty.total.to_string(), "0.00");
    }

    #[tokio::test]
    async fn test_finance_total_scenario() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let club = create_test_club(&db, &founder, "Hiking").await?;
        create_test_finance_record(&db, &founder, club.id, Decimal::new(10000, 2)).await?;
        create_test_finance_record(&db, &founder, club.id, Decimal::new(-3000, 2)).await?;

        let actor = load_actor(&db, founder.id).await?;
        let total = finance_total(&db, &actor, club.id).await?;
        assert_eq!(total, Decimal::new(7000, 2));
        assert_eq!(total.to_string(), "70.00");

        let summary = finance_summary(&db, &actor, club.id).await?;
        assert_eq!(summary.income, Decimal::from(100));
        assert_eq!(summary.expense, Decimal::from(-30));
        assert_eq!(summary.record_count, 2);

        let bob = create_test_user(&db, "bob").await?;
        let bob_actor = load_actor(&db, bob.id).await?;
        let result = finance_total(&db, &bob_actor, club.id).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_finance_total_is_exact_to_the_cent() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let club = create_test_club(&db, &founder, "Hiking").await?;
        create_test_finance_record(&db, &founder, club.id, Decimal::new(10, 2)).await?;
        create_test_finance_record(&db, &founder, club.id, Decimal::new(20, 2)).await?;

        let actor = load_actor(&db, founder.id).await?;
        let total = finance_total(&db, &actor, club.id).await?;
        assert_eq!(total, Decimal::new(30, 2));
        assert_eq!(total.to_string(), "0.30");

        let summary = finance_summary(&db, &actor, club.id).await?;
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["total"], serde_json::json!(0.3));
        Ok(())
    }

    #[tokio::test]
    async fn test_counts_follow_live_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let bob = create_test_user(&db, "bob").await?;
        let carol = create_test_user(&db, "carol").await?;
        let club = create_test_club(&db, &founder, "Hiking").await?;
        assert_eq!(member_count(&db, club.id).await?, 1);
        assert_eq!(manager_count(&db, club.id).await?, 1);

        // Pending requests do not count.
        join_test_club(&db, &carol, club.id).await?;
        assert_eq!(member_count(&db, club.id).await?, 1);
        accept_test_member(&db, &founder, &bob, club.id).await?;
        assert_eq!(member_count(&db, club.id).await?, 2);

        let event = create_test_event(&db, &founder, club.id, "Open day", true).await?;
        assert_eq!(participant_count(&db, event.id).await?, 0);
        join_test_event(&db, &bob, event.id).await?;
        join_test_event(&db, &carol, event.id).await?;
        assert_eq!(participant_count(&db, event.id).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_club_overview_and_detail() -> Result<()> {
        let db = setup_test_db().await?;
        let founder = create_test_user(&db, "founder").await?;
        let bob = create_test_user(&db, "bob").await?;
        let club = create_test_club(&db, &founder, "Hiking").await?;
        accept_test_member(&db, &founder, &bob, club.id).await?;
        create_test_event(&db, &founder, club.id, "Open day", true).await?;
        create_test_event(&db, &founder, club.id, "Members night", false).await?;

        let overviews = list_club_overviews(&db).await?;
        assert_eq!(overviews.len(), 1);
        assert_eq!(overviews[0].president_name.as_deref(), Some("founder"));
        assert_eq!(
            overviews[0].member_count,
            MemberCount {
                current: 2,
                max: club.max_member
            }
        );

        let public_view = club_detail(&db, &Actor::anonymous(), club.id).await?;
        assert_eq!(public_view.members.len(), 2);
        assert_eq!(public_view.events.len(), 1);

        let founder_actor = load_actor(&db, founder.id).await?;
        let manager_view = club_detail(&db, &founder_actor, club.id).await?;
        assert_eq!(manager_view.events.len(), 2);
        Ok(())
    }
}
