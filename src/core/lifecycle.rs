//! Status transition rules for clubs, memberships, events and payments.
//!
//! Each `can_transition_to` is a pure table lookup; the `ensure_*` helpers
//! turn a refused transition into [`Error::InvalidTransition`] so callers can
//! check before touching the database.

use crate::{
    entities::{ClubStatus, EventStatus, MembershipStatus, PaymentStatus},
    errors::{Error, Result},
};
use serde::Deserialize;

impl ClubStatus {
    /// `pending → active | rejected`, `active → suspended | disbanded`,
    /// `suspended → active | disbanded`. Nothing leaves `rejected` or `disbanded`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active | Self::Rejected)
                | (Self::Active, Self::Suspended | Self::Disbanded)
                | (Self::Suspended, Self::Active | Self::Disbanded)
        )
    }

    /// No transition leaves this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Disbanded)
    }
}

impl MembershipStatus {
    /// `pending → accepted | rejected` (manager decision), `accepted → left`
    /// (the member themself).
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted | Self::Rejected) | (Self::Accepted, Self::Left)
        )
    }
}

impl EventStatus {
    /// `planning → open → closed → completed`, or `cancelled` from any
    /// non-terminal status.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Planning, Self::Open)
                | (Self::Open, Self::Closed)
                | (Self::Closed, Self::Completed)
                | (Self::Planning | Self::Open | Self::Closed, Self::Cancelled)
        )
    }

    /// `completed` and `cancelled` are final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl PaymentStatus {
    /// Only `pending → confirmed`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Pending, Self::Confirmed))
    }
}

fn refused(entity: &'static str, from: &str, to: &str) -> Error {
    Error::InvalidTransition {
        entity,
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Checks a club status change.
pub fn ensure_club_transition(from: ClubStatus, to: ClubStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(refused("club", from.as_str(), to.as_str()))
    }
}

/// Checks a membership status change.
pub fn ensure_membership_transition(from: MembershipStatus, to: MembershipStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(refused("membership", from.as_str(), to.as_str()))
    }
}

/// Checks an event status change. Setting the current status again is a no-op
/// and always allowed so that updates of other fields can resend it.
pub fn ensure_event_transition(from: EventStatus, to: EventStatus) -> Result<()> {
    if from == to || from.can_transition_to(to) {
        Ok(())
    } else {
        Err(refused("event", from.as_str(), to.as_str()))
    }
}

/// Checks a payment status change.
pub fn ensure_payment_transition(from: PaymentStatus, to: PaymentStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(refused("payment", from.as_str(), to.as_str()))
    }
}

/// Admin decisions on a club, as sent by the review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClubAction {
    /// pending → active
    Approve,
    /// pending → rejected
    Reject,
    /// active → suspended
    Suspend,
    /// active/suspended → disbanded
    Disband,
    /// suspended → active
    Reactivate,
}

impl ClubAction {
    /// Status the action moves the club to.
    #[must_use]
    pub const fn target_status(self) -> ClubStatus {
        match self {
            Self::Approve | Self::Reactivate => ClubStatus::Active,
            Self::Reject => ClubStatus::Rejected,
            Self::Suspend => ClubStatus::Suspended,
            Self::Disband => ClubStatus::Disbanded,
        }
    }
}
