//! Authorization engine - decides whether an actor may perform an action.
//!
//! Roles are never stored. An [`Actor`] is rebuilt from the user row and that
//! user's membership rows on every request, and [`can`] is a pure function of
//! that snapshot. Global admin and per-club manager are independent axes: a
//! user can administer the system, manage one club and merely belong to another
//! at the same time, which is why [`Actor::capabilities`] returns a list.

use crate::{
    entities::{Membership, MembershipColumn, MembershipStatus, User, membership, user},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, prelude::*};
use tracing::warn;

/// A privilege held by an actor, derived from current rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `users.is_admin` is set
    GlobalAdmin,
    /// Accepted membership with the manager flag in the given club
    ClubManager(i64),
    /// Accepted membership in the given club
    ClubMember(i64),
    /// No identity attached to the request
    Anonymous,
}

/// One membership row as seen by the authorization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipGrant {
    /// Club the membership belongs to
    pub club_id: i64,
    /// Membership status
    pub status: MembershipStatus,
    /// Manager flag
    pub is_manager: bool,
}

impl From<&membership::Model> for MembershipGrant {
    fn from(row: &membership::Model) -> Self {
        Self {
            club_id: row.club_id,
            status: row.status,
            is_manager: row.is_manager,
        }
    }
}

/// The identity behind a request together with its membership snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    user_id: Option<i64>,
    username: Option<String>,
    is_admin: bool,
    grants: Vec<MembershipGrant>,
}

impl Actor {
    /// An unauthenticated caller.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Builds an actor from a user row and that user's memberships.
    #[must_use]
    pub fn from_rows(user: &user::Model, memberships: &[membership::Model]) -> Self {
        Self {
            user_id: Some(user.id),
            username: Some(user.username.clone()),
            is_admin: user.is_admin,
            grants: memberships.iter().map(MembershipGrant::from).collect(),
        }
    }

    /// The authenticated user id, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    /// The authenticated username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The authenticated user id, or `Unauthorized` for anonymous callers.
    pub fn require_user(&self) -> Result<i64> {
        self.user_id.ok_or_else(|| Error::Unauthorized {
            message: "Authentication required".to_string(),
        })
    }

    /// Whether an identity is attached.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Global admin flag.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    fn grant_for(&self, club_id: i64) -> Option<&MembershipGrant> {
        self.grants.iter().find(|grant| grant.club_id == club_id)
    }

    /// Accepted membership with the manager flag.
    #[must_use]
    pub fn is_manager_of(&self, club_id: i64) -> bool {
        self.grant_for(club_id)
            .is_some_and(|grant| grant.is_manager && grant.status == MembershipStatus::Accepted)
    }

    /// Accepted membership.
    #[must_use]
    pub fn is_member_of(&self, club_id: i64) -> bool {
        self.grant_for(club_id)
            .is_some_and(|grant| grant.status == MembershipStatus::Accepted)
    }

    /// Any membership row, whatever its status.
    #[must_use]
    pub fn is_affiliated_with(&self, club_id: i64) -> bool {
        self.grant_for(club_id).is_some()
    }

    /// Ids of every club the actor has a membership row in.
    #[must_use]
    pub fn affiliated_club_ids(&self) -> Vec<i64> {
        self.grants.iter().map(|grant| grant.club_id).collect()
    }

    /// Every capability the actor currently holds.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        if !self.is_authenticated() {
            return vec![Capability::Anonymous];
        }

        let mut caps = Vec::new();
        if self.is_admin {
            caps.push(Capability::GlobalAdmin);
        }
        for grant in &self.grants {
            if grant.status != MembershipStatus::Accepted {
                continue;
            }
            if grant.is_manager {
                caps.push(Capability::ClubManager(grant.club_id));
            }
            caps.push(Capability::ClubMember(grant.club_id));
        }
        caps
    }
}

/// Something an actor wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Browse clubs, club details and public event listings
    ReadClubListing,
    /// Read the detail of a single event. A refused private read is
    /// `Unauthorized` for anonymous callers and `Forbidden` for everyone else.
    ReadEvent,
    /// Found a new club
    CreateClub,
    /// Edit club name, description, capacity or image
    UpdateClub,
    /// Move a club between lifecycle statuses
    TransitionClubStatus,
    /// Remove a club and everything under it
    DeleteClub,
    /// See non-public events in a club's listing
    ListAllEvents,
    /// Create, update or delete events
    ManageEvents,
    /// Create, read, update or delete finance records and stats
    ManageFinances,
    /// View participants and confirm payments
    ManagePayments,
    /// Decide join requests, promote and demote managers
    ManageMemberships,
    /// Request to join a club
    JoinClub,
    /// Leave a club
    LeaveClub,
    /// Register for an event
    JoinEvent,
    /// List, edit and delete user accounts
    ManageUsers,
    /// See the clubs one belongs to
    ViewOwnClubs,
}

/// What the action is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// No specific target (listings, creation)
    System,
    /// A club
    Club {
        /// Club id
        club_id: i64,
    },
    /// An event and the facts needed to judge visibility
    Event {
        /// Owning club id
        club_id: i64,
        /// Event visibility flag
        is_public: bool,
    },
    /// A user account
    User {
        /// Whether the target account is an admin
        is_admin: bool,
    },
}

impl Resource {
    const fn club_id(self) -> Option<i64> {
        match self {
            Self::Club { club_id } | Self::Event { club_id, .. } => Some(club_id),
            Self::System | Self::User { .. } => None,
        }
    }
}

/// Pure authorization predicate.
#[must_use]
pub fn can(actor: &Actor, action: Action, resource: Resource) -> bool {
    let manages = |resource: Resource| {
        resource
            .club_id()
            .is_some_and(|club_id| actor.is_manager_of(club_id))
    };

    match action {
        Action::ReadClubListing => true,
        Action::ReadEvent => match resource {
            Resource::Event { club_id, is_public } => {
                is_public || actor.is_affiliated_with(club_id)
            }
            _ => false,
        },
        Action::CreateClub | Action::JoinClub | Action::ViewOwnClubs => actor.is_authenticated(),
        Action::TransitionClubStatus | Action::DeleteClub => actor.is_admin(),
        Action::UpdateClub => actor.is_admin() || manages(resource),
        Action::ListAllEvents
        | Action::ManageEvents
        | Action::ManageFinances
        | Action::ManagePayments
        | Action::ManageMemberships => manages(resource),
        Action::LeaveClub => resource
            .club_id()
            .is_some_and(|club_id| actor.is_member_of(club_id)),
        Action::JoinEvent => {
            actor.is_authenticated()
                && match resource {
                    Resource::Event { club_id, is_public } => {
                        is_public || actor.is_affiliated_with(club_id)
                    }
                    _ => false,
                }
        }
        Action::ManageUsers => {
            actor.is_admin() && !matches!(resource, Resource::User { is_admin: true })
        }
    }
}

/// Like [`can`], but turns a denial into an error.
///
/// Anonymous callers get `Unauthorized` so the HTTP layer can ask for
/// credentials; authenticated callers get `Forbidden`.
pub fn authorize(actor: &Actor, action: Action, resource: Resource) -> Result<()> {
    if can(actor, action, resource) {
        return Ok(());
    }

    warn!(
        user_id = ?actor.user_id(),
        ?action,
        ?resource,
        "authorization denied"
    );

    if actor.is_authenticated() {
        Err(Error::forbidden(format!("{action:?} is not permitted")))
    } else {
        Err(Error::Unauthorized {
            message: "Authentication required".to_string(),
        })
    }
}

/// Loads the actor for `user_id` from current rows.
///
/// A token whose user no longer exists is treated as unauthenticated.
pub async fn load_actor<C>(db: &C, user_id: i64) -> Result<Actor>
where
    C: ConnectionTrait,
{
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Unauthorized {
            message: "Account no longer exists".to_string(),
        })?;

    let memberships = Membership::find()
        .filter(MembershipColumn::UserId.eq(user_id))
        .all(db)
        .await?;

    Ok(Actor::from_rows(&user, &memberships))
}
