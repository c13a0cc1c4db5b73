//! User accounts - registration, login, self-service profile and admin management.
//!
//! Admin accounts are invisible to the admin management functions: an admin can
//! list, edit and delete ordinary users only, and looking up another admin yields
//! `NotFound` exactly as if the row did not exist.

use crate::{
    auth::PasswordService,
    config::settings::AdminConfig,
    core::access::{Action, Actor, Resource, authorize},
    entities::{
        EventParticipation, Membership, MembershipColumn, ParticipationColumn, User, UserColumn,
        user,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Fields accepted at registration.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Login name
    pub username: String,
    /// Contact e-mail
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
    /// Optional contact
    #[serde(default)]
    pub contact: Option<String>,
}

/// Editable profile fields. `is_admin` is intentionally absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    /// New e-mail
    #[serde(default)]
    pub email: Option<String>,
    /// New display name
    #[serde(default)]
    pub name: Option<String>,
    /// New contact
    #[serde(default)]
    pub contact: Option<String>,
    /// New password
    #[serde(default)]
    pub password: Option<String>,
}

fn validate_username(username: &str) -> Result<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Username cannot be empty"));
    }
    if trimmed.chars().count() > 150 {
        return Err(Error::validation("Username must be at most 150 characters"));
    }
    Ok(trimmed.to_string())
}

fn validate_email(email: &str) -> Result<String> {
    let trimmed = email.trim();
    if !trimmed.contains('@') {
        return Err(Error::validation("A valid e-mail address is required"));
    }
    Ok(trimmed.to_string())
}

async fn insert_user<C>(db: &C, new_user: NewUser, is_admin: bool) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let username = validate_username(&new_user.username)?;
    let email = validate_email(&new_user.email)?;
    PasswordService::validate_password_strength(&new_user.password)?;
    let password_hash = PasswordService::hash_password(&new_user.password)?;

    let model = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        password_hash: Set(password_hash),
        name: Set(new_user.name),
        contact: Set(new_user.contact),
        is_admin: Set(is_admin),
        date_joined: Set(chrono::Utc::now()),
        ..Default::default()
    };

    // The unique index on username turns a duplicate into Error::Conflict.
    model.insert(db).await.map_err(Into::into)
}

/// Registers a new, non-admin account.
pub async fn register(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    let created = insert_user(db, new_user, false).await?;
    info!(user_id = created.id, username = %created.username, "user registered");
    Ok(created)
}

/// Checks a username/password pair. Unknown user and wrong password fail the same way.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    let invalid = || Error::Unauthorized {
        message: "Invalid username or password".to_string(),
    };

    let found = User::find()
        .filter(UserColumn::Username.eq(username.trim()))
        .one(db)
        .await?
        .ok_or_else(invalid)?;

    if PasswordService::verify_password(password, &found.password_hash)? {
        Ok(found)
    } else {
        Err(invalid())
    }
}

/// Finds a user by id.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// The caller's own account.
pub async fn me(db: &DatabaseConnection, actor: &Actor) -> Result<user::Model> {
    let user_id = actor.require_user()?;
    get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::NotFound {
            resource: "user",
            id: user_id,
        })
}

async fn apply_profile_update(
    db: &DatabaseConnection,
    existing: user::Model,
    update: ProfileUpdate,
) -> Result<user::Model> {
    let mut model: user::ActiveModel = existing.into();

    if let Some(email) = update.email {
        model.email = Set(validate_email(&email)?);
    }
    if let Some(name) = update.name {
        model.name = Set(Some(name));
    }
    if let Some(contact) = update.contact {
        model.contact = Set(Some(contact));
    }
    if let Some(password) = update.password {
        PasswordService::validate_password_strength(&password)?;
        model.password_hash = Set(PasswordService::hash_password(&password)?);
    }

    model.update(db).await.map_err(Into::into)
}

/// Updates the caller's own profile.
pub async fn update_me(
    db: &DatabaseConnection,
    actor: &Actor,
    update: ProfileUpdate,
) -> Result<user::Model> {
    let existing = me(db, actor).await?;
    apply_profile_update(db, existing, update).await
}

/// Lists every non-admin account, ordered by username.
pub async fn list_users(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<user::Model>> {
    authorize(actor, Action::ManageUsers, Resource::System)?;
    User::find()
        .filter(UserColumn::IsAdmin.eq(false))
        .order_by_asc(UserColumn::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches a non-admin account for an admin. Admin targets read as `NotFound`.
pub async fn get_user(db: &DatabaseConnection, actor: &Actor, user_id: i64) -> Result<user::Model> {
    authorize(actor, Action::ManageUsers, Resource::System)?;
    let not_found = Error::NotFound {
        resource: "user",
        id: user_id,
    };
    let found = get_user_by_id(db, user_id).await?.ok_or(not_found)?;
    if authorize(actor, Action::ManageUsers, Resource::User { is_admin: found.is_admin }).is_err() {
        return Err(Error::NotFound {
            resource: "user",
            id: user_id,
        });
    }
    Ok(found)
}

/// Admin edit of a non-admin account.
pub async fn update_user(
    db: &DatabaseConnection,
    actor: &Actor,
    user_id: i64,
    update: ProfileUpdate,
) -> Result<user::Model> {
    let existing = get_user(db, actor, user_id).await?;
    apply_profile_update(db, existing, update).await
}

/// Admin removal of a non-admin account, together with its memberships and
/// event participations.
pub async fn delete_user(db: &DatabaseConnection, actor: &Actor, user_id: i64) -> Result<()> {
    let target = get_user(db, actor, user_id).await?;

    let txn = db.begin().await?;
    EventParticipation::delete_many()
        .filter(ParticipationColumn::UserId.eq(target.id))
        .exec(&txn)
        .await?;
    Membership::delete_many()
        .filter(MembershipColumn::UserId.eq(target.id))
        .exec(&txn)
        .await?;
    User::delete_by_id(target.id).exec(&txn).await?;
    txn.commit().await?;

    info!(user_id = target.id, "user deleted by admin");
    Ok(())
}

/// Creates the admin account if no user with that username exists yet.
/// Returns whether an account was created.
pub async fn ensure_admin(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
) -> Result<bool> {
    let exists = User::find()
        .filter(UserColumn::Username.eq(username.trim()))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Ok(false);
    }

    let new_user = NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        name: None,
        contact: None,
    };
    let created = insert_user(db, new_user, true).await?;
    info!(user_id = created.id, username = %created.username, "admin account seeded");
    Ok(true)
}

/// Seeds the configured admin accounts. Returns how many were created.
pub async fn seed_admins(
    db: &DatabaseConnection,
    admins: &[AdminConfig],
    password: &str,
) -> Result<usize> {
    let mut created = 0;
    for admin in admins {
        if ensure_admin(db, &admin.username, &admin.email, password).await? {
            created += 1;
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::access::load_actor;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_register_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = insert_user(
            &db,
            NewUser {
                username: "   ".to_string(),
                email: "a@example.com".to_string(),
                password: "secret123".to_string(),
                name: None,
                contact: None,
            },
            false,
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = insert_user(
            &db,
            NewUser {
                username: "alice".to_string(),
                email: "a@example.com".to_string(),
                password: "short".to_string(),
                name: None,
                contact: None,
            },
            false,
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_and_authenticate() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        assert!(!alice.is_admin);
        assert_ne!(alice.password_hash, TEST_PASSWORD);

        let logged_in = authenticate(&db, "alice", TEST_PASSWORD).await?;
        assert_eq!(logged_in.id, alice.id);

        let wrong = authenticate(&db, "alice", "wrongpass1").await;
        assert!(matches!(wrong, Err(Error::Unauthorized { .. })));
        let unknown = authenticate(&db, "nobody", TEST_PASSWORD).await;
        assert!(matches!(unknown, Err(Error::Unauthorized { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "alice").await?;
        let result = create_test_user(&db, "alice").await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_listing_excludes_admins() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "root").await?;
        create_test_admin(&db, "other_root").await?;
        create_test_user(&db, "bob").await?;
        create_test_user(&db, "alice").await?;

        let actor = load_actor(&db, admin.id).await?;
        let users = list_users(&db, &actor).await?;
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_cannot_reach_other_admins() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "root").await?;
        let other = create_test_admin(&db, "other_root").await?;
        let actor = load_actor(&db, admin.id).await?;

        let result = get_user(&db, &actor, other.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        let result = delete_user(&db, &actor, other.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_cannot_manage_users() -> Result<()> {
        let db = setup_test_db().await?;
        let bob = create_test_user(&db, "bob").await?;
        let actor = load_actor(&db, bob.id).await?;

        let result = list_users(&db, &actor).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_me_keeps_admin_flag() -> Result<()> {
        let db = setup_test_db().await?;
        let bob = create_test_user(&db, "bob").await?;
        let actor = load_actor(&db, bob.id).await?;

        let updated = update_me(
            &db,
            &actor,
            ProfileUpdate {
                name: Some("Bob B.".to_string()),
                password: Some("newpass99".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.name.as_deref(), Some("Bob B."));
        assert!(!updated.is_admin);
        authenticate(&db, "bob", "newpass99").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_user_cascades_memberships() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "root").await?;
        let founder = create_test_user(&db, "founder").await?;
        let bob = create_test_user(&db, "bob").await?;
        let club = create_test_club(&db, &founder, "Chess").await?;
        join_test_club(&db, &bob, club.id).await?;

        let actor = load_actor(&db, admin.id).await?;
        delete_user(&db, &actor, bob.id).await?;

        assert!(get_user_by_id(&db, bob.id).await?.is_none());
        let remaining = Membership::find()
            .filter(MembershipColumn::ClubId.eq(club.id))
            .all(&db)
            .await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].user_id, founder.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(ensure_admin(&db, "root", "root@example.com", TEST_PASSWORD).await?);
        assert!(!ensure_admin(&db, "root", "root@example.com", TEST_PASSWORD).await?);

        let root = authenticate(&db, "root", TEST_PASSWORD).await?;
        assert!(root.is_admin);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_admins() -> Result<()> {
        let db = setup_test_db().await?;
        let admins = vec![
            AdminConfig {
                username: "root".to_string(),
                email: "root@example.com".to_string(),
            },
            AdminConfig {
                username: "ops".to_string(),
                email: "ops@example.com".to_string(),
            },
        ];
        assert_eq!(seed_admins(&db, &admins, TEST_PASSWORD).await?, 2);
        assert_eq!(seed_admins(&db, &admins, TEST_PASSWORD).await?, 0);
        Ok(())
    }
}
