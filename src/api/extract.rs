//! Identity extractors.
//!
//! Both extractors verify the bearer token and rebuild the [`Actor`] from the
//! database for this request only. Nothing about roles is read from the token.

use super::AppState;
use crate::{
    auth::TokenKind,
    core::access::{Actor, load_actor},
    errors::Error,
};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

/// An authenticated caller. Rejects the request with 401 when the token is
/// missing or invalid.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Actor);

/// An optional caller. A missing token yields an anonymous actor; a present
/// but invalid token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Actor);

fn bearer_token(parts: &Parts) -> Result<Option<&str>, Error> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| Some(token.trim()))
        .ok_or_else(|| Error::Unauthorized {
            message: "Invalid authorization header".to_string(),
        })
}

async fn actor_from_token(state: &AppState, token: &str) -> Result<Actor, Error> {
    let claims = state.jwt.verify_token(token, TokenKind::Access)?;
    let actor = load_actor(state.db.as_ref(), claims.user_id()?).await?;
    debug!(user_id = ?actor.user_id(), "request authenticated");
    Ok(actor)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let token = bearer_token(parts)?.ok_or_else(|| Error::Unauthorized {
            message: "Authentication required".to_string(),
        })?;
        actor_from_token(state, token).await.map(Self)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        match bearer_token(parts)? {
            Some(token) => actor_from_token(state, token).await.map(Self),
            None => Ok(Self(Actor::anonymous())),
        }
    }
}
