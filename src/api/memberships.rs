//! Joining and leaving clubs, and manager decisions on membership rows.

use super::{AppState, AuthUser};
use crate::{
    core::membership::{self, MemberView, MembershipUpdate},
    entities::MembershipModel,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/clubs/:id/join", post(join))
        .route("/clubs/:id/leave", post(leave))
        .route("/clubs/:id/memberships", get(list))
        .route("/memberships/:id", patch(update))
}

async fn join(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MembershipModel>> {
    Ok(Json(membership::join_club(state.db.as_ref(), &actor, id).await?))
}

async fn leave(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MembershipModel>> {
    Ok(Json(membership::leave_club(state.db.as_ref(), &actor, id).await?))
}

async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<MemberView>>> {
    Ok(Json(membership::list_memberships(state.db.as_ref(), &actor, id).await?))
}

async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<MembershipUpdate>,
) -> Result<Json<MembershipModel>> {
    Ok(Json(
        membership::update_membership(state.db.as_ref(), &actor, id, body).await?,
    ))
}
