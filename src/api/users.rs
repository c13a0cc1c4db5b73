//! Admin user management.

use super::{AppState, AuthUser};
use crate::{
    core::user::{self, ProfileUpdate},
    entities::UserModel,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list))
        .route("/users/:id", get(detail).patch(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<Json<Vec<UserModel>>> {
    Ok(Json(user::list_users(state.db.as_ref(), &actor).await?))
}

async fn detail(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<UserModel>> {
    Ok(Json(user::get_user(state.db.as_ref(), &actor, id).await?))
}

async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<UserModel>> {
    Ok(Json(user::update_user(state.db.as_ref(), &actor, id, body).await?))
}

async fn remove(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    user::delete_user(state.db.as_ref(), &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
