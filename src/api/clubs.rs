//! Club listing, founding, editing, admin decisions and "my clubs".

use super::{AppState, AuthUser, MaybeUser};
use crate::{
    core::{
        club::{self, ClubUpdate, NewClub},
        lifecycle::ClubAction,
        stats::{self, ClubDetail, ClubOverview},
    },
    entities::{ClubModel, ClubStatus},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: ClubStatus,
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    action: ClubAction,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/clubs", get(list).post(create))
        .route("/clubs/:id", get(detail).patch(update).delete(remove))
        .route("/clubs/:id/status", post(set_status))
        .route("/clubs/:id/approve", post(review))
        .route("/myclubs", get(my_clubs))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<ClubOverview>>> {
    Ok(Json(stats::list_club_overviews(state.db.as_ref()).await?))
}

async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<NewClub>,
) -> Result<(StatusCode, Json<ClubModel>)> {
    let created = club::create_club(state.db.as_ref(), &actor, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn detail(
    State(state): State<AppState>,
    MaybeUser(actor): MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<ClubDetail>> {
    Ok(Json(stats::club_detail(state.db.as_ref(), &actor, id).await?))
}

async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ClubUpdate>,
) -> Result<Json<ClubModel>> {
    Ok(Json(club::update_club(state.db.as_ref(), &actor, id, body).await?))
}

async fn remove(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    club::delete_club(state.db.as_ref(), &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_status(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<ClubModel>> {
    Ok(Json(
        club::transition_club_status(state.db.as_ref(), &actor, id, body.status).await?,
    ))
}

async fn review(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ActionRequest>,
) -> Result<Json<ClubModel>> {
    Ok(Json(
        club::apply_club_action(state.db.as_ref(), &actor, id, body.action).await?,
    ))
}

async fn my_clubs(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<Json<Vec<ClubModel>>> {
    Ok(Json(club::my_clubs(state.db.as_ref(), &actor).await?))
}
