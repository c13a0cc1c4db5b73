//! Club events, event registration and payment confirmation.

use super::{AppState, AuthUser, MaybeUser};
use crate::{
    core::{
        event::{self, EventUpdate, NewEvent},
        participation::{self, ParticipantView},
    },
    entities::{EventModel, ParticipationModel, PaymentStatus},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JoinRequest {
    #[serde(default)]
    payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentRequest {
    payment_status: PaymentStatus,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/clubs/:id/events", get(list).post(create))
        .route(
            "/clubs/:id/events/:event_id",
            get(detail).patch(update).delete(remove),
        )
        .route("/events/:id/join", post(join))
        .route("/events/:id/participants", get(participants))
        .route("/events/:id/participants/:pid", patch(payment))
}

async fn list(
    State(state): State<AppState>,
    MaybeUser(actor): MaybeUser,
    Path(club_id): Path<i64>,
) -> Result<Json<Vec<EventModel>>> {
    Ok(Json(event::list_events(state.db.as_ref(), &actor, club_id).await?))
}

async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(club_id): Path<i64>,
    Json(body): Json<NewEvent>,
) -> Result<(StatusCode, Json<EventModel>)> {
    let created = event::create_event(state.db.as_ref(), &actor, club_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn detail(
    State(state): State<AppState>,
    MaybeUser(actor): MaybeUser,
    Path((club_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<EventModel>> {
    Ok(Json(
        event::get_event(state.db.as_ref(), &actor, club_id, event_id).await?,
    ))
}

async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((club_id, event_id)): Path<(i64, i64)>,
    Json(body): Json<EventUpdate>,
) -> Result<Json<EventModel>> {
    Ok(Json(
        event::update_event(state.db.as_ref(), &actor, club_id, event_id, body).await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((club_id, event_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    event::delete_event(state.db.as_ref(), &actor, club_id, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn join(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<i64>,
    body: Option<Json<JoinRequest>>,
) -> Result<Json<ParticipationModel>> {
    let payment_method = body.and_then(|Json(body)| body.payment_method);
    Ok(Json(
        participation::join_event(state.db.as_ref(), &actor, event_id, payment_method).await?,
    ))
}

async fn participants(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<ParticipantView>>> {
    Ok(Json(
        participation::list_participants(state.db.as_ref(), &actor, event_id).await?,
    ))
}

async fn payment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((event_id, participation_id)): Path<(i64, i64)>,
    Json(body): Json<PaymentRequest>,
) -> Result<Json<ParticipationModel>> {
    Ok(Json(
        participation::update_payment_status(
            state.db.as_ref(),
            &actor,
            event_id,
            participation_id,
            body.payment_status,
        )
        .await?,
    ))
}
