//! Club ledger and its summary.

use super::{AppState, AuthUser};
use crate::{
    core::{
        finance::{self, FinanceRecordUpdate, NewFinanceRecord},
        stats::{self, FinanceSummary},
    },
    entities::FinanceRecordModel,
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
        .route("/clubs/:id/finances", get(list).post(create))
        .route("/clubs/:id/finances/stats", get(summary))
        .route(
            "/clubs/:id/finances/:record_id",
            get(detail).patch(update).delete(remove),
        )
}

async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(club_id): Path<i64>,
) -> Result<Json<Vec<FinanceRecordModel>>> {
    Ok(Json(
        finance::list_finance_records(state.db.as_ref(), &actor, club_id).await?,
    ))
}

async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(club_id): Path<i64>,
    Json(body): Json<NewFinanceRecord>,
) -> Result<(StatusCode, Json<FinanceRecordModel>)> {
    let created = finance::record_finance(state.db.as_ref(), &actor, club_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn summary(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(club_id): Path<i64>,
) -> Result<Json<FinanceSummary>> {
    Ok(Json(
        stats::finance_summary(state.db.as_ref(), &actor, club_id).await?,
    ))
}

async fn detail(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((club_id, record_id)): Path<(i64, i64)>,
) -> Result<Json<FinanceRecordModel>> {
    Ok(Json(
        finance::get_finance_record(state.db.as_ref(), &actor, club_id, record_id).await?,
    ))
}

async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((club_id, record_id)): Path<(i64, i64)>,
    Json(body): Json<FinanceRecordUpdate>,
) -> Result<Json<FinanceRecordModel>> {
    Ok(Json(
        finance::update_finance_record(state.db.as_ref(), &actor, club_id, record_id, body).await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((club_id, record_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    finance::delete_finance_record(state.db.as_ref(), &actor, club_id, record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
