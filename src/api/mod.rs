//! JSON-over-HTTP surface.
//!
//! Handlers stay thin: they pull the identity and body out of the request and
//! hand them to `core`. Every authorization and transition decision is made
//! there, never here.

mod auth;
mod clubs;
mod error;
mod events;
mod extract;
mod finances;
mod memberships;
mod users;

pub use error::ErrorBody;
pub use extract::{AuthUser, MaybeUser};

use crate::auth::JwtService;
use axum::{Json, Router, extract::State, routing::get};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
    /// Token issuer/verifier
    pub jwt: JwtService,
}

impl AppState {
    /// Bundles the connection and token service.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt: JwtService) -> Self {
        Self {
            db: Arc::new(db),
            jwt,
        }
    }
}

/// Builds the complete router with tracing and CORS layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(users::routes())
        .merge(clubs::routes())
        .merge(memberships::routes())
        .merge(events::routes())
        .merge(finances::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> crate::errors::Result<Json<Value>> {
    state.db.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
