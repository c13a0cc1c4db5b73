//! Registration, login, token refresh and the caller's own profile.

use super::{AppState, AuthUser};
use crate::{
    core::user::{self, NewUser, ProfileUpdate},
    entities::UserModel,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct UserSummary {
    id: i64,
    username: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    access: String,
    refresh: String,
    user: UserSummary,
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh: String,
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    access: String,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token/refresh", post(refresh))
        .route("/me", get(me).patch(update_me))
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<UserModel>)> {
    let created = user::register(state.db.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let found = user::authenticate(state.db.as_ref(), &body.username, &body.password).await?;
    let pair = state.jwt.issue_pair(found.id, &found.username)?;
    Ok(Json(LoginResponse {
        access: pair.access,
        refresh: pair.refresh,
        user: UserSummary {
            id: found.id,
            username: found.username,
        },
    }))
}

async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let access = state.jwt.refresh_access(&body.refresh)?;
    Ok(Json(RefreshResponse { access }))
}

async fn me(State(state): State<AppState>, AuthUser(actor): AuthUser) -> Result<Json<UserModel>> {
    Ok(Json(user::me(state.db.as_ref(), &actor).await?))
}

async fn update_me(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<UserModel>> {
    Ok(Json(user::update_me(state.db.as_ref(), &actor, body).await?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use crate::test_utils::TEST_PASSWORD;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_register_login_refresh_me() {
        let (app, _) = test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": TEST_PASSWORD
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "alice");
        assert!(body.get("password_hash").is_none());

        let (status, body) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({"username": "alice", "password": TEST_PASSWORD})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "alice");
        let access = body["access"].as_str().unwrap_or_default().to_string();
        let refresh = body["refresh"].as_str().unwrap_or_default().to_string();

        let (status, body) = send(&app, Method::GET, "/me", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "alice@example.com");

        // An access token cannot be used to refresh.
        let (status, _) = send(
            &app,
            Method::POST,
            "/token/refresh",
            None,
            Some(json!({ "refresh": access })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/token/refresh",
            None,
            Some(json!({ "refresh": refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["access"].is_string());
    }

    #[tokio::test]
    async fn test_bad_credentials_and_missing_token() {
        let (app, _) = test_app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({"username": "ghost", "password": "whatever1"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");

        let (status, _) = send(&app, Method::GET, "/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, Method::GET, "/me", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (app, _) = test_app().await;
        let body = json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": TEST_PASSWORD
        });
        let (status, _) = send(&app, Method::POST, "/register", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(&app, Method::POST, "/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");
    }
}
