//! Authentication API endpoints
//!
//! Handles HTTP requests for staff login:
//! - POST /api/auth/login - Staff login
//! - POST /api/auth/logout - Staff logout
//! - GET /api/auth/status - Whether the admin flag is valid

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::services::LoginInput;

/// Request body for staff login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for login state
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

/// Build the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/status", get(status))
}

/// POST /api/auth/login - Staff login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthStatusResponse>, ApiError> {
    state
        .auth
        .login(LoginInput::new(body.username, body.password), Utc::now())
        .await?;

    Ok(Json(AuthStatusResponse { authenticated: true }))
}

/// POST /api/auth/logout - Staff logout
async fn logout(State(state): State<AppState>) -> Json<AuthStatusResponse> {
    state.auth.logout().await;
    Json(AuthStatusResponse { authenticated: false })
}

/// GET /api/auth/status - Current login state
async fn status(State(state): State<AppState>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        authenticated: state.auth.is_authenticated(Utc::now()).await,
    })
}
