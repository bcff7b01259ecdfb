//! API middleware
//!
//! Contains:
//! - Shared application state
//! - The JSON error envelope and its status mapping
//! - The staff login guard for admin routes

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::pages::{PageError, PageRenderer};
use crate::services::{AuthError, AuthService, CodeIssuer, ConsoleError, IssueError, StaffConsole};
use crate::store::{DynKeyValueStore, SessionStore};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    pub console: Arc<StaffConsole>,
    pub auth: Arc<AuthService>,
    pub pages: Arc<PageRenderer>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire up every service on top of `kv`
    pub async fn new(config: Config, kv: DynKeyValueStore) -> Result<Self, PageError> {
        let store = SessionStore::new(kv);
        let issuer = CodeIssuer::new(config.server.public_origin.clone());
        let console = StaffConsole::open(store.clone(), issuer).await;
        let auth = AuthService::new(store.clone(), config.admin.clone());
        let pages = PageRenderer::new()?;

        Ok(Self {
            store,
            console: Arc::new(console),
            auth: Arc::new(auth),
            pages: Arc::new(pages),
            config: Arc::new(config),
        })
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<IssueError> for ApiError {
    fn from(e: IssueError) -> Self {
        match e {
            IssueError::Validation(msg) => ApiError::validation_error(msg),
            IssueError::Render(_) => {
                tracing::error!("{}", e);
                ApiError::internal_error(e.to_string())
            }
        }
    }
}

impl From<ConsoleError> for ApiError {
    fn from(e: ConsoleError) -> Self {
        match e {
            ConsoleError::SessionNotFound(_) => ApiError::not_found(e.to_string()),
            ConsoleError::Issue(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => ApiError::unauthorized(e.to_string()),
        }
    }
}

impl From<PageError> for ApiError {
    fn from(e: PageError) -> Self {
        tracing::error!("{}", e);
        ApiError::internal_error("Failed to render page")
    }
}

/// Staff login guard
///
/// Rejects the request with 401 unless the admin flag is present and fresh.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.auth.is_authenticated(Utc::now()).await {
        return Err(ApiError::unauthorized("Staff login required"));
    }

    Ok(next.run(request).await)
}
