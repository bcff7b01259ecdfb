//! Admin API endpoints
//!
//! Handles HTTP requests from the staff dashboard:
//! - GET /api/admin/dashboard - Counters, listing and pending alerts
//! - POST /api/admin/sessions - Issue a code for a table
//! - POST /api/admin/sessions/{id}/end - End a session by hand
//! - GET /api/admin/sessions/{id}/qr - Download a session's code
//! - POST /api/admin/notifications/{id}/dismiss - Acknowledge one alert
//! - DELETE /api/admin/notifications - Acknowledge every alert
//!
//! All routes sit behind the staff login guard.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Local, Utc};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::TableSession;
use crate::services::{DashboardSnapshot, IssuedCode};

/// Request body for issuing a code
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub table_label: String,
}

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/sessions", post(issue_code))
        .route("/sessions/{id}/end", post(end_session))
        .route("/sessions/{id}/qr", get(download_qr))
        .route("/notifications/{id}/dismiss", post(dismiss_notification))
        .route("/notifications", delete(clear_notifications))
}

/// GET /api/admin/dashboard - Everything the dashboard shows
///
/// "Today" follows the server's local calendar date.
async fn dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.console.snapshot(&Local::now()).await)
}

/// POST /api/admin/sessions - Issue a code
async fn issue_code(
    State(state): State<AppState>,
    Json(body): Json<IssueRequest>,
) -> Result<(StatusCode, Json<IssuedCode>), ApiError> {
    let issued = state.console.issue_code(&body.table_label, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

/// POST /api/admin/sessions/{id}/end - End a session
async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TableSession>, ApiError> {
    let session = state.console.end_session(&id).await?;
    Ok(Json(session))
}

/// GET /api/admin/sessions/{id}/qr - Download the code as SVG
async fn download_qr(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let (_, image) = state.console.qr_code(&id).await?;
    let disposition = format!("attachment; filename=\"{}\"", image.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        image.svg,
    )
        .into_response())
}

/// POST /api/admin/notifications/{id}/dismiss - Acknowledge one alert
async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.console.dismiss_notification(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Notification not found: {}", id)))
    }
}

/// DELETE /api/admin/notifications - Acknowledge every alert
async fn clear_notifications(State(state): State<AppState>) -> StatusCode {
    state.console.clear_notifications().await;
    StatusCode::NO_CONTENT
}
