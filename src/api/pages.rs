//! HTML page handlers
//!
//! - GET / - Redirect to the staff console
//! - GET /admin - Login form, or the dashboard once logged in
//! - GET /customer/{sessionId} - Customer countdown (the QR code target)

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    routing::get,
    Router,
};
use chrono::{Local, Utc};

use crate::api::middleware::{ApiError, AppState};
use crate::services::resolve_view;

/// Build the page router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/admin", get(admin_page))
        .route("/customer/{session_id}", get(customer_page))
}

/// GET / - Send visitors to the staff console
async fn index() -> Redirect {
    Redirect::to("/admin")
}

/// GET /admin - Login or dashboard
async fn admin_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    if !state.auth.is_authenticated(Utc::now()).await {
        return Ok(Html(state.pages.login()?));
    }

    let snapshot = state.console.snapshot(&Local::now()).await;
    let html = state
        .pages
        .dashboard(&snapshot, state.config.timers.console_tick_ms)?;
    Ok(Html(html))
}

/// GET /customer/{sessionId} - Customer page
async fn customer_page(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let view = resolve_view(state.store.clone(), &session_id, Utc::now()).await;
    let html = state
        .pages
        .customer(&session_id, &view, state.config.timers.customer_refresh_seconds)?;
    Ok(Html(html))
}
