//! Customer API endpoints
//!
//! - GET /api/customer/{sessionId} - Derived view for the customer page
//!
//! Unknown ids are not an error: the view itself reports `notFound`.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;

use crate::api::middleware::AppState;
use crate::services::{resolve_view, CustomerView};

/// Build the customer router
pub fn router() -> Router<AppState> {
    Router::new().route("/{session_id}", get(get_view))
}

/// GET /api/customer/{sessionId} - Current view of one session
async fn get_view(State(state): State<AppState>, Path(session_id): Path<String>) -> Json<CustomerView> {
    Json(resolve_view(state.store.clone(), &session_id, Utc::now()).await)
}
