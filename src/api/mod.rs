//! API layer - HTTP handlers and routing
//!
//! This module contains every HTTP endpoint of the table timer:
//! - HTML pages for the staff console and the customer surface
//! - Staff login endpoints
//! - Customer view endpoint, polled by the customer page
//! - Admin endpoints, polled and called by the dashboard

pub mod admin;
pub mod auth;
pub mod customer;
pub mod middleware;
pub mod pages;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState};

/// Build the JSON API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need a valid staff login)
    let admin_routes = admin::router().route_layer(axum_middleware::from_fn_with_state(
        state,
        middleware::require_admin,
    ));

    Router::new()
        .nest("/auth", auth::router())
        .nest("/customer", customer::router())
        .nest("/admin", admin_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(pages::router())
        .nest("/api", build_api_router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::TableSession;
    use crate::store::{MemoryStore, SessionStore};
    use auth::AuthStatusResponse;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn setup_server() -> (TestServer, AppState) {
        let state = AppState::new(Config::default(), Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        let server = TestServer::new(build_router(state.clone())).unwrap();
        (server, state)
    }

    async fn login(server: &TestServer) {
        server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin", "password": "restaurant123" }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_admin_routes_require_login() {
        let (server, _state) = setup_server().await;

        let response = server.get("/api/admin/dashboard").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        server
            .post("/api/admin/sessions")
            .json(&json!({ "tableLabel": "12" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_logout_flow() {
        let (server, _state) = setup_server().await;

        server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin", "password": "wrong" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        let status: AuthStatusResponse = server.get("/api/auth/status").await.json();
        assert!(!status.authenticated);

        login(&server).await;
        let status: AuthStatusResponse = server.get("/api/auth/status").await.json();
        assert!(status.authenticated);
        server.get("/api/admin/dashboard").await.assert_status_ok();

        server.post("/api/auth/logout").await.assert_status_ok();
        server
            .get("/api/admin/dashboard")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_issue_and_end_session() {
        let (server, state) = setup_server().await;
        login(&server).await;

        let response = server
            .post("/api/admin/sessions")
            .json(&json!({ "tableLabel": " 12 " }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let issued: Value = response.json();
        let id = issued["session"]["id"].as_str().unwrap().to_string();
        assert_eq!(issued["session"]["tableLabel"], "12");
        assert_eq!(
            issued["locator"],
            format!("http://localhost:8080/customer/{}", id)
        );
        assert!(issued["image"]["dataUrl"]
            .as_str()
            .unwrap()
            .starts_with("data:image/svg+xml;base64,"));

        let dashboard: Value = server.get("/api/admin/dashboard").await.json();
        assert_eq!(dashboard["stats"]["active"], 1);
        assert_eq!(dashboard["sessions"]["active"][0]["status"], "running");

        let ended: Value = server
            .post(&format!("/api/admin/sessions/{}/end", id))
            .await
            .json();
        assert_eq!(ended["active"], false);

        let dashboard: Value = server.get("/api/admin/dashboard").await.json();
        assert_eq!(dashboard["stats"]["completed"], 1);
        assert_eq!(dashboard["stats"]["completionPercent"], 100);
        assert_eq!(dashboard["sessions"]["historical"][0]["status"], "ended");

        // Persisted through the shared store
        assert!(!state.store.find(&id).await.unwrap().active);
    }

    #[tokio::test]
    async fn test_issue_rejects_blank_label() {
        let (server, _state) = setup_server().await;
        login(&server).await;

        let response = server
            .post("/api/admin/sessions")
            .json(&json!({ "tableLabel": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (server, _state) = setup_server().await;
        login(&server).await;

        server
            .post("/api/admin/sessions/missing/end")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/api/admin/sessions/missing/qr")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .post("/api/admin/notifications/missing/dismiss")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_qr_download() {
        let (server, _state) = setup_server().await;
        login(&server).await;
        let issued: Value = server
            .post("/api/admin/sessions")
            .json(&json!({ "tableLabel": "A3" }))
            .await
            .json();
        let id = issued["session"]["id"].as_str().unwrap();

        let response = server.get(&format!("/api/admin/sessions/{}/qr", id)).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "image/svg+xml");
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"qr-table-A3.svg\""
        );
        assert!(response.text().contains("<svg"));
    }

    #[tokio::test]
    async fn test_expired_session_raises_notification() {
        let kv = Arc::new(MemoryStore::new());
        let start = Utc::now() - Duration::minutes(91);
        SessionStore::new(kv.clone())
            .save(&[TableSession::start("old", "7", start)])
            .await;
        let state = AppState::new(Config::default(), kv).await.unwrap();
        let server = TestServer::new(build_router(state)).unwrap();
        login(&server).await;

        let dashboard: Value = server.get("/api/admin/dashboard").await.json();
        assert_eq!(dashboard["expiredTables"], json!(["7"]));
        assert_eq!(dashboard["stats"]["needsAttention"], 1);
        let notifications = dashboard["notifications"].as_array().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["message"], "Dining time for table 7 has ended!");

        let id = notifications[0]["id"].as_str().unwrap();
        server
            .post(&format!("/api/admin/notifications/{}/dismiss", id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let dashboard: Value = server.get("/api/admin/dashboard").await.json();
        assert!(dashboard["notifications"].as_array().unwrap().is_empty());
        assert_eq!(dashboard["expiredTables"], json!(["7"]));

        server
            .delete("/api/admin/notifications")
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_customer_view_endpoint() {
        let (server, _state) = setup_server().await;

        let view: Value = server.get("/api/customer/nope").await.json();
        assert_eq!(view, json!({ "state": "notFound" }));

        login(&server).await;
        let issued: Value = server
            .post("/api/admin/sessions")
            .json(&json!({ "tableLabel": "12" }))
            .await
            .json();
        let id = issued["session"]["id"].as_str().unwrap();

        let view: Value = server.get(&format!("/api/customer/{}", id)).await.json();
        assert_eq!(view["state"], "countdown");
        assert_eq!(view["tableLabel"], "12");
        assert_eq!(view["status"], "normal");

        server.post(&format!("/api/admin/sessions/{}/end", id)).await.assert_status_ok();
        let view: Value = server.get(&format!("/api/customer/{}", id)).await.json();
        assert_eq!(view, json!({ "state": "endedByStaff", "tableLabel": "12" }));
    }

    #[tokio::test]
    async fn test_router_serves_request_without_listener() {
        let state = AppState::new(Config::default(), Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        let app = build_router(state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin");
    }

    #[tokio::test]
    async fn test_pages() {
        let (server, _state) = setup_server().await;

        server.get("/").await.assert_status(StatusCode::SEE_OTHER);

        let login_page = server.get("/admin").await;
        login_page.assert_status_ok();
        assert!(login_page.text().contains("login-form"));

        login(&server).await;
        let dashboard_page = server.get("/admin").await;
        assert!(dashboard_page.text().contains("issue-form"));

        let customer_page = server.get("/customer/nope").await;
        customer_page.assert_status_ok();
        assert!(customer_page.text().contains(r#"id="view-notFound" class="""#));
    }
}
