//! Staff login
//!
//! Checks the configured demo credentials and maintains the admin flag in
//! the session store. Credentials are compared in plain text and the flag is
//! unsigned: this gate keeps guests off the console on a shared device, it
//! is not a security boundary.

use chrono::{DateTime, Utc};

use crate::config::AdminConfig;
use crate::store::SessionStore;

/// Error types for login
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Username or password did not match
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Input for staff login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    /// Create a new login input
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Staff authentication service
pub struct AuthService {
    store: SessionStore,
    credentials: AdminConfig,
}

impl AuthService {
    pub fn new(store: SessionStore, credentials: AdminConfig) -> Self {
        Self { store, credentials }
    }

    /// Log in and start the admin flag at `now`
    pub async fn login(&self, input: LoginInput, now: DateTime<Utc>) -> Result<(), AuthError> {
        if input.username != self.credentials.username || input.password != self.credentials.password {
            tracing::warn!(username = %input.username, "Staff login failed");
            return Err(AuthError::InvalidCredentials);
        }

        self.store.begin_admin_session(now).await;
        tracing::info!(username = %input.username, "Staff logged in");
        Ok(())
    }

    /// Log out, clearing the admin flag
    pub async fn logout(&self) {
        self.store.end_admin_session().await;
        tracing::info!("Staff logged out");
    }

    /// Whether the admin flag is present and fresh at `now`
    pub async fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.store.is_admin_authenticated(now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn setup_service() -> AuthService {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        AuthService::new(store, AdminConfig::default())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_login_with_demo_credentials() {
        let service = setup_service();

        service
            .login(LoginInput::new("admin", "restaurant123"), now())
            .await
            .unwrap();

        assert!(service.is_authenticated(now() + Duration::hours(1)).await);
    }

    #[tokio::test]
    async fn test_login_wrong_password_fails() {
        let service = setup_service();

        let result = service.login(LoginInput::new("admin", "nope"), now()).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(!service.is_authenticated(now()).await);
    }

    #[tokio::test]
    async fn test_logout_clears_flag() {
        let service = setup_service();
        service
            .login(LoginInput::new("admin", "restaurant123"), now())
            .await
            .unwrap();

        service.logout().await;

        assert!(!service.is_authenticated(now()).await);
    }

    #[tokio::test]
    async fn test_login_expires_after_a_day() {
        let service = setup_service();
        service
            .login(LoginInput::new("admin", "restaurant123"), now())
            .await
            .unwrap();

        assert!(!service.is_authenticated(now() + Duration::hours(25)).await);
    }
}
