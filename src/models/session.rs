//! Admin session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long an admin login stays valid
pub const ADMIN_SESSION_HOURS: i64 = 24;

/// Admin login flag persisted in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    /// Moment the admin logged in
    pub created_at: DateTime<Utc>,
}

impl AdminSession {
    /// Start a new admin session at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { created_at: now }
    }

    /// Expiration timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::hours(ADMIN_SESSION_HOURS)
    }

    /// Check if the session has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }
}
