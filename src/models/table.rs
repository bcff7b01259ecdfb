//! Table session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of one dining window
pub const SESSION_DURATION_MINUTES: i64 = 90;

/// Status of a table session as seen on the staff console
///
/// Never persisted: it is derived from the stored flag and the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Active and still within its window
    Running,
    /// Active but past its end time, needs attention
    Expired,
    /// Manually ended by staff
    Ended,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Expired => write!(f, "expired"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// One table's occupancy window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSession {
    /// Opaque unique token, embedded in the customer locator
    pub id: String,
    /// Free-text table label ("12", "A3", ...)
    pub table_label: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Cleared exactly once, when staff end the session
    pub active: bool,
}

impl TableSession {
    /// Fixed duration of every session
    pub fn duration() -> Duration {
        Duration::minutes(SESSION_DURATION_MINUTES)
    }

    /// Create a new active session starting at `now`
    pub fn start(id: impl Into<String>, table_label: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            table_label: table_label.into(),
            start_time: now,
            end_time: now + Self::duration(),
            active: true,
        }
    }

    /// Active and past its end time
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.active && now >= self.end_time
    }

    /// Derive the console status at `now`
    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        if !self.active {
            SessionStatus::Ended
        } else if now >= self.end_time {
            SessionStatus::Expired
        } else {
            SessionStatus::Running
        }
    }
}
