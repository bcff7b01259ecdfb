//! Staff console
//!
//! Business logic behind the staff dashboard:
//! - Issuing codes for tables
//! - Ending sessions by hand
//! - Listing sessions and the live counters
//! - Expiry alerts, driven by a periodic tick
//!
//! The console loads the session list once when it opens and rewrites the
//! whole list after every change. Expiry is never stored: every listing and
//! counter is recomputed from the stored sessions and the time passed in.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::models::{Notification, SessionStatus, TableSession};
use crate::services::countdown::Countdown;
use crate::services::issuer::{CodeIssuer, IssueError, IssuedCode, QrImage};
use crate::services::notifications::NotificationDeriver;
use crate::store::SessionStore;

/// Error types for console operations
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// No session with that id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Issuing a code failed
    #[error(transparent)]
    Issue(#[from] IssueError),
}

/// One row of the session table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub id: String,
    pub table_label: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub active: bool,
    pub status: SessionStatus,
    /// `m:ss` or `Finished`
    pub remaining: String,
    pub countdown: Countdown,
}

impl SessionRow {
    fn derive(session: &TableSession, now: DateTime<Utc>) -> Self {
        let countdown = Countdown::for_session(now, session);
        Self {
            id: session.id.clone(),
            table_label: session.table_label.clone(),
            start_time: session.start_time,
            end_time: session.end_time,
            active: session.active,
            status: session.status_at(now),
            remaining: countdown.display(),
            countdown,
        }
    }
}

/// Sessions split by the manual-end flag
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionListing {
    /// Not yet ended by staff, including those past their end time
    pub active: Vec<SessionRow>,
    /// Ended by staff
    pub historical: Vec<SessionRow>,
}

/// Live counters shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleStats {
    /// Active and still within time
    pub active: usize,
    /// Active but past end time
    pub needs_attention: usize,
    /// Issued on the current calendar date
    pub total_today: usize,
    /// Ended by staff
    pub completed: usize,
    /// Every session ever issued
    pub total: usize,
    /// `completed / total` as a rounded percentage, 0 when empty
    pub completion_percent: u32,
}

impl ConsoleStats {
    /// Compute counters for `sessions` at `now`
    ///
    /// "Today" is the calendar date of `now` in its own time zone.
    pub fn compute<Tz: TimeZone>(sessions: &[TableSession], now: &DateTime<Tz>) -> Self {
        let now_utc = now.with_timezone(&Utc);
        let tz = now.timezone();
        let today = now.date_naive();

        let active = sessions
            .iter()
            .filter(|s| s.active && now_utc < s.end_time)
            .count();
        let needs_attention = sessions.iter().filter(|s| s.is_expired_at(now_utc)).count();
        let total_today = sessions
            .iter()
            .filter(|s| s.start_time.with_timezone(&tz).date_naive() == today)
            .count();
        let completed = sessions.iter().filter(|s| !s.active).count();
        let total = sessions.len();
        let completion_percent = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };

        Self {
            active,
            needs_attention,
            total_today,
            completed,
            total,
            completion_percent,
        }
    }
}

/// Everything the dashboard renders in one poll
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub now: DateTime<Utc>,
    pub stats: ConsoleStats,
    pub sessions: SessionListing,
    /// Labels of tables past their end time and not yet ended
    pub expired_tables: Vec<String>,
    pub notifications: Vec<Notification>,
}

struct ConsoleState {
    sessions: Vec<TableSession>,
    deriver: NotificationDeriver,
}

/// Staff console service
pub struct StaffConsole {
    store: SessionStore,
    issuer: CodeIssuer,
    state: Mutex<ConsoleState>,
}

impl StaffConsole {
    /// Open the console, loading the working set from the store
    pub async fn open(store: SessionStore, issuer: CodeIssuer) -> Self {
        let sessions = store.load().await;
        tracing::info!("Staff console opened with {} stored sessions", sessions.len());

        Self {
            store,
            issuer,
            state: Mutex::new(ConsoleState {
                sessions,
                deriver: NotificationDeriver::new(),
            }),
        }
    }

    pub fn issuer(&self) -> &CodeIssuer {
        &self.issuer
    }

    /// Issue a code for `table_label` and add its session
    ///
    /// # Errors
    ///
    /// - `Issue(Validation)` for a blank label
    /// - `Issue(Render)` if the QR code fails; nothing is added
    pub async fn issue_code(
        &self,
        table_label: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedCode, ConsoleError> {
        let issued = self.issuer.issue(table_label, now)?;

        let mut state = self.state.lock().await;
        state.sessions.push(issued.session.clone());
        self.store.save(&state.sessions).await;

        tracing::info!(
            session_id = %issued.session.id,
            table = %issued.session.table_label,
            ends_at = %issued.session.end_time,
            "Issued table code"
        );
        Ok(issued)
    }

    /// End a session by hand
    ///
    /// Ending an already ended session changes nothing.
    pub async fn end_session(&self, session_id: &str) -> Result<TableSession, ConsoleError> {
        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| ConsoleError::SessionNotFound(session_id.to_string()))?;

        if !session.active {
            return Ok(session.clone());
        }

        session.active = false;
        let ended = session.clone();
        self.store.save(&state.sessions).await;

        tracing::info!(session_id = %ended.id, table = %ended.table_label, "Session ended by staff");
        Ok(ended)
    }

    /// All sessions in issue order
    pub async fn sessions(&self) -> Vec<TableSession> {
        self.state.lock().await.sessions.clone()
    }

    /// Render the QR code of an existing session again
    pub async fn qr_code(&self, session_id: &str) -> Result<(TableSession, QrImage), ConsoleError> {
        let session = self
            .state
            .lock()
            .await
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .cloned()
            .ok_or_else(|| ConsoleError::SessionNotFound(session_id.to_string()))?;

        let image = self.issuer.render(&session)?;
        Ok((session, image))
    }

    /// Split sessions into active and historical rows at `now`
    pub async fn list_sessions(&self, now: DateTime<Utc>) -> SessionListing {
        let state = self.state.lock().await;
        list(&state.sessions, now)
    }

    /// Live counters at `now`
    pub async fn stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ConsoleStats {
        let state = self.state.lock().await;
        ConsoleStats::compute(&state.sessions, now)
    }

    /// Labels of tables that ran out of time and are still active
    pub async fn expired_tables(&self, now: DateTime<Utc>) -> Vec<String> {
        let state = self.state.lock().await;
        expired_labels(&state.sessions, now)
    }

    /// Run the notification deriver once
    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let mut state = self.state.lock().await;
        let ConsoleState { sessions, deriver } = &mut *state;
        deriver.tick(sessions, now)
    }

    /// Alerts waiting for acknowledgement
    pub async fn pending_notifications(&self) -> Vec<Notification> {
        self.state.lock().await.deriver.pending().to_vec()
    }

    /// Acknowledge one alert
    pub async fn dismiss_notification(&self, notification_id: &str) -> bool {
        self.state.lock().await.deriver.dismiss(notification_id)
    }

    /// Acknowledge all alerts
    pub async fn clear_notifications(&self) {
        self.state.lock().await.deriver.clear_all();
    }

    /// Tick, then collect everything the dashboard shows
    pub async fn snapshot<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DashboardSnapshot {
        let now_utc = now.with_timezone(&Utc);
        let mut state = self.state.lock().await;
        let ConsoleState { sessions, deriver } = &mut *state;
        deriver.tick(sessions, now_utc);

        DashboardSnapshot {
            now: now_utc,
            stats: ConsoleStats::compute(sessions, now),
            sessions: list(sessions, now_utc),
            expired_tables: expired_labels(sessions, now_utc),
            notifications: deriver.pending().to_vec(),
        }
    }
}

fn list(sessions: &[TableSession], now: DateTime<Utc>) -> SessionListing {
    let (active, historical): (Vec<_>, Vec<_>) = sessions.iter().partition(|s| s.active);
    SessionListing {
        active: active.into_iter().map(|s| SessionRow::derive(s, now)).collect(),
        historical: historical.into_iter().map(|s| SessionRow::derive(s, now)).collect(),
    }
}

fn expired_labels(sessions: &[TableSession], now: DateTime<Utc>) -> Vec<String> {
    sessions
        .iter()
        .filter(|s| s.is_expired_at(now))
        .map(|s| s.table_label.clone())
        .collect()
}
