//! Customer surface
//!
//! What a guest sees after scanning their table's code. The surface keeps
//! its own copy of the session, re-fetched from the store on a fixed
//! interval so a manual end by staff shows up without a reload, and a local
//! one-second tick that notices when the time runs out.
//!
//! Views, checked in order:
//! 1. unknown session → not found
//! 2. ended by staff, and the local timer has not seen the time run out → ended
//! 3. no time left → finished
//! 4. otherwise → live countdown

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::TableSession;
use crate::services::countdown::{Countdown, CountdownStatus};
use crate::store::SessionStore;

/// Rendered state of the customer page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CustomerView {
    /// No session with this id
    NotFound,
    /// Staff ended the session before it ran out
    #[serde(rename_all = "camelCase")]
    EndedByStaff { table_label: String },
    /// The dining window is over
    #[serde(rename_all = "camelCase")]
    Finished { table_label: String },
    /// Live countdown
    #[serde(rename_all = "camelCase")]
    Countdown {
        table_label: String,
        end_time: DateTime<Utc>,
        minutes: i64,
        seconds: i64,
        status: CountdownStatus,
        progress: f64,
    },
}

impl CustomerView {
    /// Short name of the view, as used in templates
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotFound => "notFound",
            Self::EndedByStaff { .. } => "endedByStaff",
            Self::Finished { .. } => "finished",
            Self::Countdown { .. } => "countdown",
        }
    }
}

/// One customer's view of one session
pub struct CustomerSurface {
    store: SessionStore,
    session_id: String,
    session: Option<TableSession>,
    /// Set once the local tick sees the countdown reach zero
    expiry_observed: bool,
}

impl CustomerSurface {
    /// Create a surface for `session_id` and fetch the session
    pub async fn open(store: SessionStore, session_id: impl Into<String>) -> Self {
        let mut surface = Self {
            store,
            session_id: session_id.into(),
            session: None,
            expiry_observed: false,
        };
        surface.refresh().await;
        surface
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session(&self) -> Option<&TableSession> {
        self.session.as_ref()
    }

    /// Re-fetch the session from the store
    ///
    /// A session that disappears from the store keeps the last known copy,
    /// matching a page that simply fails to find fresher data.
    pub async fn refresh(&mut self) {
        if let Some(session) = self.store.find(&self.session_id).await {
            self.session = Some(session);
        }
    }

    /// Local one-second tick
    ///
    /// Only a live countdown can observe expiry; a session already ended by
    /// staff shows no timer and therefore never flips to finished.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.expiry_observed {
            return;
        }
        if let Some(session) = &self.session {
            if session.active && now >= session.end_time {
                self.expiry_observed = true;
            }
        }
    }

    /// Derive the view at `now`
    pub fn view(&self, now: DateTime<Utc>) -> CustomerView {
        let Some(session) = &self.session else {
            return CustomerView::NotFound;
        };

        if !session.active && !self.expiry_observed {
            return CustomerView::EndedByStaff {
                table_label: session.table_label.clone(),
            };
        }

        let countdown = Countdown::for_session(now, session);
        if countdown.is_expired() {
            return CustomerView::Finished {
                table_label: session.table_label.clone(),
            };
        }

        CustomerView::Countdown {
            table_label: session.table_label.clone(),
            end_time: session.end_time,
            minutes: countdown.minutes,
            seconds: countdown.seconds,
            status: countdown.status,
            progress: countdown.progress,
        }
    }
}

/// Resolve the view a freshly loaded customer page shows at `now`
pub async fn resolve_view(store: SessionStore, session_id: &str, now: DateTime<Utc>) -> CustomerView {
    let mut surface = CustomerSurface::open(store, session_id).await;
    surface.tick(now);
    surface.view(now)
}
