//! Notification deriver
//!
//! Scans the session list on every console tick and raises one alert per
//! expiry. Alerts are keyed by `(session id, end time)`; a key stays recorded
//! for the lifetime of the deriver, so dismissing an alert never brings it
//! back. The record is in memory only and starts empty after a restart.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{Notification, TableSession};

/// Detects newly expired sessions and queues alerts for staff
#[derive(Debug, Default)]
pub struct NotificationDeriver {
    /// Dedup keys of every expiry already alerted
    seen: HashSet<String>,
    /// Alerts waiting for staff acknowledgement, oldest first
    pending: Vec<Notification>,
}

impl NotificationDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dedup key for one expiry of one session
    pub fn dedup_key(session: &TableSession) -> String {
        format!("{}-{}", session.id, session.end_time.timestamp_millis())
    }

    /// Scan `sessions` at `now` and queue alerts for new expiries
    ///
    /// Returns the alerts created by this tick.
    pub fn tick(&mut self, sessions: &[TableSession], now: DateTime<Utc>) -> Vec<Notification> {
        let mut created = Vec::new();

        for session in sessions.iter().filter(|s| s.is_expired_at(now)) {
            if !self.seen.insert(Self::dedup_key(session)) {
                continue;
            }

            let notification = Notification {
                id: Uuid::new_v4().to_string(),
                table_label: session.table_label.clone(),
                message: format!("Dining time for table {} has ended!", session.table_label),
                timestamp: now,
            };
            tracing::info!(
                session_id = %session.id,
                table = %session.table_label,
                "Table time expired"
            );
            created.push(notification);
        }

        self.pending.extend(created.iter().cloned());
        created
    }

    /// Alerts waiting for acknowledgement, oldest first
    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    /// The alert the console should show now
    pub fn current(&self) -> Option<&Notification> {
        self.pending.first()
    }

    /// Acknowledge one alert
    ///
    /// Returns `false` if no pending alert has that id.
    pub fn dismiss(&mut self, notification_id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|n| n.id != notification_id);
        self.pending.len() != before
    }

    /// Acknowledge every pending alert
    pub fn clear_all(&mut self) {
        self.pending.clear();
    }

    /// Whether an expiry has already been alerted
    pub fn has_seen(&self, session: &TableSession) -> bool {
        self.seen.contains(&Self::dedup_key(session))
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(30))]

        /// Any run of ticks after expiry yields exactly one alert, even with
        /// acknowledgements in between
        #[test]
        fn exactly_one_alert_per_expiry(
            offsets in proptest::collection::vec(0i64..100_000, 1..20),
            dismiss_mask in proptest::collection::vec(any::<bool>(), 20),
        ) {
            let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
            let session = TableSession::start("a", "12", start);
            let mut deriver = NotificationDeriver::new();
            let mut total = 0;

            for (i, offset) in offsets.iter().enumerate() {
                let now = session.end_time + Duration::seconds(*offset);
                total += deriver.tick(std::slice::from_ref(&session), now).len();
                if dismiss_mask[i] {
                    deriver.clear_all();
                }
            }

            prop_assert_eq!(total, 1);
        }
    }
}
