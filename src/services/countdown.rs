//! Countdown engine
//!
//! Pure derivation of what a timer shows at a given instant. Callers invoke
//! it from a fixed-interval driver with the current wall-clock time; nothing
//! here keeps a running counter, so a late or skipped tick never
//! accumulates error.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TableSession;

/// Remaining time at or below which the timer turns to warning
pub const WARNING_THRESHOLD_MINUTES: i64 = 15;

/// Remaining time at or below which the timer turns critical
pub const CRITICAL_THRESHOLD_MINUTES: i64 = 5;

/// Display state of a running timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownStatus {
    Normal,
    Warning,
    Critical,
    Expired,
}

impl CountdownStatus {
    /// Classify a non-negative remaining duration
    pub fn classify(remaining: Duration) -> Self {
        if remaining <= Duration::zero() {
            Self::Expired
        } else if remaining <= Duration::minutes(CRITICAL_THRESHOLD_MINUTES) {
            Self::Critical
        } else if remaining <= Duration::minutes(WARNING_THRESHOLD_MINUTES) {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}

impl std::fmt::Display for CountdownStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Timer state derived from `(now, end_time)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    /// Remaining time in milliseconds, never negative
    pub remaining_ms: i64,
    /// Whole minutes of the remaining time
    pub minutes: i64,
    /// Seconds past the whole minutes
    pub seconds: i64,
    pub status: CountdownStatus,
    /// Elapsed share of the full window, in [0, 1]
    pub progress: f64,
}

impl Countdown {
    /// Derive the countdown for a window ending at `end_time`
    pub fn at(now: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        let remaining = (end_time - now).max(Duration::zero());
        let remaining_ms = remaining.num_milliseconds();

        let total = TableSession::duration();
        let elapsed_ms = (total - remaining).num_milliseconds();
        let progress = (elapsed_ms as f64 / total.num_milliseconds() as f64).clamp(0.0, 1.0);

        Self {
            remaining_ms,
            minutes: remaining_ms / 60_000,
            seconds: (remaining_ms % 60_000) / 1000,
            status: CountdownStatus::classify(remaining),
            progress,
        }
    }

    /// Derive the countdown for a session
    pub fn for_session(now: DateTime<Utc>, session: &TableSession) -> Self {
        Self::at(now, session.end_time)
    }

    pub fn is_expired(&self) -> bool {
        self.status == CountdownStatus::Expired
    }

    /// `m:ss`, or `Finished` once the time is up
    pub fn display(&self) -> String {
        if self.is_expired() {
            "Finished".to_string()
        } else {
            format!("{}:{:02}", self.minutes, self.seconds)
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Classification depends only on the remaining time
        #[test]
        fn classification_matches_remaining(offset_ms in -10_000_000i64..10_000_000) {
            let end = Utc.with_ymd_and_hms(2024, 3, 1, 11, 30, 0).unwrap();
            let now = end - Duration::milliseconds(offset_ms);
            let countdown = Countdown::at(now, end);
            let remaining = offset_ms.max(0);

            let expected = if remaining == 0 {
                CountdownStatus::Expired
            } else if remaining <= 5 * 60_000 {
                CountdownStatus::Critical
            } else if remaining <= 15 * 60_000 {
                CountdownStatus::Warning
            } else {
                CountdownStatus::Normal
            };

            prop_assert_eq!(countdown.remaining_ms, remaining);
            prop_assert_eq!(countdown.status, expected);
            prop_assert!((0.0..=1.0).contains(&countdown.progress));
        }

        /// Progress never decreases as time moves forward
        #[test]
        fn progress_is_monotonic(a in 0i64..8_000_000, b in 0i64..8_000_000) {
            let end = Utc.with_ymd_and_hms(2024, 3, 1, 11, 30, 0).unwrap();
            let start = end - Duration::minutes(90);
            let (early, late) = if a <= b { (a, b) } else { (b, a) };

            let p1 = Countdown::at(start + Duration::milliseconds(early), end).progress;
            let p2 = Countdown::at(start + Duration::milliseconds(late), end).progress;

            prop_assert!(p1 <= p2);
        }
    }
}
