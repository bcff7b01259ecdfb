//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One-shot alert raised when an active table runs out of time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub table_label: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
