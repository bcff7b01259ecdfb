//! Session store
//!
//! Typed access to the two persisted entries:
//! - `restaurant_sessions`: every table session ever issued (history is kept)
//! - `admin_session`: the staff login flag
//!
//! Reads never fail. Missing or malformed data is logged and treated as
//! absent, and write failures are logged and swallowed, so neither surface
//! can be taken down by a damaged store.

use chrono::{DateTime, Utc};

use super::DynKeyValueStore;
use crate::models::{AdminSession, TableSession};

/// Key holding the JSON array of table sessions
pub const SESSIONS_KEY: &str = "restaurant_sessions";

/// Key holding the admin login flag
pub const ADMIN_KEY: &str = "admin_session";

/// Typed wrapper over the key-value store
#[derive(Clone)]
pub struct SessionStore {
    kv: DynKeyValueStore,
}

impl SessionStore {
    /// Create a session store on top of a key-value store
    pub fn new(kv: DynKeyValueStore) -> Self {
        Self { kv }
    }

    /// Load all table sessions
    ///
    /// Returns an empty list when nothing is stored or the stored blob
    /// cannot be parsed.
    pub async fn load(&self) -> Vec<TableSession> {
        let raw = match self.kv.get(SESSIONS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read stored sessions, starting empty: {:#}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("Error parsing stored sessions, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Find one table session by id
    pub async fn find(&self, id: &str) -> Option<TableSession> {
        self.load().await.into_iter().find(|s| s.id == id)
    }

    /// Replace the stored session list
    pub async fn save(&self, sessions: &[TableSession]) {
        let json = match serde_json::to_string(sessions) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Error encoding sessions: {}", e);
                return;
            }
        };

        if let Err(e) = self.kv.set(SESSIONS_KEY, &json).await {
            tracing::error!("Error storing sessions: {:#}", e);
        }
    }

    /// Check the admin flag at `now`
    ///
    /// A flag older than the admin session lifetime, or one that cannot be
    /// parsed, counts as absent and is erased.
    pub async fn is_admin_authenticated(&self, now: DateTime<Utc>) -> bool {
        let raw = match self.kv.get(ADMIN_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Failed to read admin session: {:#}", e);
                return false;
            }
        };

        let session: AdminSession = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Discarding malformed admin session: {}", e);
                self.end_admin_session().await;
                return false;
            }
        };

        if session.is_expired_at(now) {
            tracing::info!("Admin session from {} expired", session.created_at);
            self.end_admin_session().await;
            return false;
        }

        true
    }

    /// Store a fresh admin flag created at `now`
    pub async fn begin_admin_session(&self, now: DateTime<Utc>) {
        let session = AdminSession::new(now);
        let json = match serde_json::to_string(&session) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Error encoding admin session: {}", e);
                return;
            }
        };

        if let Err(e) = self.kv.set(ADMIN_KEY, &json).await {
            tracing::error!("Error storing admin session: {:#}", e);
        }
    }

    /// Remove the admin flag
    pub async fn end_admin_session(&self) {
        if let Err(e) = self.kv.remove(ADMIN_KEY).await {
            tracing::error!("Error clearing admin session: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, KeyValueStore, MemoryStore};
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    fn setup() -> (Arc<MemoryStore>, SessionStore) {
        let kv = Arc::new(MemoryStore::new());
        let store = SessionStore::new(kv.clone());
        (kv, store)
    }

    #[tokio::test]
    async fn test_load_empty_store() {
        let (_kv, store) = setup();

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_blob_returns_empty() {
        let (kv, store) = setup();
        kv.set(SESSIONS_KEY, "[{\"id\": 42").await.unwrap();

        assert!(store.load().await.is_empty());

        kv.set(SESSIONS_KEY, "{\"not\": \"a list\"}").await.unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let (_kv, store) = setup();
        let mut ended = TableSession::start("b", "A3", at(9, 15));
        ended.active = false;
        let sessions = vec![TableSession::start("a", "12", at(10, 0)), ended];

        store.save(&sessions).await;

        assert_eq!(store.load().await, sessions);
        assert_eq!(store.find("b").await, Some(sessions[1].clone()));
        assert_eq!(store.find("zzz").await, None);
    }

    #[tokio::test]
    async fn test_persisted_layout_uses_iso_timestamps() {
        let (kv, store) = setup();
        store.save(&[TableSession::start("a", "12", at(10, 0))]).await;

        let raw = kv.get(SESSIONS_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value[0]["startTime"], "2024-03-01T10:00:00Z");
        assert_eq!(value[0]["endTime"], "2024-03-01T11:30:00Z");
    }

    #[tokio::test]
    async fn test_admin_flag_expires_after_a_day() {
        let (kv, store) = setup();
        let created = at(8, 0);

        assert!(!store.is_admin_authenticated(created).await);

        store.begin_admin_session(created).await;
        assert!(store
            .is_admin_authenticated(created + Duration::hours(23) + Duration::minutes(59))
            .await);

        assert!(!store
            .is_admin_authenticated(created + Duration::hours(24) + Duration::minutes(1))
            .await);
        // Erased as a side effect of the expired read
        assert_eq!(kv.get(ADMIN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_end_admin_session() {
        let (_kv, store) = setup();

        store.begin_admin_session(at(8, 0)).await;
        store.end_admin_session().await;

        assert!(!store.is_admin_authenticated(at(8, 1)).await);
    }

    #[tokio::test]
    async fn test_corrupt_store_file_reads_as_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ garbage").unwrap();
        let store = SessionStore::new(Arc::new(FileStore::new(&path)));

        assert!(store.load().await.is_empty());
        assert_eq!(store.find("a").await, None);
        assert!(!store.is_admin_authenticated(at(8, 0)).await);

        // The next save replaces the damaged file
        let sessions = vec![TableSession::start("a", "12", at(10, 0))];
        store.save(&sessions).await;
        assert_eq!(store.load().await, sessions);
        assert!(std::fs::read_to_string(&path).unwrap().contains(SESSIONS_KEY));
    }

    #[tokio::test]
    async fn test_malformed_admin_flag_is_erased() {
        let (kv, store) = setup();
        kv.set(ADMIN_KEY, "garbage").await.unwrap();

        assert!(!store.is_admin_authenticated(at(8, 0)).await);
        assert_eq!(kv.get(ADMIN_KEY).await.unwrap(), None);
    }
}
