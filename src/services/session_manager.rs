// src/services/session_manager.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::session_codec::SessionRecord;

#[derive(Clone, Debug)]
pub struct Session {
    pub records: Vec<SessionRecord>,
    pub last_active: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self { records: Vec::new(), last_active: Instant::now() }
    }
}

/// Server side of the cookie session: the cookie carries the id, this holds
/// the stored transcript.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    // Create a fresh session and return its id.
    pub async fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let mut guard = self.inner.write().await;
        guard.insert(id.clone(), Session::default());
        id
    }

    // Ensure there's a session with this id; an id that expired comes back empty.
    pub async fn ensure_session(&self, id: &str) -> String {
        {
            let guard = self.inner.read().await;
            if guard.contains_key(id) {
                return id.to_string();
            }
        }
        let mut guard = self.inner.write().await;
        guard.entry(id.to_string()).or_default();
        id.to_string()
    }

    /// Stored records for a session, touching its activity time.
    pub async fn get_records(&self, session_id: &str) -> Option<Vec<SessionRecord>> {
        let mut guard = self.inner.write().await;
        guard.get_mut(session_id).map(|s| {
            s.last_active = Instant::now();
            s.records.clone()
        })
    }

    /// Replace a session's records. Concurrent writers on the same id race; last write wins.
    pub async fn set_records(&self, session_id: &str, records: Vec<SessionRecord>) {
        let mut guard = self.inner.write().await;
        let entry = guard.entry(session_id.to_string()).or_default();
        entry.records = records;
        entry.last_active = Instant::now();
    }

    pub async fn has_records(&self, session_id: &str) -> bool {
        let guard = self.inner.read().await;
        guard.get(session_id).is_some_and(|s| !s.records.is_empty())
    }

    /// Drop all stored records but keep the id.
    pub async fn clear(&self, session_id: &str) {
        self.set_records(session_id, Vec::new()).await;
    }

    /// Remove a session by id
    pub async fn remove_session(&self, session_id: &str) -> bool {
        let mut guard = self.inner.write().await;
        guard.remove(session_id).is_some()
    }

    /// Remove sessions idle longer than ttl. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, s| now.duration_since(s.last_active) < self.ttl);
        before - guard.len()
    }

    /// Number of sessions
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// List session ids
    pub async fn list_session_ids(&self) -> Vec<String> {
        let guard = self.inner.read().await;
        guard.keys().cloned().collect()
    }
}

/// Periodically purge expired sessions until the runtime shuts down.
pub fn spawn_purge_task(sessions: SessionManager, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = sessions.purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "purged expired sessions");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn record(kind: &str, content: &str) -> SessionRecord {
        SessionRecord { kind: kind.to_string(), content: content.to_string() }
    }

    #[tokio::test]
    async fn basic_session_flow() {
        let mgr = SessionManager::new(Duration::from_secs(60));
        let sid = mgr.create_session().await;
        assert!(!sid.is_empty());
        assert!(!mgr.has_records(&sid).await);

        mgr.set_records(&sid, vec![record("HumanMessage", "hello")]).await;
        assert!(mgr.has_records(&sid).await);
        assert_eq!(mgr.get_records(&sid).await.unwrap().len(), 1);

        mgr.clear(&sid).await;
        assert_eq!(mgr.get_records(&sid).await, Some(Vec::new()));
        assert!(mgr.remove_session(&sid).await);
        assert!(mgr.get_records(&sid).await.is_none());
    }

    #[tokio::test]
    async fn ensure_session_keeps_existing_records() {
        let mgr = SessionManager::new(Duration::from_secs(60));
        let sid = mgr.create_session().await;
        mgr.set_records(&sid, vec![record("SystemMessage", "oracle")]).await;

        assert_eq!(mgr.ensure_session(&sid).await, sid);
        assert!(mgr.has_records(&sid).await);

        mgr.ensure_session("stale-id").await;
        assert_eq!(mgr.get_records("stale-id").await, Some(Vec::new()));
        assert_eq!(mgr.len().await, 2);
    }
}
