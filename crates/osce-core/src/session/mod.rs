//! In-memory interview sessions.
//!
//! The store maps session ids to independently lockable sessions. The registry
//! lock is held only to insert, look up, or remove entries; each session's own
//! lock serializes the turns of a single conversation, so long upstream calls
//! for one session never block another.

pub mod lifecycle;

pub use lifecycle::SessionState;

use crate::types::{Role, Turn, VoiceGender};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// One voice interview in progress.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub voice: VoiceGender,
    pub case_reference: String,
    pub created_at: DateTime<Utc>,
    state: SessionState,
    transcript: Vec<Turn>,
    last_activity: Instant,
}

impl Session {
    fn new(
        id: String,
        voice: VoiceGender,
        case_reference: &str,
        system_instruction: String,
    ) -> Self {
        Self {
            id,
            voice,
            case_reference: case_reference.to_string(),
            created_at: Utc::now(),
            state: SessionState::Initialized,
            transcript: vec![Turn::system(system_instruction)],
            last_activity: Instant::now(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Full transcript including the hidden system instruction.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Spoken turns only. The system instruction never leaves the server.
    pub fn history(&self) -> Vec<Turn> {
        self.transcript
            .iter()
            .filter(|t| t.role != Role::System)
            .cloned()
            .collect()
    }

    /// Record the trainee's transcribed question.
    pub fn push_user(&mut self, content: &str) {
        self.transcript.push(Turn::user(content));
        self.touch();
    }

    /// Record the patient's reply.
    pub fn push_assistant(&mut self, content: &str) {
        self.transcript.push(Turn::assistant(content));
        self.touch();
    }

    /// Reset the idle clock.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Time since the last state-changing operation. Reads do not reset it.
    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }
}

/// Registry of live sessions keyed by id.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session bound to a case and return its id.
    pub async fn create(
        &self,
        voice: VoiceGender,
        case_reference: &str,
        system_instruction: String,
    ) -> String {
        let mut sessions = self.sessions.write().await;
        let id = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        let session = Session::new(id.clone(), voice, case_reference, system_instruction);
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        debug!(session_id = %id, case = %case_reference, "session created");
        id
    }

    /// Look up a live session. Does not reset the idle clock.
    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session. Returns false when the id is unknown; removing twice
    /// is not an error.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Evict sessions idle for at least `idle_threshold` and return their ids.
    ///
    /// A session whose lock is held has a turn in flight; it is skipped and
    /// picked up by a later sweep.
    pub async fn sweep(&self, idle_threshold: Duration) -> Vec<String> {
        let mut sessions = self.sessions.write().await;

        let expired: Vec<String> = sessions
            .iter()
            .filter_map(|(id, slot)| {
                let session = slot.try_lock().ok()?;
                (session.idle_for() >= idle_threshold).then(|| id.clone())
            })
            .collect();

        for id in &expired {
            sessions.remove(id);
        }
        expired
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn seeded(store: &SessionStore) -> String {
        store
            .create(VoiceGender::Male, "chest-pain-01", "You are a patient.".to_string())
            .await
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let store = SessionStore::new();
        let mut ids = HashSet::new();
        for _ in 0..50 {
            ids.insert(seeded(&store).await);
        }
        assert_eq!(ids.len(), 50);
        assert_eq!(store.len().await, 50);
    }

    #[tokio::test]
    async fn test_new_session_starts_with_system_turn_only() {
        let store = SessionStore::new();
        let id = seeded(&store).await;

        let slot = store.get(&id).await.unwrap();
        let session = slot.lock().await;
        assert_eq!(session.state(), SessionState::Initialized);
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::System);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let store = SessionStore::new();
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = SessionStore::new();
        let id = seeded(&store).await;

        assert!(store.remove(&id).await);
        assert!(!store.remove(&id).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_reads_do_not_reset_idle_clock() {
        let store = SessionStore::new();
        let id = seeded(&store).await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        let slot = store.get(&id).await.unwrap();
        let mut session = slot.lock().await;
        let _ = session.history();
        assert!(session.idle_for() >= Duration::from_millis(80));

        session.push_user("Hello?");
        assert!(session.idle_for() < Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_sweep_evicts_only_idle_sessions() {
        let store = SessionStore::new();
        let old_id = seeded(&store).await;
        let fresh_id = seeded(&store).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        store.get(&fresh_id).await.unwrap().lock().await.touch();

        let evicted = store.sweep(Duration::from_millis(50)).await;
        assert_eq!(evicted, vec![old_id.clone()]);
        assert!(store.get(&old_id).await.is_none());
        assert!(store.get(&fresh_id).await.is_some());
    }

    #[tokio::test]
    async fn test_sweep_skips_sessions_in_use() {
        let store = SessionStore::new();
        let id = seeded(&store).await;
        let slot = store.get(&id).await.unwrap();
        let guard = slot.lock().await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(store.sweep(Duration::from_millis(50)).await.is_empty());
        assert_eq!(store.len().await, 1);

        drop(guard);
        let evicted = store.sweep(Duration::from_millis(50)).await;
        assert_eq!(evicted, vec![id]);
        assert!(store.is_empty().await);
    }
}
