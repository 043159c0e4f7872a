//! Expiry sweeper.
//!
//! Periodically evicts sessions whose idle time passed the threshold. An
//! evicted id behaves exactly like an explicitly stopped one: later requests
//! fail as not-found.

use osce_core::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info};

/// Spawn the background sweep task.
///
/// Eviction is best effort and never surfaces an error to clients. The
/// returned handle lets the caller abort the task on shutdown.
pub fn spawn(
    sessions: Arc<SessionStore>,
    sweep_interval: Duration,
    idle_timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(sweep_interval);

        loop {
            tick.tick().await;

            let evicted = sessions.sweep(idle_timeout).await;
            if evicted.is_empty() {
                continue;
            }

            for session_id in &evicted {
                debug!(session_id = %session_id, "evicted idle session");
            }
            info!(
                evicted = evicted.len(),
                idle_timeout_secs = idle_timeout.as_secs(),
                "idle sessions evicted"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use osce_core::types::VoiceGender;

    #[tokio::test]
    async fn test_sweeper_evicts_idle_sessions() {
        let sessions = Arc::new(SessionStore::new());
        let id = sessions
            .create(VoiceGender::Male, "chest-pain-01", "sys".to_string())
            .await;

        let handle = spawn(
            Arc::clone(&sessions),
            Duration::from_millis(20),
            Duration::from_millis(60),
        );

        // idle threshold plus at most one extra sweep interval
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(sessions.get(&id).await.is_none());
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_keeps_fresh_sessions() {
        let sessions = Arc::new(SessionStore::new());
        let id = sessions
            .create(VoiceGender::Male, "chest-pain-01", "sys".to_string())
            .await;

        let handle = spawn(
            Arc::clone(&sessions),
            Duration::from_millis(20),
            Duration::from_secs(60),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(sessions.get(&id).await.is_some());
        handle.abort();
    }
}
