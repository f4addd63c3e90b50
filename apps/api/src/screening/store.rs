//! In-memory session store. Sessions live only as long as the process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use crate::screening::conversation::ConversationSession;

/// Each session sits behind its own mutex, held for a whole turn, so two requests
/// against one session run one after the other.
pub type SessionHandle = Arc<Mutex<ConversationSession>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and starts a session. Returns its id and the greeting.
    pub async fn create(&self) -> (Uuid, String) {
        let mut session = ConversationSession::new();
        let greeting = session.start();
        let id = session.id;

        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));

        info!("Session {id} created");
        (id, greeting)
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Replaces the session with a brand-new one under the same id.
    /// Waits for any turn in flight, then overwrites the session in place, so every
    /// holder of the handle sees the fresh state.
    /// Returns the new greeting, or `None` when the id is unknown.
    pub async fn reset(&self, id: Uuid) -> Option<String> {
        let handle = self.get(id).await?;
        let mut session = handle.lock().await;

        let mut fresh = ConversationSession::with_id(id);
        let greeting = fresh.start();
        *session = fresh;

        info!("Session {id} reset");
        Some(greeting)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Session {id} removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle for at least `idle_ttl` as of `now`.
    /// A session whose lock is held is mid-turn and is never idle.
    pub async fn evict_idle(&self, idle_ttl: Duration, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, handle| {
            let Ok(session) = handle.try_lock() else {
                return true;
            };
            let expired = (now - session.last_active_at())
                .to_std()
                .is_ok_and(|idle| idle >= idle_ttl);
            if expired {
                info!("Session {id} expired after inactivity");
            }
            !expired
        });

        before - sessions.len()
    }

    /// Starts a background task that evicts idle sessions every `period`.
    pub fn spawn_idle_sweeper(&self, idle_ttl: Duration, period: Duration) {
        let store = self.clone();

        tokio::spawn(async move {
            let mut ticker = interval(period);
            info!(
                "Idle session sweeper started (ttl {}s, every {}s)",
                idle_ttl.as_secs(),
                period.as_secs()
            );

            loop {
                ticker.tick().await;
                let expired = store.evict_idle(idle_ttl, Utc::now()).await;
                if expired > 0 {
                    debug!("Evicted {expired} idle sessions");
                }
            }
        });
    }
}
