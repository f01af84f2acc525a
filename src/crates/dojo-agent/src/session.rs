//! In-memory sessions with an idle timeout
//!
//! Used by agents that keep conversation state per session rather than in a
//! checkpoint store. A session is identified by application name, user id and
//! session (thread) id, and is dropped once it has been idle longer than the
//! configured timeout. Expiry is checked whenever a session is accessed, and
//! [`SessionService::spawn_sweeper`] removes idle sessions nobody touches.

use crate::state::StateSchema;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default idle timeout (one hour)
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

struct SessionEntry<S> {
    state: S,
    last_access: Instant,
}

type SessionMap<S> = HashMap<SessionKey, SessionEntry<S>>;

/// Session store shared by every request; clones share the same sessions.
pub struct SessionService<S: StateSchema> {
    app_name: String,
    user_id: String,
    timeout: Duration,
    sessions: Arc<RwLock<SessionMap<S>>>,
}

impl<S: StateSchema> Clone for SessionService<S> {
    fn clone(&self) -> Self {
        Self {
            app_name: self.app_name.clone(),
            user_id: self.user_id.clone(),
            timeout: self.timeout,
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<S: StateSchema> fmt::Debug for SessionService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("app_name", &self.app_name)
            .field("user_id", &self.user_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<S: StateSchema> SessionService<S> {
    pub fn new(app_name: impl Into<String>, user_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            timeout,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn key(&self, session_id: &str) -> SessionKey {
        SessionKey {
            app_name: self.app_name.clone(),
            user_id: self.user_id.clone(),
            session_id: session_id.to_string(),
        }
    }

    fn is_expired(&self, entry: &SessionEntry<S>, now: Instant) -> bool {
        now.duration_since(entry.last_access) > self.timeout
    }

    /// State of `session_id`, creating an empty session when there is none or
    /// the previous one expired
    pub async fn get_or_create(&self, session_id: &str) -> S {
        let key = self.key(session_id);
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(entry) = sessions.get_mut(&key) {
            if !self.is_expired(entry, now) {
                entry.last_access = now;
                return entry.state.clone();
            }
            tracing::debug!(session = %key, "session expired, starting fresh");
        } else {
            tracing::debug!(session = %key, "creating session");
        }

        sessions.insert(
            key,
            SessionEntry {
                state: S::default(),
                last_access: now,
            },
        );
        S::default()
    }

    pub async fn save(&self, session_id: &str, state: S) {
        let key = self.key(session_id);
        self.sessions.write().await.insert(
            key,
            SessionEntry {
                state,
                last_access: Instant::now(),
            },
        );
    }

    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions
            .write()
            .await
            .remove(&self.key(session_id))
            .is_some()
    }

    /// Sessions currently held, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop every idle session, returning how many were removed
    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "evicted idle sessions");
        }
        evicted
    }

    /// Sweep idle sessions every `period` until the service is dropped
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let weak: Weak<RwLock<SessionMap<S>>> = Arc::downgrade(&self.sessions);
        let app_name = self.app_name.clone();
        let user_id = self.user_id.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(sessions) = weak.upgrade() else {
                    break;
                };
                let service = SessionService {
                    app_name: app_name.clone(),
                    user_id: user_id.clone(),
                    timeout,
                    sessions,
                };
                service.evict_expired().await;
            }
            tracing::debug!("session sweeper stopped");
        })
    }
}
