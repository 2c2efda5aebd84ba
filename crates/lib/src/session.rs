//! # Session Registry
//!
//! The only process-wide mutable structure. Sessions are keyed by
//! `(user_id, session_id)`; lookup-or-create happens under a single write lock so
//! two concurrent callers for the same key always receive the same session.
//! Each session's state sits behind its own mutex, which a run holds for its whole
//! duration.

use crate::{constants::APP_NAME, state::StateStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(user_id: &str, session_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        }
    }

    /// The session a user's audits run in.
    pub fn for_user(user_id: &str) -> Self {
        Self::new(user_id, &derive_session_id(user_id))
    }
}

pub fn derive_session_id(user_id: &str) -> String {
    format!("seo_session_{user_id}")
}

#[derive(Debug)]
pub struct Session {
    pub app_name: &'static str,
    pub key: SessionKey,
    pub state: StateStore,
    pub runs: u64,
}

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug, Default, Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionKey, SharedSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &SessionKey) -> Option<SharedSession> {
        self.sessions.read().await.get(key).cloned()
    }

    /// Returns the session for `key`, creating it with `init` if it does not exist.
    pub async fn get_or_create(
        &self,
        key: &SessionKey,
        init: impl FnOnce() -> StateStore,
    ) -> SharedSession {
        if let Some(session) = self.get(key).await {
            return session;
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(key.clone())
            .or_insert_with(|| {
                info!(
                    "[session] Creating session '{}' for user '{}'.",
                    key.session_id, key.user_id
                );
                Arc::new(Mutex::new(Session {
                    app_name: APP_NAME,
                    key: key.clone(),
                    state: init(),
                    runs: 0,
                }))
            })
            .clone()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_is_derived_from_user() {
        let key = SessionKey::for_user("demo_user");
        assert_eq!(key.session_id, "seo_session_demo_user");
        assert_eq!(key.user_id, "demo_user");
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_existing_session() {
        let registry = SessionRegistry::new();
        let key = SessionKey::for_user("alice");
        let first = registry
            .get_or_create(&key, || StateStore::for_target("https://a.example"))
            .await;
        let second = registry
            .get_or_create(&key, || StateStore::for_target("https://b.example"))
            .await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
        let session = second.lock().await;
        assert_eq!(session.state.target_url(), Some("https://a.example"));
        assert_eq!(session.app_name, APP_NAME);
    }
}
