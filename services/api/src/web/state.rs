//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::config::Config;
use chrono::{DateTime, Utc};
use doc_chat_core::{
    ChatSession, CompletionService, ExtractionDispatcher, LoadedDocument, NoTruncation,
    PromptAssembler, RecentTurns, ReplacePolicy, TruncationPolicy,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: ExtractionDispatcher,
    pub completion: Arc<dyn CompletionService>,
    pub assembler: PromptAssembler,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        extractor: ExtractionDispatcher,
        completion: Arc<dyn CompletionService>,
    ) -> Self {
        let policy: Arc<dyn TruncationPolicy> = match config.history_turn_limit {
            Some(max_turns) => Arc::new(RecentTurns { max_turns }),
            None => Arc::new(NoTruncation),
        };
        Self {
            config,
            extractor,
            completion,
            assembler: PromptAssembler::new(policy),
            sessions: Arc::new(SessionRegistry::default()),
        }
    }

    pub fn replace_policy(&self) -> ReplacePolicy {
        if self.config.reset_history_on_upload {
            ReplacePolicy::ResetHistory
        } else {
            ReplacePolicy::KeepHistory
        }
    }
}

//=========================================================================================
// SessionState (Specific to One Uploaded Document)
//=========================================================================================

/// The state of one chat: the document being discussed and the turns so far.
pub struct SessionState {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub chat: ChatSession,
}

impl SessionState {
    pub fn new(session_id: Uuid, document: LoadedDocument) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            created_at: now,
            last_accessed_at: now,
            chat: ChatSession::with_document(document),
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    /// How long the session has gone untouched as of `now`.
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_accessed_at).to_std().unwrap_or_default()
    }
}

/// In-memory sessions keyed by id. Nothing survives a restart.
///
/// Each session sits behind its own mutex, so a conversation is only ever
/// written by one request at a time.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<SessionState>>>>,
}

impl SessionRegistry {
    pub async fn insert(&self, state: SessionState) -> Uuid {
        let session_id = state.session_id;
        self.sessions
            .write()
            .await
            .insert(session_id, Arc::new(Mutex::new(state)));
        session_id
    }

    pub async fn get(&self, session_id: Uuid) -> Option<Arc<Mutex<SessionState>>> {
        self.sessions.read().await.get(&session_id).cloned()
    }

    pub async fn remove(&self, session_id: Uuid) -> bool {
        self.sessions.write().await.remove(&session_id).is_some()
    }

    /// Drops every session idle for at least `max_idle` and returns how many went.
    ///
    /// A session whose lock is held is in use and is never evicted.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(state) => state.idle_for(now) < max_idle,
            Err(_) => true,
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Periodically evicts sessions that have been idle for `max_idle`.
pub fn spawn_idle_sweeper(
    sessions: Arc<SessionRegistry>,
    max_idle: Duration,
) -> tokio::task::JoinHandle<()> {
    let period = max_idle.min(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = sessions.evict_idle(max_idle).await;
            if evicted > 0 {
                let remaining = sessions.len().await;
                info!(evicted, remaining, "Evicted idle sessions");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_chat_core::{DocumentFormat, ExtractedText};

    fn session(idle: chrono::Duration) -> SessionState {
        let document = LoadedDocument {
            name: "sky.txt".to_string(),
            format: DocumentFormat::Txt,
            text: ExtractedText::new("The sky is blue."),
        };
        let mut state = SessionState::new(Uuid::new_v4(), document);
        state.last_accessed_at = Utc::now() - idle;
        state
    }

    #[test]
    fn idle_time_is_measured_from_the_last_access() {
        let state = session(chrono::Duration::seconds(90));
        assert!(state.idle_for(Utc::now()) >= Duration::from_secs(90));

        let mut fresh = session(chrono::Duration::zero());
        fresh.touch();
        assert!(fresh.idle_for(Utc::now()) < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_and_active_ones_kept() {
        let registry = SessionRegistry::default();
        let stale = registry.insert(session(chrono::Duration::minutes(30))).await;
        let active = registry.insert(session(chrono::Duration::seconds(1))).await;

        let evicted = registry.evict_idle(Duration::from_secs(600)).await;

        assert_eq!(evicted, 1);
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(stale).await.is_none());
        assert!(registry.get(active).await.is_some());
    }

    #[tokio::test]
    async fn a_session_in_use_is_not_evicted() {
        let registry = SessionRegistry::default();
        let id = registry.insert(session(chrono::Duration::hours(2))).await;
        let busy = registry.get(id).await.unwrap();
        let _guard = busy.lock().await;

        assert_eq!(registry.evict_idle(Duration::from_secs(60)).await, 0);
        assert!(!registry.is_empty().await);
    }

    #[tokio::test]
    async fn removed_sessions_are_gone() {
        let registry = SessionRegistry::default();
        let id = registry.insert(session(chrono::Duration::zero())).await;

        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(registry.is_empty().await);
    }
}
