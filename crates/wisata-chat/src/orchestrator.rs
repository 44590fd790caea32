//! Chat orchestrator: the session store in front of the dialogue router.
//!
//! Every session owns its own `ConversationState` behind an async mutex, so
//! turns on one session run one at a time while sessions never share state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::context::{ClearFlow, ConversationState};
use crate::error::ChatError;
use crate::explorer::{CityExplorer, CityProfile};
use crate::router::DialogueRouter;
use crate::types::{ChatEntry, Intent};

/// Result of one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub session_id: Uuid,
    pub intent: Intent,
    pub city: Option<String>,
    /// Entries appended after the user's entry this turn.
    pub entries: Vec<ChatEntry>,
    /// Full history after the turn.
    pub history: Vec<ChatEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub message_count: usize,
    pub last_city: Option<String>,
    pub pending_clear: bool,
}

struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: Mutex<DateTime<Utc>>,
    state: tokio::sync::Mutex<ConversationState>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active: Mutex::new(now),
            state: tokio::sync::Mutex::new(ConversationState::new()),
        }
    }

    fn last_active(&self) -> DateTime<Utc> {
        self.last_active
            .lock()
            .map(|t| *t)
            .unwrap_or(self.created_at)
    }

    fn touch(&self) {
        if let Ok(mut t) = self.last_active.lock() {
            *t = Utc::now();
        }
    }
}

pub struct ChatOrchestrator {
    router: DialogueRouter,
    explorer: CityExplorer,
    sessions: Mutex<HashMap<Uuid, Arc<Session>>>,
    session_timeout_minutes: u32,
}

impl ChatOrchestrator {
    /// `session_timeout_minutes == 0` keeps sessions until deleted.
    pub fn new(router: DialogueRouter, explorer: CityExplorer, session_timeout_minutes: u32) -> Self {
        Self {
            router,
            explorer,
            sessions: Mutex::new(HashMap::new()),
            session_timeout_minutes,
        }
    }

    pub fn router(&self) -> &DialogueRouter {
        &self.router
    }

    /// Start an empty session and return its id.
    pub fn create_session(&self) -> Result<Uuid, ChatError> {
        let session = Arc::new(Session::new());
        let id = session.id;
        self.lock_sessions()?.insert(id, session);
        info!(session_id = %id, "session created");
        Ok(id)
    }

    /// Run one turn. An unknown or expired `session_id` starts a new
    /// session; invalid messages are rejected before any session exists.
    pub async fn handle_message(
        &self,
        message: &str,
        session_id: Option<Uuid>,
    ) -> Result<ChatReply, ChatError> {
        self.router.validate(message)?;

        let session = self.resolve_session(session_id)?;
        let mut state = session.state.lock().await;
        let outcome = self.router.handle_turn(&mut state, message).await?;
        session.touch();

        Ok(ChatReply {
            session_id: session.id,
            intent: outcome.intent,
            city: outcome.city,
            entries: outcome.entries,
            history: state.history.clone(),
        })
    }

    pub async fn history(&self, session_id: Uuid) -> Result<Vec<ChatEntry>, ChatError> {
        let session = self.session(session_id)?;
        let state = session.state.lock().await;
        Ok(state.history.clone())
    }

    /// Summaries of all live sessions, oldest first.
    pub async fn list_sessions(&self) -> Vec<SessionSummary> {
        let sessions: Vec<Arc<Session>> = match self.sweep_expired() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => return vec![],
        };

        let mut summaries = Vec::with_capacity(sessions.len());
        for session in sessions {
            let state = session.state.lock().await;
            summaries.push(SessionSummary {
                id: session.id,
                created_at: session.created_at,
                last_active_at: session.last_active(),
                message_count: state.history.len(),
                last_city: state.last_city.clone(),
                pending_clear: state.is_clear_pending(),
            });
        }
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }

    pub fn delete_session(&self, session_id: Uuid) -> Result<(), ChatError> {
        match self.lock_sessions()?.remove(&session_id) {
            Some(_) => {
                info!(session_id = %session_id, "session deleted");
                Ok(())
            }
            None => Err(ChatError::SessionNotFound(session_id)),
        }
    }

    pub async fn request_clear(&self, session_id: Uuid) -> Result<ClearFlow, ChatError> {
        let session = self.session(session_id)?;
        let mut state = session.state.lock().await;
        state.request_clear();
        Ok(state.clear_flow())
    }

    /// Confirm a pending clear; errors with `NoPendingClear` otherwise.
    pub async fn confirm_clear(&self, session_id: Uuid) -> Result<Vec<ChatEntry>, ChatError> {
        let session = self.session(session_id)?;
        let mut state = session.state.lock().await;
        if !state.confirm_clear() {
            return Err(ChatError::NoPendingClear);
        }
        debug!(session_id = %session_id, "history cleared");
        Ok(state.history.clone())
    }

    pub async fn cancel_clear(&self, session_id: Uuid) -> Result<ClearFlow, ChatError> {
        let session = self.session(session_id)?;
        let mut state = session.state.lock().await;
        state.cancel_clear();
        Ok(state.clear_flow())
    }

    /// City lookup box for a session; the city becomes its last city.
    pub async fn explore_city(&self, session_id: Uuid, name: &str) -> Result<CityProfile, ChatError> {
        let session = self.session(session_id)?;
        let mut state = session.state.lock().await;
        let profile = self.explorer.explore(&mut state, name).await?;
        session.touch();
        Ok(profile)
    }

    // -- Private helpers --

    fn lock_sessions(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Arc<Session>>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::SessionStore(format!("session lock poisoned: {e}")))
    }

    /// Drop every expired session and hand back the locked map.
    fn sweep_expired(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Arc<Session>>>, ChatError> {
        let mut sessions = self.lock_sessions()?;
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session));
        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!(dropped, "expired sessions dropped");
        }
        Ok(sessions)
    }

    fn is_expired(&self, session: &Session) -> bool {
        self.session_timeout_minutes > 0
            && Utc::now() - session.last_active()
                > Duration::minutes(i64::from(self.session_timeout_minutes))
    }

    /// Live session by id; an expired one is dropped and reported missing.
    fn session(&self, session_id: Uuid) -> Result<Arc<Session>, ChatError> {
        let mut sessions = self.lock_sessions()?;
        let session = sessions
            .get(&session_id)
            .cloned()
            .ok_or(ChatError::SessionNotFound(session_id))?;
        if self.is_expired(&session) {
            sessions.remove(&session_id);
            debug!(session_id = %session_id, "session expired");
            return Err(ChatError::SessionNotFound(session_id));
        }
        Ok(session)
    }

    fn resolve_session(&self, requested: Option<Uuid>) -> Result<Arc<Session>, ChatError> {
        if let Some(id) = requested {
            match self.session(id) {
                Ok(session) => return Ok(session),
                Err(ChatError::SessionNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        let session = Arc::new(Session::new());
        self.sweep_expired()?
            .insert(session.id, Arc::clone(&session));
        info!(session_id = %session.id, "session created");
        Ok(session)
    }
}
