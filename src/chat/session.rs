//! Per-browser chat sessions
//!
//! A [`ChatSession`] owns the ordered message history of one browser
//! session. The [`SessionManager`] creates sessions on first visit, hands
//! them to request handlers, and drops them on reset or after the idle TTL.

use crate::error::{ChatboardError, Result};
use crate::providers::{Message, Provider};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// One conversation with the remote model
pub struct ChatSession {
    id: String,
    history: Vec<Message>,
    provider: Arc<dyn Provider>,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("messages", &self.history.len())
            .finish()
    }
}

impl ChatSession {
    /// Start an empty session against the given provider
    pub fn new(id: impl Into<String>, provider: Arc<dyn Provider>) -> Self {
        Self {
            id: id.into(),
            history: Vec::new(),
            provider,
        }
    }

    /// Session identifier (also the cookie value)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Messages exchanged so far, oldest first
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Send user text to the model and record the exchange
    ///
    /// On success the history gains the user message followed by the reply,
    /// and the reply text is returned. History is only touched once the reply
    /// is in hand, so a failed or cancelled call leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank text, otherwise the provider's
    /// `Network`, `Authentication`, or `Provider` error
    pub async fn send(&mut self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(ChatboardError::Validation("Message cannot be empty".to_string()).into());
        }

        let user = Message::user(text);
        let mut request = Vec::with_capacity(self.history.len() + 1);
        request.extend_from_slice(&self.history);
        request.push(user.clone());
        tracing::debug!(session = %self.id, turn = request.len(), "Sending chat message");

        match self.provider.complete(&request).await {
            Ok(response) => {
                let reply = response.message.content;
                self.history.push(user);
                self.history.push(Message::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(session = %self.id, "Chat message failed: {:#}", e);
                Err(e)
            }
        }
    }
}

struct SessionEntry {
    session: Arc<Mutex<ChatSession>>,
    last_access: Instant,
}

/// Registry of live chat sessions
pub struct SessionManager {
    provider: Arc<dyn Provider>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a manager whose sessions expire after `ttl` of inactivity
    pub fn new(provider: Arc<dyn Provider>, ttl: Duration) -> Self {
        Self {
            provider,
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Return the session for `id`, starting a new one if it is unknown
    ///
    /// The boolean is true when a new session was created.
    pub fn get_or_create(&self, id: Option<&str>) -> Result<(Arc<Mutex<ChatSession>>, bool)> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| anyhow::anyhow!("session registry lock poisoned"))?;
        self.prune_expired(&mut sessions);

        if let Some(entry) = id.and_then(|id| sessions.get_mut(id)) {
            entry.last_access = Instant::now();
            return Ok((entry.session.clone(), false));
        }

        let new_id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(ChatSession::new(
            new_id.clone(),
            self.provider.clone(),
        )));
        sessions.insert(
            new_id.clone(),
            SessionEntry {
                session: session.clone(),
                last_access: Instant::now(),
            },
        );
        tracing::info!(session = %new_id, live = sessions.len(), "Started chat session");

        Ok((session, true))
    }

    /// End a session; returns whether it existed
    pub fn end(&self, id: &str) -> bool {
        match self.sessions.write() {
            Ok(mut sessions) => {
                let removed = sessions.remove(id).is_some();
                if removed {
                    tracing::info!(session = %id, "Ended chat session");
                }
                removed
            }
            Err(_) => false,
        }
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Whether no session is live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune_expired(&self, sessions: &mut HashMap<String, SessionEntry>) {
        let ttl = self.ttl;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_access.elapsed() < ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Dropped idle chat sessions");
        }
    }
}
