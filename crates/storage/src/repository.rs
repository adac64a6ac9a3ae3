use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tutor_core::ProgressScorer;
use tutor_core::model::{Conversation, DisplayCache, Session, SessionKey, Turn};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Transcript wrapper, kept as its own object for compatibility with the
/// `context.conversation` shape shared with the coach service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    #[serde(default)]
    pub conversation: Vec<Turn>,
}

/// Persisted shape for a session, one per learning path.
///
/// This mirrors the domain `Session` so stores can serialize/deserialize
/// without leaking storage concerns into the domain layer. Progress is not
/// stored; it is recomputed from the transcript on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub ai_message: String,
    #[serde(default)]
    pub code_snippet: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub context: ConversationContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<usize>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let display = session.display();
        Self {
            ai_message: display.ai_message.clone(),
            code_snippet: display.code_snippet.clone(),
            hint: display.hint.clone(),
            context: ConversationContext {
                conversation: session.conversation().turns().to_vec(),
            },
            cursor: Some(session.cursor().position()),
        }
    }

    /// Convert the record back into a domain `Session`.
    ///
    /// A missing cursor falls back to the last turn.
    #[must_use]
    pub fn into_session(self, key: SessionKey, scorer: &impl ProgressScorer) -> Session {
        let display = DisplayCache {
            ai_message: self.ai_message,
            code_snippet: self.code_snippet,
            hint: self.hint,
        };
        Session::from_persisted(
            key,
            Conversation::from_persisted(self.context.conversation),
            display,
            self.cursor,
            scorer,
        )
    }

    /// Encode the record as the stored JSON value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Decode a stored JSON value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the value is not a session record.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Durable key-value slot for sessions, keyed by learning path.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or the value is corrupt.
    async fn load(&self, key: &SessionKey) -> Result<Option<SessionRecord>, StorageError>;

    /// Persist (overwrite) the session stored under `key`.
    ///
    /// Saving an unchanged record is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save(&self, key: &SessionKey, record: &SessionRecord) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
///
/// Values are kept JSON-encoded, the same way the durable adapters hold them.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<HashMap<SessionKey, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Raw stored value for a key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw(&self, key: &SessionKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }
}

#[async_trait]
impl SessionStore for InMemoryRepository {
    async fn load(&self, key: &SessionKey) -> Result<Option<SessionRecord>, StorageError> {
        self.raw(key)?
            .map(|raw| SessionRecord::from_json(&raw))
            .transpose()
    }

    async fn save(&self, key: &SessionKey, record: &SessionRecord) -> Result<(), StorageError> {
        let encoded = record.to_json()?;
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.get(key) != Some(&encoded) {
            guard.insert(key.clone(), encoded);
        }
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemoryRepository::new());
        Self { sessions }
    }
}
