use std::sync::Arc;

use storage::repository::{SessionRecord, SessionStore};
use tutor_core::model::{LearningPath, PathId, Session, SessionSettings};

use super::service::CoachSession;
use crate::coach::CoachApi;
use crate::error::SessionError;
use crate::learning_paths::LearningPathApi;
use crate::narration::Narrator;

/// Opens coach sessions: path lookup, restore-or-start, seeding, first save.
#[derive(Clone)]
pub struct SessionLoopService {
    settings: SessionSettings,
    coach: Arc<dyn CoachApi>,
    paths: Arc<dyn LearningPathApi>,
    store: Arc<dyn SessionStore>,
    narrator: Option<Arc<dyn Narrator>>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        settings: SessionSettings,
        coach: Arc<dyn CoachApi>,
        paths: Arc<dyn LearningPathApi>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            settings,
            coach,
            paths,
            store,
            narrator: None,
        }
    }

    #[must_use]
    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Look up a learning path and open its session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Lookup` if the path cannot be fetched.
    pub async fn open(&self, id: &PathId) -> Result<CoachSession, SessionError> {
        let path = self.paths.get_path(id).await?;
        Ok(self.open_path(path).await)
    }

    /// Open the session for an already-known learning path.
    ///
    /// Restores the stored session if there is one, otherwise starts fresh.
    /// If the store cannot be read, the session starts fresh in memory only
    /// and the stored copy is left untouched.
    pub async fn open_path(&self, path: LearningPath) -> CoachSession {
        let key = path.session_key();
        let welcome = path.welcome_text();
        let policy = self.settings.progress_policy();

        let (stored, persistent) = match self.store.load(&key).await {
            Ok(stored) => (stored, true),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "session store unreadable, continuing in memory");
                (None, false)
            }
        };

        let mut session = match stored {
            Some(mut record) => {
                if record.ai_message.trim().is_empty() {
                    record.ai_message.clone_from(&welcome);
                }
                tracing::info!(key = %key, turns = record.context.conversation.len(), "restored session");
                record.into_session(key.clone(), &policy)
            }
            None => {
                tracing::info!(key = %key, "starting new session");
                Session::start(key.clone(), &welcome, self.settings.seed_turns(), &policy)
            }
        };
        session.seed_if_empty(self.settings.seed_turns(), &welcome, &policy);

        if persistent {
            let record = SessionRecord::from_session(&session);
            if let Err(err) = self.store.save(&key, &record).await {
                tracing::warn!(key = %key, error = %err, "session not persisted, continuing in memory");
            }
        }

        let session = CoachSession::new(
            path,
            session,
            self.settings.clone(),
            Arc::clone(&self.coach),
            Arc::clone(&self.store),
        )
        .with_narrator(self.narrator.clone());
        if persistent { session } else { session.memory_only() }
    }
}
