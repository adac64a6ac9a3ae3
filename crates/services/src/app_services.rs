use std::sync::Arc;

use storage::repository::Storage;
use tutor_core::model::SessionSettings;

use crate::coach::HttpCoachClient;
use crate::config;
use crate::error::AppServicesError;
use crate::learning_paths::LearningPathApi;
use crate::narration::Narrator;
use crate::sessions::SessionLoopService;

/// Assembles app-facing services around one storage backend and one coach.
#[derive(Clone)]
pub struct AppServices {
    settings: SessionSettings,
    client: Arc<HttpCoachClient>,
    session_loop: Arc<SessionLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP coach.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        settings: SessionSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(&storage, settings, None))
    }

    /// Build services with settings taken from `TUTOR_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the settings are invalid or storage
    /// initialization fails.
    pub async fn from_env(db_url: &str) -> Result<Self, AppServicesError> {
        let settings = config::settings_from_env()?;
        Self::new_sqlite(db_url, settings).await
    }

    /// Build services on top of an existing storage aggregate.
    #[must_use]
    pub fn with_storage(
        storage: &Storage,
        settings: SessionSettings,
        narrator: Option<Arc<dyn Narrator>>,
    ) -> Self {
        let client = Arc::new(HttpCoachClient::new(settings.base_url().as_str()));
        let mut session_loop = SessionLoopService::new(
            settings.clone(),
            client.clone(),
            client.clone(),
            Arc::clone(&storage.sessions),
        );
        if let Some(narrator) = narrator {
            session_loop = session_loop.with_narrator(narrator);
        }

        Self {
            settings,
            client,
            session_loop: Arc::new(session_loop),
        }
    }

    /// Attach a narrator to every session opened from now on.
    #[must_use]
    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        let session_loop = (*self.session_loop).clone().with_narrator(narrator);
        self.session_loop = Arc::new(session_loop);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn learning_paths(&self) -> Arc<dyn LearningPathApi> {
        self.client.clone()
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }
}
