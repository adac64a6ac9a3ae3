use async_trait::async_trait;
use tutor_core::model::{LearningPath, PathId};

use crate::error::LearningPathError;

/// Catalogue of learning paths offered by the coach backend.
#[async_trait]
pub trait LearningPathApi: Send + Sync {
    /// Fetch a single learning path (`GET /learning-paths/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `LearningPathError::NotFound` for unknown ids, or transport errors.
    async fn get_path(&self, id: &PathId) -> Result<LearningPath, LearningPathError>;

    /// List every learning path (`GET /learning-paths`).
    ///
    /// # Errors
    ///
    /// Returns `LearningPathError` on transport or decoding failure.
    async fn list_paths(&self) -> Result<Vec<LearningPath>, LearningPathError>;
}
