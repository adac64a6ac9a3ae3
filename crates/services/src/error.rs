//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tutor_core::model::{PathId, SettingsError};

/// Errors emitted by the coach endpoint.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoachError {
    #[error("coach request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("coach service reported an error: {0}")]
    Service(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while looking up learning paths.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LearningPathError {
    #[error("learning path not found: {0}")]
    NotFound(PathId),
    #[error("learning path request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by session services.
///
/// Coach failures, empty answers and storage write failures are not errors
/// here; they are reported through `Outcome`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session state lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Lookup(#[from] LearningPathError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
