#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    ConversationContext, InMemoryRepository, SessionRecord, SessionStore, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
