mod conversation;
mod ids;
mod learning_path;
mod score;
mod session;
mod settings;
mod turn;

pub use conversation::Conversation;
pub use ids::{ParseIdError, PathId, SESSION_KEY_PREFIX, SessionKey};
pub use learning_path::LearningPath;
pub use score::{Score, ScoreError};
pub use session::{DisplayCache, ERROR_MESSAGE, Session};
pub use settings::{SessionSettings, SessionSettingsDraft, SettingsError};
pub use turn::{Sender, Turn};
