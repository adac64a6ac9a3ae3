#![forbid(unsafe_code)]

pub mod app_services;
pub mod coach;
pub mod config;
pub mod error;
pub mod input;
pub mod learning_paths;
pub mod narration;
pub mod sessions;

pub use app_services::AppServices;
pub use coach::{CoachApi, CoachReply, CoachRequest, HttpCoachClient};
pub use error::{AppServicesError, CoachError, LearningPathError, SessionError};
pub use input::{InputCapture, InputEvent, LineInput};
pub use learning_paths::LearningPathApi;
pub use narration::Narrator;

pub use sessions::{CoachSession, Outcome, SessionLoopService, SessionView, drive};
