mod driver;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use driver::drive;
pub use service::{CoachSession, Outcome};
pub use view::SessionView;
pub use workflow::SessionLoopService;
