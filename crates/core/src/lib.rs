#![forbid(unsafe_code)]

pub mod cursor;
pub mod model;
pub mod progress;

pub use cursor::{Advance, Cursor};
pub use progress::{Progress, ProgressPolicy, ProgressScorer};
