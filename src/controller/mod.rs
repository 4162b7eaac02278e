//! Recording session controller
//!
//! Sequences caller requests, the consent dialog and the capture engine's
//! callbacks into request/response pairs:
//! - one session at a time, every state change under a single lock
//! - each pending request resolved exactly once
//! - log and completion events broadcast to subscribers

mod config;
mod controller;
mod events;
mod pending;

pub use config::ControllerConfig;
pub use controller::RecorderController;
pub use events::{CompletionEvent, LogEvent, StartOutcome};
pub use pending::Pending;
