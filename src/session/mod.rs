//! Recording session model
//!
//! This module provides the data the controller owns for one recording:
//! - Caller-supplied options
//! - Session state and output location
//! - Artifact file naming
//! - A serializable status snapshot

mod config;
mod session;
mod snapshot;

pub use config::RecordingOptions;
pub use session::{FileNamer, Session, SessionState};
pub use snapshot::SessionSnapshot;
