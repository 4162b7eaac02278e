use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::warn;

use crate::consent::ConsentToken;

/// Encoder profile handed to the engine unless configured otherwise
pub const DEFAULT_ENCODER_PROFILE: &str = "DEFAULT";

/// Notification text shown when the notification stop action is disabled
pub const STOP_FROM_APP_NOTIFICATION: &str = "Stop recording from the application";

/// Settings applied to the engine before a session begins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Record microphone audio alongside the screen
    pub audio_enabled: bool,
    /// Video encoder profile name
    pub encoder_profile: String,
    /// Directory the artifact is written into
    pub output_dir: PathBuf,
    /// File name without extension (the engine appends it)
    pub file_name: String,
    /// Container extension, without the dot
    pub file_extension: String,
    /// Replacement text for the engine's notification.
    /// `Some` means the notification stop action is suppressed.
    pub notification_description: Option<String>,
}

impl EngineSettings {
    /// Path the artifact is expected at if the engine reports none
    pub fn expected_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.file_name, self.file_extension))
    }

    pub fn notification_suppressed(&self) -> bool {
        self.notification_description.is_some()
    }
}

/// Lifecycle callbacks emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum EngineEvent {
    Started,
    Completed,
    Error { code: i32, message: String },
    Paused,
    Resumed,
}

/// Capture engine trait
///
/// Operations only instruct the engine; outcomes arrive later as
/// `EngineEvent`s. Implementations may emit events from any thread,
/// including from inside these calls.
pub trait CaptureEngine: Send + Sync {
    /// Apply settings for the next session
    fn configure(&self, settings: &EngineSettings) -> Result<()>;

    /// Begin capturing with a granted consent token
    fn begin(&self, grant: ConsentToken) -> Result<()>;

    /// Stop capturing and finalize the artifact
    fn end(&self) -> Result<()>;

    /// Artifact path as reported by the engine, if known
    fn artifact_path(&self) -> Option<PathBuf>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// Sending half of the engine event channel, owned by the engine
#[derive(Debug, Clone)]
pub struct EngineEventSender {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineEventSender {
    /// Emit a lifecycle event. Dropped silently once the controller is gone.
    pub fn emit(&self, event: EngineEvent) {
        if let Err(e) = self.tx.send(event) {
            warn!("Engine event dropped, controller is gone: {:?}", e.0);
        }
    }
}

/// Create an engine event channel
///
/// The sender goes to the engine; the receiver goes to
/// `RecorderController::attach_engine_events`.
pub fn event_channel() -> (EngineEventSender, mpsc::UnboundedReceiver<EngineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EngineEventSender { tx }, rx)
}
