use serde::{Deserialize, Serialize};

use crate::storage::DirectoryKind;

/// Caller options for a recording session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingOptions {
    /// Record microphone audio alongside the screen
    /// Default: false
    pub mic: bool,

    /// Allow the engine's notification to stop the recording.
    /// When false the notification only tells the user to stop from the app.
    /// Default: false
    pub notification_action_enabled: bool,

    /// Where the artifact goes; `None` uses the controller's default
    pub directory: Option<DirectoryKind>,
}

impl RecordingOptions {
    pub fn with_mic(mut self, mic: bool) -> Self {
        self.mic = mic;
        self
    }
}
