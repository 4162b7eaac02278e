use std::time::Duration;

use crate::engine::DEFAULT_ENCODER_PROFILE;
use crate::storage::DirectoryKind;

/// Controller tuning
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// File name prefix, followed by the unix-millis stamp
    pub file_prefix: String,

    /// Container extension, appended by the engine
    pub file_extension: String,

    /// Encoder profile passed to the engine
    pub encoder_profile: String,

    /// Directory kind used when the caller does not pick one
    pub default_directory: DirectoryKind,

    /// Bound on the consent dialog; `None` waits forever
    pub consent_timeout: Option<Duration>,

    /// Bound on the engine's `started` after `begin`; `None` waits forever
    pub start_timeout: Option<Duration>,

    /// Bound on the engine's `completed` after `end`; `None` waits forever
    pub stop_timeout: Option<Duration>,

    /// Buffer size of the log and completion broadcast channels
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            file_prefix: "recording_".to_string(),
            file_extension: "mp4".to_string(),
            encoder_profile: DEFAULT_ENCODER_PROFILE.to_string(),
            default_directory: DirectoryKind::Cache,
            consent_timeout: None,
            start_timeout: None,
            stop_timeout: None,
            event_capacity: 100,
        }
    }
}
