use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::SessionState;

/// Point-in-time view of the controller's session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Current state (`idle` when no session exists)
    pub state: SessionState,

    /// Session identifier, for log correlation
    pub session_id: Option<Uuid>,

    /// Whether the microphone is recorded
    pub mic_enabled: bool,

    /// When the session was requested
    pub started_at: Option<DateTime<Utc>>,

    /// When the session completed or failed
    pub ended_at: Option<DateTime<Utc>>,

    /// Seconds from request until the session ended, or until now
    pub duration_secs: Option<f64>,

    /// Artifact path, once the session completed
    pub output_path: Option<String>,

    /// Failure message, if the session failed
    pub failure: Option<String>,
}

impl SessionSnapshot {
    pub fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            session_id: None,
            mic_enabled: false,
            started_at: None,
            ended_at: None,
            duration_secs: None,
            output_path: None,
            failure: None,
        }
    }
}
