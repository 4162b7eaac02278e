use serde::{Deserialize, Serialize};

/// Successful outcome of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StartOutcome {
    /// The engine reported that capture began
    Started,
    /// The user declined the consent dialog (not an error)
    UserDeniedPermission,
}

/// Human-readable log line for observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub log: String,
}

/// Emitted once per completed session with the artifact path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub value: String,
}
