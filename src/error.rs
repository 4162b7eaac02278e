//! Caller-facing error taxonomy
//!
//! Every failure a caller can observe is one of these kinds. Collaborator
//! errors (engine, consent, storage) are translated into them at the
//! controller boundary and never cross it raw.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure outcome of a recorder request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("a recording session is already active")]
    SessionBusy,

    #[error("no active recording session")]
    NoActiveSession,

    #[error("no activity context available to request capture consent")]
    NoActivityContext,

    #[error("failed to start recording: {0}")]
    StartFailed(String),

    #[error("RecorderOnError:{code} {message}")]
    EngineError { code: i32, message: String },

    #[error("failed to stop recording: {0}")]
    StopFailed(String),

    #[error("unable to delete file: {0}")]
    DeleteFailed(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("recorder shut down before the request was resolved")]
    Cancelled,
}

impl RecorderError {
    /// Stable machine-readable code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            RecorderError::SessionBusy => "SESSION_BUSY",
            RecorderError::NoActiveSession => "NO_ACTIVE_SESSION",
            RecorderError::NoActivityContext => "NO_ACTIVITY_CONTEXT",
            RecorderError::StartFailed(_) => "START_FAILED",
            RecorderError::EngineError { .. } => "RECORDER_ERROR",
            RecorderError::StopFailed(_) => "STOP_FAILED",
            RecorderError::DeleteFailed(_) => "DELETE_FAILED",
            RecorderError::Timeout(_) => "TIMEOUT",
            RecorderError::Cancelled => "CANCELLED",
        }
    }

    /// Translate a collaborator failure into `StartFailed`, keeping its context chain
    pub(crate) fn start_failed(err: &anyhow::Error) -> Self {
        RecorderError::StartFailed(format!("{:#}", err))
    }

    pub(crate) fn stop_failed(err: &anyhow::Error) -> Self {
        RecorderError::StopFailed(format!("{:#}", err))
    }
}

/// Error shape returned to callers over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&RecorderError> for ErrorResponse {
    fn from(error: &RecorderError) -> Self {
        ErrorResponse {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<RecorderError> for ErrorResponse {
    fn from(error: RecorderError) -> Self {
        ErrorResponse::from(&error)
    }
}
