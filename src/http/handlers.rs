use super::state::AppState;
use crate::controller::StartOutcome;
use crate::error::{ErrorResponse, RecorderError};
use crate::session::RecordingOptions;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StartRecordingResponse {
    /// "started" or "userDeniedPermission"
    pub outcome: StartOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StopRecordingResponse {
    /// Artifact path
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRecordingRequest {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteRecordingResponse {
    /// False when nothing existed at the path
    pub deleted: bool,
}

fn status_for(err: &RecorderError) -> StatusCode {
    match err {
        RecorderError::SessionBusy | RecorderError::NoActiveSession => StatusCode::CONFLICT,
        RecorderError::NoActivityContext | RecorderError::Cancelled => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        RecorderError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        RecorderError::StartFailed(_)
        | RecorderError::EngineError { .. }
        | RecorderError::StopFailed(_)
        | RecorderError::DeleteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: RecorderError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Recorder request failed: {}", err);
    } else {
        warn!("Recorder request rejected: {}", err);
    }
    (status, Json(ErrorResponse::from(err))).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recording/start
/// Start a new recording session. Body is optional.
pub async fn start_recording(
    State(state): State<AppState>,
    options: Option<Json<RecordingOptions>>,
) -> Response {
    let options = options.map(|Json(o)| o).unwrap_or_default();
    info!(
        "Start requested (mic={}, notification action={})",
        options.mic, options.notification_action_enabled
    );

    match state.controller.start_recording(options).await {
        Ok(outcome) => (StatusCode::OK, Json(StartRecordingResponse { outcome })).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /recording/stop
/// Stop the active session and return the artifact path
pub async fn stop_recording(State(state): State<AppState>) -> Response {
    match state.controller.stop_recording().await {
        Ok(path) => (
            StatusCode::OK,
            Json(StopRecordingResponse {
                path: path.display().to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /recordings/delete
/// Delete a recording artifact by path
pub async fn delete_recording(
    State(state): State<AppState>,
    Json(req): Json<DeleteRecordingRequest>,
) -> Response {
    match state.controller.delete_recording(&req.path).await {
        Ok(deleted) => (StatusCode::OK, Json(DeleteRecordingResponse { deleted })).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /recording/status
/// Current session snapshot
pub async fn get_recording_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.controller.snapshot()))
}

/// Turn a broadcast receiver into a stream, skipping over lagged items
fn broadcast_stream<T: Clone + Send + 'static>(
    rx: broadcast::Receiver<T>,
) -> impl Stream<Item = T> + Send {
    stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(item) => return Some((item, rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

/// GET /recording/events
/// Server-sent events: `recorderLog` for log lines, `stopEvent` for completions
pub async fn recorder_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let logs = broadcast_stream(state.controller.subscribe_logs()).map(|log| {
        Event::default()
            .event("recorderLog")
            .data(serde_json::json!({ "log": log.log }).to_string())
    });
    let completions = broadcast_stream(state.controller.subscribe_completions()).map(|done| {
        Event::default()
            .event("stopEvent")
            .data(serde_json::json!({ "value": done.value }).to_string())
    });

    let events = stream::select(logs, completions).map(Ok);
    Sse::new(events).keep_alive(KeepAlive::default())
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
