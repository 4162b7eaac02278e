//! HTTP API server for application-layer control
//!
//! This module provides a REST API over the recorder controller:
//! - POST /recording/start - Start a recording (waits for consent and engine start)
//! - POST /recording/stop - Stop the recording, returns the artifact path
//! - POST /recordings/delete - Delete a recording artifact
//! - GET /recording/status - Query session status
//! - GET /recording/events - Server-sent log and completion events
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
