//! Capture engine seam
//!
//! The controller drives an external capture/encoding engine through the
//! `CaptureEngine` trait and receives its lifecycle callbacks as
//! `EngineEvent`s.

pub mod backend;
pub mod simulated;

pub use backend::{
    event_channel, CaptureEngine, EngineEvent, EngineEventSender, EngineSettings,
    DEFAULT_ENCODER_PROFILE, STOP_FROM_APP_NOTIFICATION,
};
pub use simulated::SimulatedEngine;
