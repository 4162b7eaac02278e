pub mod config;
pub mod consent;
pub mod controller;
pub mod engine;
pub mod error;
pub mod http;
pub mod session;
pub mod storage;

pub use config::Config;
pub use consent::{ConsentAuthority, ConsentDecision, ConsentError, ConsentPolicy, ConsentToken, PolicyConsent};
pub use controller::{CompletionEvent, ControllerConfig, LogEvent, Pending, RecorderController, StartOutcome};
pub use engine::{event_channel, CaptureEngine, EngineEvent, EngineEventSender, EngineSettings, SimulatedEngine};
pub use error::{ErrorResponse, RecorderError};
pub use http::{create_router, AppState};
pub use session::{RecordingOptions, SessionSnapshot, SessionState};
pub use storage::{DirectoryKind, FsStorage, StorageProvider};
