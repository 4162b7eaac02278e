use chrono::Utc;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::ControllerConfig;
use super::events::{CompletionEvent, LogEvent, StartOutcome};
use super::pending::{self, Pending, Responder};
use crate::consent::{ConsentAuthority, ConsentDecision, ConsentError};
use crate::engine::{CaptureEngine, EngineEvent};
use crate::error::RecorderError;
use crate::session::{FileNamer, RecordingOptions, Session, SessionSnapshot, SessionState};
use crate::storage::StorageProvider;

/// Phase a timeout guards
#[derive(Debug, Clone, Copy)]
enum Phase {
    Start,
    Stop,
}

impl Phase {
    fn describe(self) -> &'static str {
        match self {
            Phase::Start => "the capture engine to start",
            Phase::Stop => "the capture engine to finish",
        }
    }
}

/// Everything guarded by the controller lock
struct ControllerState {
    session: Option<Session>,
    start_request: Option<Responder<StartOutcome>>,
    stop_request: Option<Responder<PathBuf>>,
    /// Timed-out session whose engine still owes a completion or error
    draining: Option<Uuid>,
    namer: FileNamer,
}

impl ControllerState {
    /// The session with `id`, if it is still the current one
    fn session_mut(&mut self, id: Uuid) -> Option<&mut Session> {
        self.session.as_mut().filter(|s| s.id == id)
    }
}

struct Inner {
    engine: Arc<dyn CaptureEngine>,
    consent: Arc<dyn ConsentAuthority>,
    storage: Arc<dyn StorageProvider>,
    config: ControllerConfig,
    state: Mutex<ControllerState>,
    logs: broadcast::Sender<LogEvent>,
    completions: broadcast::Sender<CompletionEvent>,
}

impl Inner {
    /// Log to tracing and to the log channel
    fn log(&self, message: impl Into<String>) {
        let log = message.into();
        info!("{}", log);
        // No subscribers is fine
        let _ = self.logs.send(LogEvent { log });
    }
}

/// Single-session recording controller
///
/// Cheap to clone; clones share the same session. The engine and consent
/// authority are never called while the state lock is held, so the engine
/// may deliver events synchronously from inside `configure`, `begin` or `end`.
///
/// `start_recording` spawns onto the current Tokio runtime and must be
/// called from within one.
#[derive(Clone)]
pub struct RecorderController {
    inner: Arc<Inner>,
}

impl RecorderController {
    pub fn new(
        engine: Arc<dyn CaptureEngine>,
        consent: Arc<dyn ConsentAuthority>,
        storage: Arc<dyn StorageProvider>,
        config: ControllerConfig,
    ) -> Self {
        let capacity = config.event_capacity.max(1);
        let (logs, _) = broadcast::channel(capacity);
        let (completions, _) = broadcast::channel(capacity);

        info!(
            "Recorder controller created (engine: {}, default directory: {:?})",
            engine.name(),
            config.default_directory
        );

        Self {
            inner: Arc::new(Inner {
                engine,
                consent,
                storage,
                state: Mutex::new(ControllerState {
                    session: None,
                    start_request: None,
                    stop_request: None,
                    draining: None,
                    namer: FileNamer::new(config.file_prefix.clone()),
                }),
                config,
                logs,
                completions,
            }),
        }
    }

    /// Feed engine events from `rx` into the controller, in order
    ///
    /// The pump holds only a weak reference and ends when the controller is
    /// dropped or the engine drops its sender.
    pub fn attach_engine_events(
        &self,
        mut rx: mpsc::UnboundedReceiver<EngineEvent>,
    ) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            debug!("Engine event pump started");
            while let Some(event) = rx.recv().await {
                match Self::upgrade(&inner) {
                    Some(controller) => controller.handle_engine_event(event),
                    None => break,
                }
            }
            debug!("Engine event pump stopped");
        })
    }

    fn upgrade(inner: &Weak<Inner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    pub fn subscribe_logs(&self) -> broadcast::Receiver<LogEvent> {
        self.inner.logs.subscribe()
    }

    pub fn subscribe_completions(&self) -> broadcast::Receiver<CompletionEvent> {
        self.inner.completions.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.inner
            .state
            .lock()
            .session
            .as_ref()
            .map(|s| s.state)
            .unwrap_or(SessionState::Idle)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner
            .state
            .lock()
            .session
            .as_ref()
            .map(Session::snapshot)
            .unwrap_or_else(SessionSnapshot::idle)
    }

    /// Request a new recording session
    ///
    /// Returns at once. The outcome arrives after the consent dialog and the
    /// engine's `started` callback.
    pub fn start_recording(&self, options: RecordingOptions) -> Pending<StartOutcome> {
        let (responder, pending) = pending::request();

        let (id, settings, planned) = {
            let mut state = self.inner.state.lock();

            let busy = state
                .session
                .as_ref()
                .filter(|s| s.state.is_active())
                .map(|s| (s.id, s.state));
            if let Some((active, current)) = busy {
                drop(state);
                self.inner.log(format!(
                    "startRecording rejected: session {} is {:?}",
                    active, current
                ));
                responder.resolve(Err(RecorderError::SessionBusy));
                return pending;
            }

            if let Some(stale) = state.draining {
                drop(state);
                self.inner.log(format!(
                    "startRecording rejected: capture engine is still finishing session {}",
                    stale
                ));
                responder.resolve(Err(RecorderError::SessionBusy));
                return pending;
            }

            let kind = options
                .directory
                .unwrap_or(self.inner.config.default_directory);
            let output_dir = match self.inner.storage.writable_directory(kind) {
                Ok(dir) => dir,
                Err(e) => {
                    drop(state);
                    error!("Failed to resolve recordings directory: {:#}", e);
                    self.inner.log(format!("startRecording failed: {:#}", e));
                    responder.resolve(Err(RecorderError::start_failed(&e)));
                    return pending;
                }
            };

            let file_name = state.namer.next_name(Utc::now());
            let session = Session::new(
                options,
                output_dir,
                file_name,
                self.inner.config.file_extension.clone(),
            );
            let id = session.id;
            let settings = session.engine_settings(&self.inner.config.encoder_profile);
            let planned = session.fallback_path();

            state.session = Some(session);
            state.start_request = Some(responder);
            state.stop_request = None;
            (id, settings, planned)
        };

        self.inner
            .log(format!("startRecording path: {}", planned.display()));

        if let Err(e) = self.inner.engine.configure(&settings) {
            error!("Failed to configure capture engine: {:#}", e);
            self.abort_start(id, RecorderError::start_failed(&e));
            return pending;
        }

        let controller = self.clone();
        tokio::spawn(async move {
            controller.await_consent(id).await;
        });

        pending
    }

    /// Request the active session to stop
    ///
    /// Resolves with the artifact path once the engine completes.
    pub fn stop_recording(&self) -> Pending<PathBuf> {
        self.inner.log("stopRecording called");

        let (responder, pending) = pending::request();

        let id = {
            let mut state = self.inner.state.lock();
            let current = state.session.as_ref().map(|s| (s.id, s.state));

            match current {
                Some((id, SessionState::Recording)) => {
                    if let Some(session) = state.session_mut(id) {
                        session.state = SessionState::Stopping;
                    }
                    state.stop_request = Some(responder);
                    id
                }
                Some((_, SessionState::Stopping)) => {
                    drop(state);
                    self.inner
                        .log("stopRecording rejected: a stop is already in progress");
                    responder.resolve(Err(RecorderError::SessionBusy));
                    return pending;
                }
                _ => {
                    drop(state);
                    self.inner
                        .log("stopRecording failed: no active capture engine");
                    responder.resolve(Err(RecorderError::NoActiveSession));
                    return pending;
                }
            }
        };

        match self.inner.engine.end() {
            Ok(()) => self.arm_timeout(id, Phase::Stop),
            Err(e) => {
                self.inner
                    .log(format!("stopRecording exception: {:#}", e));
                self.fail_session(id, RecorderError::stop_failed(&e));
            }
        }

        pending
    }

    /// Delete a recording artifact
    ///
    /// Independent of the session; resolves `false` when nothing exists at `path`.
    pub fn delete_recording(&self, path: impl AsRef<Path>) -> Pending<bool> {
        let path = path.as_ref();

        if !self.inner.storage.exists(path) {
            self.inner.log(format!(
                "deleteRecording failed: file not found {}",
                path.display()
            ));
            return pending::resolved(Ok(false));
        }

        match self.inner.storage.delete_file(path) {
            Ok(()) => {
                self.inner
                    .log(format!("deleteRecording success: {}", path.display()));
                pending::resolved(Ok(true))
            }
            Err(e) => {
                self.inner
                    .log(format!("deleteRecording failed: {:#}", e));
                pending::resolved(Err(RecorderError::DeleteFailed(format!("{:#}", e))))
            }
        }
    }

    /// Engine callback entry point
    pub fn handle_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::Started => self.on_engine_started(),
            EngineEvent::Completed => self.on_engine_completed(),
            EngineEvent::Error { code, message } => self.on_engine_error(code, message),
            EngineEvent::Paused => self.inner.log("Capture engine paused"),
            EngineEvent::Resumed => self.inner.log("Capture engine resumed"),
        }
    }

    async fn await_consent(&self, id: Uuid) {
        let request = self.inner.consent.request_capture_permission();

        let decision = match self.inner.config.consent_timeout {
            Some(limit) => match tokio::time::timeout(limit, request).await {
                Ok(decision) => decision,
                Err(_) => {
                    warn!("Capture consent timed out after {:?}", limit);
                    self.abort_start(id, RecorderError::Timeout("capture consent".to_string()));
                    return;
                }
            },
            None => request.await,
        };

        self.handle_consent(id, decision);
    }

    fn handle_consent(&self, id: Uuid, decision: Result<ConsentDecision, ConsentError>) {
        let grant = {
            let mut state = self.inner.state.lock();
            let awaiting = state
                .session_mut(id)
                .map(|s| s.state == SessionState::AwaitingConsent)
                .unwrap_or(false);
            if !awaiting {
                drop(state);
                debug!("Ignoring consent decision for stale session {}", id);
                return;
            }

            match decision {
                Ok(ConsentDecision::Granted(grant)) => {
                    if let Some(session) = state.session_mut(id) {
                        session.state = SessionState::Recording;
                    }
                    grant
                }
                Ok(ConsentDecision::Denied) => {
                    state.session = None;
                    let responder = state.start_request.take();
                    drop(state);
                    self.inner.log("User denied permission");
                    if let Some(responder) = responder {
                        responder.resolve(Ok(StartOutcome::UserDeniedPermission));
                    }
                    return;
                }
                Ok(ConsentDecision::Unavailable) => {
                    drop(state);
                    self.abort_start(
                        id,
                        RecorderError::StartFailed("capture consent unavailable".to_string()),
                    );
                    return;
                }
                Err(ConsentError::NoActivityContext) => {
                    drop(state);
                    self.abort_start(id, RecorderError::NoActivityContext);
                    return;
                }
                Err(ConsentError::Dispatch(e)) => {
                    drop(state);
                    self.abort_start(id, RecorderError::start_failed(&e));
                    return;
                }
            }
        };

        self.inner.log("User accepted permission");

        match self.inner.engine.begin(grant) {
            Ok(()) => self.arm_timeout(id, Phase::Start),
            Err(e) => {
                error!("Capture engine failed to begin: {:#}", e);
                self.abort_start(id, RecorderError::start_failed(&e));
            }
        }
    }

    fn on_engine_started(&self) {
        let responder = {
            let mut state = self.inner.state.lock();
            match state.session.as_ref().map(|s| s.state) {
                Some(SessionState::Recording) => state.start_request.take(),
                other => {
                    drop(state);
                    debug!("Ignoring engine start in state {:?}", other);
                    return;
                }
            }
        };

        self.inner.log("Capture engine started");
        if let Some(responder) = responder {
            responder.resolve(Ok(StartOutcome::Started));
        }
    }

    fn on_engine_completed(&self) {
        // Read before locking: the engine may take its own lock here
        let reported = self.inner.engine.artifact_path();

        let (path, start, stop) = {
            let mut state = self.inner.state.lock();
            if let Some(stale) = state.draining.take() {
                drop(state);
                warn!("Discarding completion from timed-out session {}", stale);
                return;
            }

            let current = state.session.as_ref().map(|s| (s.id, s.state));

            let id = match current {
                Some((id, SessionState::Recording | SessionState::Stopping)) => id,
                Some((id, SessionState::Completed)) => {
                    drop(state);
                    warn!("Ignoring duplicate completion for session {}", id);
                    return;
                }
                other => {
                    drop(state);
                    debug!("Ignoring engine completion in state {:?}", other.map(|(_, s)| s));
                    return;
                }
            };

            let Some(session) = state.session_mut(id) else {
                return;
            };
            let path = session.resolve_output_path(reported);
            session.finish(SessionState::Completed);
            session.output_path = Some(path.clone());
            (path, state.start_request.take(), state.stop_request.take())
        };

        self.inner
            .log(format!("Capture engine completed. Path: {}", path.display()));

        if let Some(responder) = start {
            responder.resolve(Ok(StartOutcome::Started));
        }
        if let Some(responder) = stop {
            responder.resolve(Ok(path.clone()));
        }

        let _ = self.inner.completions.send(CompletionEvent {
            value: path.display().to_string(),
        });
    }

    fn on_engine_error(&self, code: i32, message: String) {
        self.inner
            .log(format!("Capture engine error: {} {}", code, message));

        let current = {
            let mut state = self.inner.state.lock();
            if let Some(stale) = state.draining.take() {
                drop(state);
                warn!("Discarding engine error from timed-out session {}", stale);
                return;
            }
            state.session.as_ref().map(|s| (s.id, s.state))
        };

        let id = match current {
            Some((id, SessionState::Recording | SessionState::Stopping)) => id,
            other => {
                debug!("Ignoring engine error in state {:?}", other.map(|(_, s)| s));
                return;
            }
        };

        self.fail_session(id, RecorderError::EngineError { code, message });
    }

    /// End a session before it reached the engine: back to idle,
    /// the start request fails with `error`
    fn abort_start(&self, id: Uuid, error: RecorderError) {
        let (start, stop) = {
            let mut state = self.inner.state.lock();
            if state.session_mut(id).is_none() {
                return;
            }
            state.session = None;
            (state.start_request.take(), state.stop_request.take())
        };

        self.inner.log(format!("startRecording failed: {}", error));

        if let Some(responder) = start {
            responder.resolve(Err(error.clone()));
        }
        if let Some(responder) = stop {
            responder.resolve(Err(error));
        }
    }

    /// Mark a running session failed and fail both pending requests
    fn fail_session(&self, id: Uuid, error: RecorderError) {
        let (start, stop) = {
            let mut state = self.inner.state.lock();
            let Some(session) = state.session_mut(id) else {
                return;
            };
            if !matches!(session.state, SessionState::Recording | SessionState::Stopping) {
                return;
            }
            session.finish(SessionState::Failed);
            session.failure = Some(error.to_string());
            (state.start_request.take(), state.stop_request.take())
        };

        if let Some(responder) = start {
            responder.resolve(Err(error.clone()));
        }
        if let Some(responder) = stop {
            responder.resolve(Err(error));
        }
    }

    fn arm_timeout(&self, id: Uuid, phase: Phase) {
        let limit = match phase {
            Phase::Start => self.inner.config.start_timeout,
            Phase::Stop => self.inner.config.stop_timeout,
        };
        let Some(limit) = limit else {
            return;
        };

        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            if let Some(controller) = Self::upgrade(&inner) {
                controller.expire(id, phase);
            }
        });
    }

    fn expire(&self, id: Uuid, phase: Phase) {
        let waiting = {
            let mut state = self.inner.state.lock();
            let waiting = match (state.session.as_ref(), phase) {
                (Some(s), Phase::Start) if s.id == id => {
                    s.state == SessionState::Recording && state.start_request.is_some()
                }
                (Some(s), Phase::Stop) if s.id == id => s.state == SessionState::Stopping,
                _ => false,
            };
            // The ended engine still owes this session a terminal event
            if waiting {
                state.draining = Some(id);
            }
            waiting
        };
        if !waiting {
            return;
        }

        self.inner
            .log(format!("Timed out waiting for {}", phase.describe()));

        if let Phase::Start = phase {
            if let Err(e) = self.inner.engine.end() {
                warn!("Failed to end capture engine after timeout: {:#}", e);
                let mut state = self.inner.state.lock();
                if state.draining == Some(id) {
                    state.draining = None;
                }
            }
        }

        self.fail_session(id, RecorderError::Timeout(phase.describe().to_string()));
    }
}
