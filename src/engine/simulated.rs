// Reference capture engine
//
// Stands in for a platform encoder: it honours the configure/begin/end
// protocol, emits the same lifecycle events, and writes a small JSON
// placeholder where the real engine would write the encoded container.
// Used by the `record` command, the HTTP server and the tests.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::backend::{CaptureEngine, EngineEvent, EngineEventSender, EngineSettings};
use crate::consent::ConsentToken;

#[derive(Default)]
struct SimulatedState {
    settings: Option<EngineSettings>,
    grant: Option<ConsentToken>,
    capturing: bool,
    paused: bool,
    started_at: Option<DateTime<Utc>>,
    artifact: Option<PathBuf>,
}

/// Placeholder artifact contents
#[derive(Serialize)]
struct PlaceholderArtifact<'a> {
    engine: &'a str,
    settings: &'a EngineSettings,
    consent_token: &'a str,
    started_at: Option<DateTime<Utc>>,
    ended_at: DateTime<Utc>,
}

pub struct SimulatedEngine {
    events: EngineEventSender,
    state: Mutex<SimulatedState>,
    report_path: bool,
}

impl SimulatedEngine {
    pub fn new(events: EngineEventSender) -> Self {
        Self {
            events,
            state: Mutex::new(SimulatedState::default()),
            report_path: true,
        }
    }

    /// Whether `artifact_path` reports the written file (default: true)
    pub fn with_reported_path(mut self, report_path: bool) -> Self {
        self.report_path = report_path;
        self
    }

    pub fn is_capturing(&self) -> bool {
        self.state.lock().capturing
    }

    /// Pause capture, as the engine's own UI would
    pub fn pause(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if !state.capturing || state.paused {
                bail!("Simulated engine is not capturing");
            }
            state.paused = true;
        }
        self.events.emit(EngineEvent::Paused);
        Ok(())
    }

    pub fn resume(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if !state.paused {
                bail!("Simulated engine is not paused");
            }
            state.paused = false;
        }
        self.events.emit(EngineEvent::Resumed);
        Ok(())
    }
}

impl CaptureEngine for SimulatedEngine {
    fn configure(&self, settings: &EngineSettings) -> Result<()> {
        let mut state = self.state.lock();
        if state.capturing {
            bail!("Cannot reconfigure while capturing");
        }
        info!(
            "Simulated engine configured: audio={}, profile={}, output={}",
            settings.audio_enabled,
            settings.encoder_profile,
            settings.expected_path().display()
        );
        state.settings = Some(settings.clone());
        state.artifact = None;
        Ok(())
    }

    fn begin(&self, grant: ConsentToken) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.settings.is_none() {
                bail!("Simulated engine is not configured");
            }
            if state.capturing {
                bail!("Simulated engine is already capturing");
            }
            state.grant = Some(grant);
            state.capturing = true;
            state.paused = false;
            state.started_at = Some(Utc::now());
        }
        self.events.emit(EngineEvent::Started);
        Ok(())
    }

    fn end(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if !state.capturing {
                bail!("Simulated engine is not capturing");
            }
            let settings = state
                .settings
                .as_ref()
                .context("Simulated engine lost its settings")?;
            let path = settings.expected_path();

            let artifact = PlaceholderArtifact {
                engine: self.name(),
                settings,
                consent_token: state.grant.as_ref().map(|g| g.as_str()).unwrap_or_default(),
                started_at: state.started_at,
                ended_at: Utc::now(),
            };
            let contents = serde_json::to_vec_pretty(&artifact)?;
            fs::write(&path, contents)
                .with_context(|| format!("Failed to write artifact {}", path.display()))?;

            info!("Simulated engine wrote artifact: {}", path.display());
            state.capturing = false;
            state.paused = false;
            state.grant = None;
            state.artifact = Some(path);
        }
        self.events.emit(EngineEvent::Completed);
        Ok(())
    }

    fn artifact_path(&self) -> Option<PathBuf> {
        if !self.report_path {
            return None;
        }
        self.state.lock().artifact.clone()
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
