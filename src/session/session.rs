use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::config::RecordingOptions;
use super::snapshot::SessionSnapshot;
use crate::engine::{EngineSettings, STOP_FROM_APP_NOTIFICATION};

/// Lifecycle state of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// No session
    Idle,
    /// Waiting for the user to approve capture
    AwaitingConsent,
    /// Engine instructed to begin (or already capturing)
    Recording,
    /// Engine instructed to end
    Stopping,
    /// Artifact produced
    Completed,
    /// Engine failed mid-session
    Failed,
}

impl SessionState {
    /// States in which a new session cannot be started
    pub fn is_active(self) -> bool {
        matches!(
            self,
            SessionState::AwaitingConsent | SessionState::Recording | SessionState::Stopping
        )
    }
}

/// One recording attempt, owned by the controller
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub state: SessionState,
    pub options: RecordingOptions,
    pub output_dir: PathBuf,
    /// File name without extension
    pub file_name: String,
    pub file_extension: String,
    pub started_at: DateTime<Utc>,
    /// Set when the session reaches `Completed` or `Failed`
    pub ended_at: Option<DateTime<Utc>>,
    pub output_path: Option<PathBuf>,
    pub failure: Option<String>,
}

impl Session {
    pub fn new(
        options: RecordingOptions,
        output_dir: PathBuf,
        file_name: String,
        file_extension: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::AwaitingConsent,
            options,
            output_dir,
            file_name,
            file_extension,
            started_at: Utc::now(),
            ended_at: None,
            output_path: None,
            failure: None,
        }
    }

    /// `output_dir/file_name.file_extension`
    pub fn fallback_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.file_name, self.file_extension))
    }

    /// Pick the artifact path: the engine's report when non-empty, else the fallback
    pub fn resolve_output_path(&self, reported: Option<PathBuf>) -> PathBuf {
        reported
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| self.fallback_path())
    }

    pub fn engine_settings(&self, encoder_profile: &str) -> EngineSettings {
        EngineSettings {
            audio_enabled: self.options.mic,
            encoder_profile: encoder_profile.to_string(),
            output_dir: self.output_dir.clone(),
            file_name: self.file_name.clone(),
            file_extension: self.file_extension.clone(),
            notification_description: (!self.options.notification_action_enabled)
                .then(|| STOP_FROM_APP_NOTIFICATION.to_string()),
        }
    }

    /// Move to a resting state and stop the clock
    pub fn finish(&mut self, state: SessionState) {
        self.state = state;
        self.ended_at = Some(Utc::now());
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let elapsed = self
            .ended_at
            .unwrap_or_else(Utc::now)
            .signed_duration_since(self.started_at);
        SessionSnapshot {
            state: self.state,
            session_id: Some(self.id),
            mic_enabled: self.options.mic,
            started_at: Some(self.started_at),
            ended_at: self.ended_at,
            duration_secs: Some(elapsed.num_milliseconds() as f64 / 1000.0),
            output_path: self.output_path.as_ref().map(|p| p.display().to_string()),
            failure: self.failure.clone(),
        }
    }
}

/// Generates artifact file names from the wall clock
///
/// Names are `<prefix><unix millis>`; stamps never repeat within one namer
/// even when two sessions start in the same millisecond.
#[derive(Debug, Clone)]
pub struct FileNamer {
    prefix: String,
    last_stamp: i64,
}

impl FileNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last_stamp: 0,
        }
    }

    pub fn next_name(&mut self, now: DateTime<Utc>) -> String {
        let stamp = now.timestamp_millis().max(self.last_stamp + 1);
        self.last_stamp = stamp;
        format!("{}{}", self.prefix, stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session() -> Session {
        Session::new(
            RecordingOptions::default(),
            PathBuf::from("/a/b"),
            "recording_1000".to_string(),
            "mp4".to_string(),
        )
    }

    #[test]
    fn file_names_use_millis_and_never_repeat() {
        let mut namer = FileNamer::new("recording_");
        let now = Utc.timestamp_millis_opt(1000).unwrap();

        assert_eq!(namer.next_name(now), "recording_1000");
        assert_eq!(namer.next_name(now), "recording_1001");
        assert_eq!(
            namer.next_name(Utc.timestamp_millis_opt(5000).unwrap()),
            "recording_5000"
        );
    }

    #[test]
    fn output_path_prefers_engine_report() {
        let session = session();

        let reported = session.resolve_output_path(Some(PathBuf::from("/engine/out.mp4")));
        assert_eq!(reported, PathBuf::from("/engine/out.mp4"));

        assert_eq!(
            session.resolve_output_path(None),
            PathBuf::from("/a/b/recording_1000.mp4")
        );
        assert_eq!(
            session.resolve_output_path(Some(PathBuf::new())),
            PathBuf::from("/a/b/recording_1000.mp4")
        );
    }

    #[test]
    fn notification_text_only_when_action_disabled() {
        let mut session = session();
        let settings = session.engine_settings("DEFAULT");
        assert!(settings.notification_suppressed());
        assert_eq!(settings.expected_path(), session.fallback_path());

        session.options.notification_action_enabled = true;
        assert!(!session.engine_settings("DEFAULT").notification_suppressed());
    }

    #[test]
    fn duration_stops_when_session_finishes() {
        let mut session = session();
        session.started_at = Utc.timestamp_millis_opt(1_000).unwrap();
        assert!(session.snapshot().ended_at.is_none());

        session.finish(SessionState::Completed);
        session.ended_at = Some(Utc.timestamp_millis_opt(2_500).unwrap());

        let first = session.snapshot();
        assert_eq!(first.state, SessionState::Completed);
        assert_eq!(first.duration_secs, Some(1.5));
        assert_eq!(session.snapshot().duration_secs, first.duration_secs);
    }
}
