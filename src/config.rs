use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::consent::ConsentPolicy;
use crate::controller::ControllerConfig;
use crate::engine::DEFAULT_ENCODER_PROFILE;
use crate::storage::{DirectoryKind, FsStorage};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub consent: ConsentConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub file_prefix: String,
    pub file_extension: String,
    pub encoder_profile: String,
    pub default_directory: DirectoryKind,
    /// Unset means wait forever
    pub consent_timeout_ms: Option<u64>,
    pub start_timeout_ms: Option<u64>,
    pub stop_timeout_ms: Option<u64>,
    pub event_capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            file_prefix: "recording_".to_string(),
            file_extension: "mp4".to_string(),
            encoder_profile: DEFAULT_ENCODER_PROFILE.to_string(),
            default_directory: DirectoryKind::Cache,
            consent_timeout_ms: None,
            start_timeout_ms: None,
            stop_timeout_ms: None,
            event_capacity: 100,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub cache_dir: String,
    pub private_dir: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    pub policy: ConsentPolicy,
    pub delay_ms: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("SCREEN_MIC_RECORDER").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn controller(&self) -> ControllerConfig {
        let recorder = &self.recorder;
        ControllerConfig {
            file_prefix: recorder.file_prefix.clone(),
            file_extension: recorder.file_extension.clone(),
            encoder_profile: recorder.encoder_profile.clone(),
            default_directory: recorder.default_directory,
            consent_timeout: recorder.consent_timeout_ms.map(Duration::from_millis),
            start_timeout: recorder.start_timeout_ms.map(Duration::from_millis),
            stop_timeout: recorder.stop_timeout_ms.map(Duration::from_millis),
            event_capacity: recorder.event_capacity,
        }
    }

    pub fn storage(&self) -> FsStorage {
        FsStorage::from_config(&self.storage.cache_dir, &self.storage.private_dir)
    }

    pub fn consent_delay(&self) -> Duration {
        Duration::from_millis(self.consent.delay_ms)
    }
}
