//! Session configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `PROCTOR__*` environment variables
//! (e.g. `PROCTOR__ENGAGEMENT__SLEEP_FRAMES=8`).

use std::time::Duration;

use alerting::AlertConfig;
use camera_capture::CameraConfig;
use engagement::EngagementConfig;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "proctor.toml";

/// What a failed frame read does to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameFailurePolicy {
    /// Skip this tick and try again on the next one
    #[default]
    Skip,
    /// End the session
    Stop,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Frame tick period (milliseconds)
    pub tick_ms: u64,

    /// Window focus poll period (milliseconds)
    pub focus_check_ms: u64,

    /// How long the window may stay split before the session ends (milliseconds)
    pub split_screen_ms: u64,

    /// Frame read failure handling
    pub on_frame_failure: FrameFailurePolicy,

    /// Emit JSON log lines
    pub log_json: bool,

    pub camera: CameraConfig,

    pub engagement: EngagementConfig,

    pub alerts: AlertConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            focus_check_ms: 1000,
            split_screen_ms: 5000,
            on_frame_failure: FrameFailurePolicy::Skip,
            log_json: false,
            camera: CameraConfig::default(),
            engagement: EngagementConfig::default(),
            alerts: AlertConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration. The file path comes from the argument, then
    /// `PROCTOR_CONFIG`, then [`DEFAULT_CONFIG_FILE`]; a missing file is fine.
    pub fn load(path: Option<&str>) -> Result<Self, SessionError> {
        let path = Self::resolve_path(path);

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(&path).required(false))
            .add_source(
                ::config::Environment::with_prefix("PROCTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: SessionConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Config file [`load`](Self::load) reads for a given argument
    pub fn resolve_path(path: Option<&str>) -> String {
        path.map(str::to_string)
            .or_else(|| std::env::var("PROCTOR_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string())
    }

    /// Check periods and nested thresholds
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.tick_ms == 0 || self.focus_check_ms == 0 {
            return Err(SessionError::Invalid("tick_ms and focus_check_ms must be positive".into()));
        }
        self.engagement.validate().map_err(SessionError::Invalid)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn focus_check_period(&self) -> Duration {
        Duration::from_millis(self.focus_check_ms)
    }

    pub fn split_screen_delay(&self) -> Duration {
        Duration::from_millis(self.split_screen_ms)
    }
}
