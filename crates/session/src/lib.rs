//! Monitoring Session
//!
//! Drives one proctoring session on a single task: a frame tick feeding the
//! engagement analysis, a periodic focus poll, and a one-shot split-screen
//! timer, all cancelled together when the session stops.

pub mod config;
pub mod presenter;
pub mod runner;
pub mod stats;
pub mod window;

pub use crate::config::{FrameFailurePolicy, SessionConfig};
pub use presenter::{DisplayState, LogPresenter, Presenter};
pub use runner::{Session, SessionReport, StopReason};
pub use stats::SessionStats;
pub use window::{FixedFocus, FocusProbe, WindowEvent, WindowGeometry};

use camera_capture::CameraError;
use engagement::EngagementError;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Engagement error: {0}")]
    Engagement(#[from] EngagementError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Initialize logging. `RUST_LOG` overrides the default `info` level.
pub fn init_logging(json: bool) -> Result<(), SessionError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| SessionError::Logging(e.to_string()))
}
