//! Camera Capture Library
//!
//! Frame acquisition for the engagement monitor:
//! - `VideoFrame`: decoded RGB frame with grayscale and `image` conversions
//! - `FrameSource`: the capture seam the session loop reads from
//! - `ImageSequenceSource`: replays a directory of still images as a camera

pub mod frame;
pub mod source;

pub use frame::VideoFrame;
pub use source::{FrameSource, ImageSequenceSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("Frame read failed: {0}")]
    Read(String),

    #[error("Invalid frame: {0}")]
    Format(String),

    #[error("End of stream")]
    EndOfStream,

    #[error("Camera not initialized")]
    NotInitialized,
}

impl CameraError {
    /// Whether the source can never produce another frame
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, CameraError::EndOfStream | CameraError::NotInitialized)
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Frame directory for the image-sequence source
    pub device: String,
    /// Output width; frames are resized when both width and height are set
    pub width: Option<u32>,
    /// Output height
    pub height: Option<u32>,
    /// Restart from the first image once the sequence is exhausted
    pub repeat: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "frames".to_string(),
            width: Some(640),
            height: Some(480),
            repeat: false,
        }
    }
}

impl CameraConfig {
    /// Target frame size, if resizing is configured
    pub fn target_size(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}
