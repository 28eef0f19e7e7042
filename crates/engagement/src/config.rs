//! Engagement configuration

use serde::{Deserialize, Serialize};

/// What happens to the classifier counters on frames without a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoFacePolicy {
    /// Leave every counter untouched
    #[default]
    Hold,
    /// Clear all counters and latched status
    Reset,
}

/// Landmark detector backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Recorded detections from a JSON-lines file
    #[default]
    Replay,
    /// ONNX face + landmark models (requires the `onnx` feature)
    Onnx,
}

/// Engagement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Eye aspect ratio above which an eye is open
    pub eye_open_ratio: f64,

    /// Eye aspect ratio above which an eye is partially closed
    pub eye_partial_ratio: f64,

    /// Consecutive closed-eye frames before "Not Active" (strictly greater)
    pub sleep_frames: u32,

    /// Consecutive open-eye frames before "Active" (strictly greater)
    pub active_frames: u32,

    /// Consecutive off-center gaze frames before "Not Focused" (strictly greater)
    pub movement_frames: u32,

    /// Gaze deadband around the nose bridge (pixels)
    pub gaze_deadband_px: f64,

    /// Head alignment deadband outside the eye centers (pixels)
    pub head_deadband_px: f64,

    /// Lip opening above which the mouth counts as open (pixels)
    pub lip_opening_px: f64,

    /// Mouth width above which the lips count as moving (pixels)
    pub lip_width_px: f64,

    /// Consecutive speaking frames before the stop-talking warning
    pub speaking_frames: u32,

    /// Consecutive speaking frames before the session is terminated
    pub speaking_limit_frames: u32,

    /// Counter behavior when no face is found
    pub no_face_policy: NoFacePolicy,

    /// Detector backend
    pub detector: DetectorKind,

    /// Landmark model path (replay file or ONNX model)
    pub landmark_model_path: String,

    /// Optional face detection model path (ONNX backend only)
    pub face_model_path: Option<String>,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            eye_open_ratio: 0.25,
            eye_partial_ratio: 0.21,
            sleep_frames: 6,
            active_frames: 6,
            movement_frames: 3,
            gaze_deadband_px: 20.0,
            head_deadband_px: 10.0,
            lip_opening_px: 20.0,
            lip_width_px: 18.0,
            speaking_frames: 15,
            speaking_limit_frames: 100,
            no_face_policy: NoFacePolicy::Hold,
            detector: DetectorKind::Replay,
            landmark_model_path: "landmarks.jsonl".to_string(),
            face_model_path: None,
        }
    }
}

impl EngagementConfig {
    /// Check threshold ordering
    pub fn validate(&self) -> Result<(), String> {
        if self.eye_partial_ratio > self.eye_open_ratio {
            return Err(format!(
                "eye_partial_ratio ({}) must not exceed eye_open_ratio ({})",
                self.eye_partial_ratio, self.eye_open_ratio
            ));
        }
        if self.speaking_limit_frames <= self.speaking_frames {
            return Err(format!(
                "speaking_limit_frames ({}) must exceed speaking_frames ({})",
                self.speaking_limit_frames, self.speaking_frames
            ));
        }
        if self.gaze_deadband_px < 0.0 || self.head_deadband_px < 0.0 {
            return Err("deadbands must be non-negative".to_string());
        }
        Ok(())
    }
}
