//! Gaze and head alignment from eye centers versus the nose bridge

use serde::{Deserialize, Serialize};

use crate::config::EngagementConfig;
use crate::landmarks::LandmarkSet;

/// Horizontal direction relative to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GazeDirection {
    Left,
    Right,
    Center,
}

impl GazeDirection {
    pub fn is_center(self) -> bool {
        self == GazeDirection::Center
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GazeDirection::Left => "Left",
            GazeDirection::Right => "Right",
            GazeDirection::Center => "Center",
        }
    }
}

/// Deadband classifier for gaze and head alignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeAlignmentClassifier {
    gaze_deadband: f64,
    head_deadband: f64,
}

impl Default for GazeAlignmentClassifier {
    fn default() -> Self {
        Self::new(&EngagementConfig::default())
    }
}

impl GazeAlignmentClassifier {
    pub fn new(config: &EngagementConfig) -> Self {
        Self {
            gaze_deadband: config.gaze_deadband_px,
            head_deadband: config.head_deadband_px,
        }
    }

    /// Eye midpoint x: floored mean of the two eye centers
    pub fn eye_midpoint_x(landmarks: &LandmarkSet) -> f64 {
        ((landmarks.left_eye_center().x + landmarks.right_eye_center().x) / 2.0).floor()
    }

    /// Compare the eye midpoint to the nose bridge. The deadband is inclusive.
    pub fn classify_gaze(&self, landmarks: &LandmarkSet) -> GazeDirection {
        let midpoint = Self::eye_midpoint_x(landmarks);
        let nose = landmarks.nose_bridge().x;

        if midpoint < nose - self.gaze_deadband {
            GazeDirection::Left
        } else if midpoint > nose + self.gaze_deadband {
            GazeDirection::Right
        } else {
            GazeDirection::Center
        }
    }

    /// Compare the nose bridge to each eye center individually.
    ///
    /// The nose sitting left of the left eye means the head is turned right,
    /// and vice versa. Anything between the two (widened by the deadband) is
    /// centered.
    pub fn classify_head_alignment(&self, landmarks: &LandmarkSet) -> GazeDirection {
        let nose = landmarks.nose_bridge().x;

        if nose < landmarks.left_eye_center().x - self.head_deadband {
            GazeDirection::Right
        } else if nose > landmarks.right_eye_center().x + self.head_deadband {
            GazeDirection::Left
        } else {
            GazeDirection::Center
        }
    }
}
