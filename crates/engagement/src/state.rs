//! Classifier state tracked across frames

use serde::{Deserialize, Serialize};

use crate::status::{EyeActivity, StatusLabel};

/// Drowsiness-side counters and latched signals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrowsinessState {
    /// Consecutive frames with at least one closed eye
    pub sleep: u32,
    /// Off-center gaze frames since the last eye update
    pub drowsy: u32,
    /// Consecutive frames with both eyes open or partially closed
    pub active: u32,
    /// Consecutive off-center gaze frames
    pub movement: u32,
    /// Last latched eye activity
    pub eye_activity: Option<EyeActivity>,
    /// Gaze has been off-center long enough
    pub not_focused: bool,
}

impl DrowsinessState {
    pub fn status(&self) -> StatusLabel {
        StatusLabel::resolve(self.eye_activity, self.not_focused)
    }
}

/// Lip-side counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LipState {
    /// Consecutive frames with an open, moving mouth
    pub speaking_frames: u32,
}

/// Everything the per-frame state machines carry between frames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierState {
    pub drowsiness: DrowsinessState,
    pub lip: LipState,
    /// Consecutive frames where no face was found
    pub face_absent_frames: u32,
}

impl ClassifierState {
    /// Resolved attention status
    pub fn status(&self) -> StatusLabel {
        self.drowsiness.status()
    }

    /// Clear the signal counters and latched statuses, keeping face tracking
    pub fn reset_counters(&mut self) {
        self.drowsiness = DrowsinessState::default();
        self.lip = LipState::default();
    }

    /// Reset state (new session)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
