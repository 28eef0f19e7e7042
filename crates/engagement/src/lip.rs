//! Mouth activity ("speaking") detection with two-tier escalation

use serde::{Deserialize, Serialize};

use crate::config::EngagementConfig;
use crate::geometry::{horizontal_span, vertical_span};
use crate::landmarks::LandmarkSet;
use crate::state::LipState;
use crate::status::SpeakingStatus;

/// Escalation raised on the frame a threshold is first crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LipEscalation {
    /// Soft warning: stop talking
    Warning,
    /// Speaking went on too long; end the session
    Terminate,
}

/// Lip measurements and derived status for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LipReading {
    /// y(57) - y(51)
    pub opening: f64,
    /// x(54) - x(48)
    pub width: f64,
    /// Whether this frame qualified as a speaking frame
    pub moving: bool,
    /// Counter value after this frame
    pub speaking_frames: u32,
    pub status: SpeakingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<LipEscalation>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LipActivityStateMachine {
    opening_threshold: f64,
    width_threshold: f64,
    warning_frames: u32,
    limit_frames: u32,
}

impl Default for LipActivityStateMachine {
    fn default() -> Self {
        Self::new(&EngagementConfig::default())
    }
}

impl LipActivityStateMachine {
    pub fn new(config: &EngagementConfig) -> Self {
        Self {
            opening_threshold: config.lip_opening_px,
            width_threshold: config.lip_width_px,
            warning_frames: config.speaking_frames,
            limit_frames: config.speaking_limit_frames,
        }
    }

    /// Vertical lip opening and horizontal mouth width
    pub fn measure(landmarks: &LandmarkSet) -> (f64, f64) {
        (
            vertical_span(landmarks.upper_lip_top(), landmarks.lower_lip_bottom()),
            horizontal_span(landmarks.mouth_left(), landmarks.mouth_right()),
        )
    }

    pub fn step(&self, state: &mut LipState, landmarks: &LandmarkSet) -> LipReading {
        let (opening, width) = Self::measure(landmarks);
        self.step_measured(state, opening, width)
    }

    /// Advance the counter from raw measurements
    pub fn step_measured(&self, state: &mut LipState, opening: f64, width: f64) -> LipReading {
        let moving = opening > self.opening_threshold && width > self.width_threshold;
        let previous = state.speaking_frames;

        state.speaking_frames = if moving {
            previous.saturating_add(1)
        } else {
            0
        };
        let frames = state.speaking_frames;

        let crossed = |threshold: u32| previous <= threshold && frames > threshold;
        let escalation = if crossed(self.limit_frames) {
            Some(LipEscalation::Terminate)
        } else if crossed(self.warning_frames) {
            Some(LipEscalation::Warning)
        } else {
            None
        };

        let status = if frames > self.warning_frames {
            SpeakingStatus::Speaking
        } else {
            SpeakingStatus::NotSpeaking
        };

        LipReading {
            opening,
            width,
            moving,
            speaking_frames: frames,
            status,
            escalation,
        }
    }
}
