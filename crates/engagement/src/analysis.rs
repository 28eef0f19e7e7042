//! Per-frame analysis results and alerts

use serde::{Deserialize, Serialize};

use crate::detector::FaceRegion;
use crate::eye::EyePair;
use crate::gaze::GazeDirection;
use crate::landmarks::LandmarkSet;
use crate::lip::{LipEscalation, LipReading};
use crate::state::ClassifierState;
use crate::status::{SpeakingStatus, StatusLabel};

/// Alerts raised by the engagement signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementAlert {
    /// Sustained speaking; user is asked to stop talking
    StopTalking,

    /// Speaking went on past the hard limit; session must end
    SpeakingLimitExceeded,
}

impl EngagementAlert {
    /// Whether this alert ends the session
    pub fn is_terminal(self) -> bool {
        matches!(self, EngagementAlert::SpeakingLimitExceeded)
    }
}

impl From<LipEscalation> for EngagementAlert {
    fn from(escalation: LipEscalation) -> Self {
        match escalation {
            LipEscalation::Warning => EngagementAlert::StopTalking,
            LipEscalation::Terminate => EngagementAlert::SpeakingLimitExceeded,
        }
    }
}

/// Complete analysis of one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Whether a face was detected
    pub face_detected: bool,

    /// Number of faces the detector returned
    pub face_count: usize,

    /// Face used for classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceRegion>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<LandmarkSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyes: Option<EyePair>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gaze: Option<GazeDirection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_alignment: Option<GazeDirection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lip: Option<LipReading>,

    /// Resolved attention status after this frame
    pub status: StatusLabel,

    /// Speaking indicator after this frame
    pub speaking: SpeakingStatus,

    /// Counters after this frame
    pub state: ClassifierState,

    /// Alerts raised by this frame
    pub alerts: Vec<EngagementAlert>,
}

impl FrameAnalysis {
    /// Check if any alerts were raised
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Terminal alert raised by this frame, if any
    pub fn terminal_alert(&self) -> Option<EngagementAlert> {
        self.alerts.iter().copied().find(|alert| alert.is_terminal())
    }
}
