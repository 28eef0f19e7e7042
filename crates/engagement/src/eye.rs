//! Eye aspect ratio and blink classification

use serde::{Deserialize, Serialize};

use crate::config::EngagementConfig;
use crate::geometry::distance;
use crate::landmarks::EyeContour;

/// Discrete eye openness
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlinkState {
    Closed = 0,
    PartiallyClosed = 1,
    Open = 2,
}

impl BlinkState {
    pub fn is_closed(self) -> bool {
        self == BlinkState::Closed
    }
}

/// Per-eye measurement for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeReading {
    pub ratio: f64,
    pub state: BlinkState,
}

/// Both eyes for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyePair {
    pub left: EyeReading,
    pub right: EyeReading,
}

impl EyePair {
    /// A frame counts as eyes-closed when either eye is fully closed
    pub fn any_closed(&self) -> bool {
        self.left.state.is_closed() || self.right.state.is_closed()
    }
}

/// Ratio of lid opening to eye width.
///
/// `(|p2 - p6| + |p3 - p5|) / (2 * |p1 - p4|)` with the contour in landmark
/// order. A zero-width contour gives NaN or infinity.
pub fn eye_aspect_ratio(contour: &EyeContour) -> f64 {
    let [p1, p2, p3, p4, p5, p6] = *contour;
    let vertical = distance(p2, p6) + distance(p3, p5);
    let horizontal = distance(p1, p4);
    vertical / (2.0 * horizontal)
}

/// Threshold ladder mapping eye aspect ratios to blink states
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeStateClassifier {
    open_ratio: f64,
    partial_ratio: f64,
}

impl Default for EyeStateClassifier {
    fn default() -> Self {
        Self::new(&EngagementConfig::default())
    }
}

impl EyeStateClassifier {
    pub fn new(config: &EngagementConfig) -> Self {
        Self {
            open_ratio: config.eye_open_ratio,
            partial_ratio: config.eye_partial_ratio,
        }
    }

    /// Classify a ratio. NaN falls through to `Closed`.
    pub fn classify_ratio(&self, ratio: f64) -> BlinkState {
        if ratio > self.open_ratio {
            BlinkState::Open
        } else if ratio > self.partial_ratio {
            BlinkState::PartiallyClosed
        } else {
            BlinkState::Closed
        }
    }

    pub fn classify_blink(&self, contour: &EyeContour) -> BlinkState {
        self.classify_ratio(eye_aspect_ratio(contour))
    }

    pub fn read(&self, contour: &EyeContour) -> EyeReading {
        let ratio = eye_aspect_ratio(contour);
        EyeReading {
            ratio,
            state: self.classify_ratio(ratio),
        }
    }
}
