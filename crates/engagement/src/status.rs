//! Display statuses derived from the state machines

use std::fmt;

use serde::{Deserialize, Serialize};

/// Latched eye activity from the drowsiness counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EyeActivity {
    Active,
    NotActive,
}

/// Resolved attention status shown to the user.
///
/// Ordered by display priority: a lost focus outranks the eye signal, which
/// outranks the initial pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusLabel {
    /// Nothing latched yet; renders as an empty string
    #[default]
    Pending,
    Active,
    NotActive,
    NotFocused,
}

impl StatusLabel {
    /// Resolve the label from the two independent signals
    pub fn resolve(eye: Option<EyeActivity>, not_focused: bool) -> Self {
        if not_focused {
            return StatusLabel::NotFocused;
        }
        match eye {
            Some(EyeActivity::NotActive) => StatusLabel::NotActive,
            Some(EyeActivity::Active) => StatusLabel::Active,
            None => StatusLabel::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusLabel::Pending => "",
            StatusLabel::Active => "Active",
            StatusLabel::NotActive => "Not Active",
            StatusLabel::NotFocused => "Not Focused",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speaking indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeakingStatus {
    #[default]
    NotSpeaking,
    Speaking,
}

impl SpeakingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SpeakingStatus::NotSpeaking => "Not Speaking",
            SpeakingStatus::Speaking => "Speaking",
        }
    }
}

impl fmt::Display for SpeakingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
