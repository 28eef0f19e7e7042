//! Alert kinds and their user-facing text

use std::fmt;

use serde::{Deserialize, Serialize};

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Shown to the user, session continues
    Warning,
    /// Shown to the user, then the session ends
    Terminal,
}

/// Everything the monitor can alert on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// Sustained speaking
    StopTalking,
    /// Speaking past the hard limit
    SpeakingLimitExceeded,
    /// Window stayed below half the screen for too long
    SplitScreen,
    /// Monitor window lost input focus
    FocusLost,
    /// Frame source failed and the session is configured to stop
    FrameSourceFailed,
}

impl AlertKind {
    pub fn severity(self) -> Severity {
        match self {
            AlertKind::StopTalking | AlertKind::FocusLost => Severity::Warning,
            AlertKind::SpeakingLimitExceeded | AlertKind::SplitScreen | AlertKind::FrameSourceFailed => {
                Severity::Terminal
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::StopTalking => "stop_talking",
            AlertKind::SpeakingLimitExceeded => "speaking_limit_exceeded",
            AlertKind::SplitScreen => "split_screen",
            AlertKind::FocusLost => "focus_lost",
            AlertKind::FrameSourceFailed => "frame_source_failed",
        }
    }

    /// Dialog title
    pub fn title(self) -> &'static str {
        match self {
            AlertKind::StopTalking => "Speaking Warning",
            AlertKind::SpeakingLimitExceeded => "Speaking Limit",
            AlertKind::SplitScreen => "Split Screen Warning",
            AlertKind::FocusLost => "Focus Warning",
            AlertKind::FrameSourceFailed => "Camera Error",
        }
    }

    /// Dialog body
    pub fn message(self) -> &'static str {
        match self {
            AlertKind::StopTalking => "Please stop talking, otherwise you will be removed from the class",
            AlertKind::SpeakingLimitExceeded => "Speaking duration exceeded long duration. Exiting application.",
            AlertKind::SplitScreen => {
                "The application is in split screen mode for too long! Exiting application."
            }
            AlertKind::FocusLost => "The monitoring window lost focus. Please return to the session.",
            AlertKind::FrameSourceFailed => "Unable to read from the camera. Stopping the session.",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert ready for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn is_terminal(&self) -> bool {
        self.severity == Severity::Terminal
    }
}

impl From<AlertKind> for Alert {
    fn from(kind: AlertKind) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            title: kind.title().to_string(),
            message: kind.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(AlertKind::StopTalking.severity(), Severity::Warning);
        assert_eq!(AlertKind::FocusLost.severity(), Severity::Warning);
        assert_eq!(AlertKind::SpeakingLimitExceeded.severity(), Severity::Terminal);
        assert_eq!(AlertKind::SplitScreen.severity(), Severity::Terminal);
        assert!(Severity::Terminal > Severity::Warning);
    }

    #[test]
    fn test_alert_from_kind() {
        let alert = Alert::from(AlertKind::SplitScreen);
        assert!(alert.is_terminal());
        assert_eq!(alert.title, "Split Screen Warning");
        assert!(alert.message.contains("split screen"));
    }
}
