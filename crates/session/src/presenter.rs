//! Presentation seam

use alerting::Alert;
use engagement::{SpeakingStatus, StatusLabel};
use image::RgbImage;
use tracing::{debug, info, warn};

/// Text shown next to the video
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub status: StatusLabel,
    pub speaking: SpeakingStatus,
    /// Stop-talking warning; stays on screen once shown
    pub warning: Option<String>,
    /// Lip opening readout (pixels), `None` without a face
    pub lip_opening: Option<f64>,
    /// Lip width readout (pixels), `None` without a face
    pub lip_width: Option<f64>,
    /// Last pointer position inside the window
    pub pointer: (i32, i32),
    /// Sequence number of the rendered frame
    pub frame_sequence: u32,
}

/// Renders frames and shows alerts to the user
pub trait Presenter {
    /// Show an annotated frame with its status text
    fn render(&mut self, image: &RgbImage, state: &DisplayState);

    /// Show a warning; the session continues
    fn show_alert(&mut self, alert: &Alert);

    /// Show a terminal alert; the session ends right after
    fn show_alert_and_exit(&mut self, alert: &Alert);

    /// Ask the user to confirm closing the window
    fn confirm_quit(&mut self) -> bool {
        true
    }
}

/// Presenter that reports through the log, for headless runs
#[derive(Debug, Default)]
pub struct LogPresenter {
    last: Option<(StatusLabel, SpeakingStatus)>,
    frames: u64,
}

impl LogPresenter {
    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for LogPresenter {
    fn render(&mut self, image: &RgbImage, state: &DisplayState) {
        self.frames += 1;
        let current = (state.status, state.speaking);
        if self.last != Some(current) {
            info!(
                "Status: \"{}\" / {} (frame {})",
                state.status, state.speaking, state.frame_sequence
            );
            self.last = Some(current);
        }
        debug!(
            "Rendered {}x{} frame {}, lip opening {:?}, lip width {:?}, pointer {:?}",
            image.width(),
            image.height(),
            state.frame_sequence,
            state.lip_opening,
            state.lip_width,
            state.pointer
        );
    }

    fn show_alert(&mut self, alert: &Alert) {
        warn!("{}: {}", alert.title, alert.message);
    }

    fn show_alert_and_exit(&mut self, alert: &Alert) {
        warn!("{}: {} (session ending)", alert.title, alert.message);
    }
}
