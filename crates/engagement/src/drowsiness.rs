//! Debounced eye-activity and focus tracking
//!
//! Single-frame closures or glances never flip the displayed status. Eye
//! activity latches after `sleep_frames` / `active_frames` consecutive
//! frames and stays latched until the opposite condition is sustained for as
//! long. Focus is lost after `movement_frames` consecutive off-center frames
//! and restored by the first centered frame.

use crate::config::EngagementConfig;
use crate::eye::EyePair;
use crate::gaze::GazeDirection;
use crate::state::DrowsinessState;
use crate::status::{EyeActivity, StatusLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrowsinessStateMachine {
    sleep_frames: u32,
    active_frames: u32,
    movement_frames: u32,
}

impl Default for DrowsinessStateMachine {
    fn default() -> Self {
        Self::new(&EngagementConfig::default())
    }
}

impl DrowsinessStateMachine {
    pub fn new(config: &EngagementConfig) -> Self {
        Self {
            sleep_frames: config.sleep_frames,
            active_frames: config.active_frames,
            movement_frames: config.movement_frames,
        }
    }

    /// Advance the counters by one frame and return the resolved status
    pub fn step(&self, state: &mut DrowsinessState, eyes: &EyePair, gaze: GazeDirection) -> StatusLabel {
        if eyes.any_closed() {
            state.sleep = state.sleep.saturating_add(1);
            state.drowsy = 0;
            state.active = 0;
            if state.sleep > self.sleep_frames {
                state.eye_activity = Some(EyeActivity::NotActive);
            }
        } else {
            state.drowsy = 0;
            state.sleep = 0;
            state.active = state.active.saturating_add(1);
            if state.active > self.active_frames {
                state.eye_activity = Some(EyeActivity::Active);
            }
        }

        if gaze.is_center() {
            state.movement = 0;
            state.not_focused = false;
        } else {
            state.drowsy = state.drowsy.saturating_add(1);
            state.movement = state.movement.saturating_add(1);
            if state.movement > self.movement_frames {
                state.not_focused = true;
            }
        }

        state.status()
    }
}
