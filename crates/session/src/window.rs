//! Window focus and split-screen tracking

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

/// Window and screen size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub width: u32,
    pub height: u32,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl WindowGeometry {
    /// Window is narrower or shorter than half the screen
    pub fn is_split(&self) -> bool {
        self.width < self.screen_width / 2 || self.height < self.screen_height / 2
    }
}

/// Events forwarded from the windowing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    FocusIn,
    FocusOut,
    /// Window was moved or resized
    Configure(WindowGeometry),
    PointerMoved { x: i32, y: i32 },
    /// User asked to close the window
    CloseRequested,
    /// User pressed stop
    StopRequested,
}

/// Answers whether the monitor window currently holds input focus
pub trait FocusProbe {
    fn is_focused(&self) -> bool;
}

/// Probe with a fixed answer, for headless runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFocus(pub bool);

impl FocusProbe for FixedFocus {
    fn is_focused(&self) -> bool {
        self.0
    }
}

/// Periodic focus poll. Stops after reporting a loss until the next focus-in.
#[derive(Debug)]
pub struct FocusMonitor {
    interval: Duration,
    next_poll: Option<Instant>,
}

impl FocusMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_poll: None,
        }
    }

    /// Start polling unless a poll is already scheduled
    pub fn start(&mut self, now: Instant) {
        if self.next_poll.is_none() {
            debug!("Focus polling every {:?}", self.interval);
            self.next_poll = Some(now + self.interval);
        }
    }

    pub fn stop(&mut self) {
        self.next_poll = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next_poll
    }

    pub fn is_polling(&self) -> bool {
        self.next_poll.is_some()
    }

    /// Handle a due poll. Returns true when focus was lost.
    pub fn poll(&mut self, focused: bool, now: Instant) -> bool {
        if focused {
            self.next_poll = Some(now + self.interval);
            false
        } else {
            info!("Window focus lost, polling paused until focus returns");
            self.next_poll = None;
            true
        }
    }
}

/// One-shot timer armed while the window is split
#[derive(Debug)]
pub struct SplitScreenMonitor {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SplitScreenMonitor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm or cancel the timer for a new geometry
    pub fn on_configure(&mut self, geometry: WindowGeometry, now: Instant) {
        if geometry.is_split() {
            if self.deadline.is_none() {
                info!(
                    "Window split ({}x{} on {}x{}), warning in {:?}",
                    geometry.width, geometry.height, geometry.screen_width, geometry.screen_height, self.delay
                );
                self.deadline = Some(now + self.delay);
            }
        } else if self.deadline.take().is_some() {
            info!("Window restored, split-screen timer cancelled");
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
