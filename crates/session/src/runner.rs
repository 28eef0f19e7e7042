//! Session loop
//!
//! One task owns everything: window events, the split-screen deadline, the
//! focus poll, and the frame tick are multiplexed with `select!`. The next
//! tick is scheduled only after the current one finishes, so a slow frame
//! delays the next one instead of piling up.

use std::future::pending;
use std::time::Instant as StdInstant;

use alerting::{Alert, AlertKind, AlertManager};
use camera_capture::FrameSource;
use engagement::overlay::annotate;
use engagement::{EngagementAlert, EngagementModule, FrameAnalysis, LandmarkDetector};
use metrics::{counter, histogram};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::config::{FrameFailurePolicy, SessionConfig};
use crate::presenter::{DisplayState, Presenter};
use crate::stats::SessionStats;
use crate::window::{FocusMonitor, FocusProbe, SplitScreenMonitor, WindowEvent};
use crate::SessionError;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Stop was requested
    Stopped,
    /// The window was closed
    WindowClosed,
    /// The frame source has no more frames
    EndOfStream,
    /// A terminal alert fired
    Alert(AlertKind),
}

/// Outcome of a finished session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub reason: StopReason,
    pub stats: SessionStats,
}

fn alert_kind(alert: EngagementAlert) -> AlertKind {
    match alert {
        EngagementAlert::StopTalking => AlertKind::StopTalking,
        EngagementAlert::SpeakingLimitExceeded => AlertKind::SpeakingLimitExceeded,
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => pending().await,
    }
}

/// A monitoring session over one frame source
pub struct Session<S, D, P> {
    config: SessionConfig,
    source: S,
    engagement: EngagementModule<D>,
    presenter: P,
    alerts: AlertManager,
    focus: FocusMonitor,
    split: SplitScreenMonitor,
    display: DisplayState,
    stats: SessionStats,
    stop: Option<StopReason>,
}

impl<S, D, P> Session<S, D, P>
where
    S: FrameSource,
    D: LandmarkDetector,
    P: Presenter,
{
    pub fn new(config: SessionConfig, source: S, detector: D, presenter: P) -> Result<Self, SessionError> {
        config.validate()?;
        let engagement = EngagementModule::new(config.engagement.clone(), detector)?;

        Ok(Self {
            alerts: AlertManager::new(config.alerts.clone()),
            focus: FocusMonitor::new(config.focus_check_period()),
            split: SplitScreenMonitor::new(config.split_screen_delay()),
            display: DisplayState::default(),
            stats: SessionStats::default(),
            stop: None,
            config,
            source,
            engagement,
            presenter,
        })
    }

    /// Run until stopped, the window closes, the source ends, or a terminal
    /// alert fires. The frame source is released before returning.
    pub async fn run<F: FocusProbe>(&mut self, mut events: mpsc::Receiver<WindowEvent>, probe: &F) -> SessionReport {
        info!("Starting monitoring session (tick {:?})", self.config.tick_period());

        let tick = self.config.tick_period();
        let mut next_tick = Instant::now();
        let mut events_open = true;
        self.focus.start(Instant::now());

        while self.stop.is_none() {
            let split_deadline = self.split.deadline();
            let focus_deadline = self.focus.deadline();

            tokio::select! {
                biased;

                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        debug!("Window event channel closed");
                        events_open = false;
                    }
                },
                _ = sleep_until_some(split_deadline) => self.on_split_timeout(),
                _ = sleep_until_some(focus_deadline) => self.on_focus_poll(probe),
                _ = time::sleep_until(next_tick) => {
                    self.tick();
                    next_tick = Instant::now() + tick;
                }
            }
        }

        self.shutdown()
    }

    /// Process one window event
    pub fn handle_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::FocusIn => self.focus.start(Instant::now()),
            WindowEvent::FocusOut => debug!("Window focus out"),
            WindowEvent::Configure(geometry) => self.split.on_configure(geometry, Instant::now()),
            WindowEvent::PointerMoved { x, y } => self.display.pointer = (x, y),
            WindowEvent::CloseRequested => {
                if self.presenter.confirm_quit() {
                    self.request_stop(StopReason::WindowClosed);
                } else {
                    info!("Close cancelled");
                }
            }
            WindowEvent::StopRequested => self.request_stop(StopReason::Stopped),
        }
    }

    /// Read, analyze and present one frame
    fn tick(&mut self) {
        let frame = match self.source.read() {
            Ok(frame) => frame,
            Err(e) if e.is_end_of_stream() => {
                info!("Frame source exhausted: {}", e);
                self.request_stop(StopReason::EndOfStream);
                return;
            }
            Err(e) => {
                counter!("proctor_frame_failures_total").increment(1);
                match self.config.on_frame_failure {
                    FrameFailurePolicy::Skip => {
                        warn!("Frame read failed, skipping tick: {}", e);
                        self.stats.frames_skipped += 1;
                    }
                    FrameFailurePolicy::Stop => {
                        error!("Frame read failed: {}", e);
                        self.raise(AlertKind::FrameSourceFailed);
                    }
                }
                return;
            }
        };
        self.stats.frames_read += 1;

        let started = StdInstant::now();
        let analysis = match self.engagement.analyze(&frame) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Analysis failed for frame {}: {}", frame.sequence, e);
                self.stats.frames_skipped += 1;
                return;
            }
        };

        self.display.status = analysis.status;
        self.display.speaking = analysis.speaking;
        self.display.frame_sequence = frame.sequence;
        self.display.lip_opening = analysis.lip.map(|lip| lip.opening);
        self.display.lip_width = analysis.lip.map(|lip| lip.width);

        for alert in &analysis.alerts {
            self.raise(alert_kind(*alert));
        }

        if self.stop.is_none() {
            self.present(&frame, &analysis);
        }

        let elapsed = started.elapsed();
        self.stats.record_frame(elapsed, analysis.face_detected);
        counter!("proctor_frames_processed_total").increment(1);
        histogram!("proctor_frame_processing_seconds").record(elapsed.as_secs_f64());
    }

    fn present(&mut self, frame: &camera_capture::VideoFrame, analysis: &FrameAnalysis) {
        match annotate(frame, analysis) {
            Ok(image) => self.presenter.render(&image, &self.display),
            Err(e) => warn!("Failed to annotate frame {}: {}", frame.sequence, e),
        }
    }

    fn on_split_timeout(&mut self) {
        self.split.cancel();
        warn!("Window stayed split for {:?}", self.config.split_screen_delay());
        self.raise(AlertKind::SplitScreen);
    }

    fn on_focus_poll<F: FocusProbe>(&mut self, probe: &F) {
        if self.focus.poll(probe.is_focused(), Instant::now()) {
            self.raise(AlertKind::FocusLost);
        }
    }

    /// Show an alert unless it is cooling down. Terminal alerts end the session.
    fn raise(&mut self, kind: AlertKind) {
        if !self.alerts.try_fire(kind) {
            return;
        }
        counter!("proctor_alerts_total", "kind" => kind.as_str()).increment(1);

        let alert = Alert::from(kind);
        if alert.is_terminal() {
            self.presenter.show_alert_and_exit(&alert);
            self.request_stop(StopReason::Alert(kind));
        } else {
            // only the speaking warning is written to the warning line
            if kind == AlertKind::StopTalking {
                self.display.warning = Some(alert.message.clone());
            }
            self.presenter.show_alert(&alert);
        }
    }

    fn request_stop(&mut self, reason: StopReason) {
        if self.stop.is_none() {
            info!("Stopping session: {:?}", reason);
            self.stop = Some(reason);
        }
    }

    fn shutdown(&mut self) -> SessionReport {
        self.focus.stop();
        self.split.cancel();
        self.source.release();

        let reason = self.stop.take().unwrap_or(StopReason::Stopped);
        let stats = self.stats.clone();
        info!(
            "Session ended ({:?}): {} frames read, {} processed, {} skipped, {} without face, avg {:?}",
            reason,
            stats.frames_read,
            stats.frames_processed,
            stats.frames_skipped,
            stats.frames_without_face,
            stats.average_processing_time()
        );

        SessionReport { reason, stats }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn engagement(&self) -> &EngagementModule<D> {
        &self.engagement
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.alerts
    }
}
