//! End-to-end session loop tests on paused time

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use alerting::{Alert, AlertKind};
use camera_capture::{CameraError, FrameSource, VideoFrame};
use engagement::detector::{ReplayFace, ReplayFrame};
use engagement::landmarks::{LEFT_EYE, LOWER_LIP_BOTTOM, MOUTH_LEFT, MOUTH_RIGHT, NOSE_BRIDGE, RIGHT_EYE, UPPER_LIP_TOP};
use engagement::{FaceRegion, LandmarkSet, Point, ReplayDetector, StatusLabel};
use image::RgbImage;
use session::{
    DisplayState, FixedFocus, FrameFailurePolicy, Presenter, Session, SessionConfig, StopReason, WindowEvent,
    WindowGeometry,
};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

struct ScriptedSource {
    frames: VecDeque<Result<VideoFrame, CameraError>>,
    endless: bool,
    released: Rc<Cell<bool>>,
}

impl ScriptedSource {
    fn frames(count: usize) -> Self {
        Self {
            frames: (0..count).map(|i| Ok(frame(i as u32))).collect(),
            endless: false,
            released: Rc::new(Cell::new(false)),
        }
    }

    fn script(frames: Vec<Result<VideoFrame, CameraError>>) -> Self {
        Self {
            frames: frames.into(),
            endless: false,
            released: Rc::new(Cell::new(false)),
        }
    }

    fn endless() -> Self {
        Self {
            frames: VecDeque::new(),
            endless: true,
            released: Rc::new(Cell::new(false)),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn read(&mut self) -> Result<VideoFrame, CameraError> {
        if self.released.get() {
            return Err(CameraError::NotInitialized);
        }
        match self.frames.pop_front() {
            Some(next) => next,
            None if self.endless => Ok(frame(0)),
            None => Err(CameraError::EndOfStream),
        }
    }

    fn release(&mut self) {
        self.released.set(true);
    }
}

#[derive(Default)]
struct RecordingPresenter {
    rendered: usize,
    last_display: Option<DisplayState>,
    warnings: Vec<AlertKind>,
    exits: Vec<AlertKind>,
    refuse_quit: bool,
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, _image: &RgbImage, display: &DisplayState) {
        self.rendered += 1;
        self.last_display = Some(display.clone());
    }

    fn show_alert(&mut self, alert: &Alert) {
        self.warnings.push(alert.kind);
    }

    fn show_alert_and_exit(&mut self, alert: &Alert) {
        self.exits.push(alert.kind);
    }

    fn confirm_quit(&mut self) -> bool {
        !self.refuse_quit
    }
}

fn frame(sequence: u32) -> VideoFrame {
    let mut frame = VideoFrame::filled(64, 48, [90, 90, 90]);
    frame.sequence = sequence;
    frame
}

fn eye(cx: f64, ratio: f64) -> [Point; 6] {
    let half_width = 15.0;
    let h = ratio * half_width;
    [
        Point::new(cx - half_width, 100.0),
        Point::new(cx - 5.0, 100.0 - h),
        Point::new(cx + 5.0, 100.0 - h),
        Point::new(cx + half_width, 100.0),
        Point::new(cx + 5.0, 100.0 + h),
        Point::new(cx - 5.0, 100.0 + h),
    ]
}

/// Frontal face centered on x=150 with both eyes at `eye_ratio`
fn face(eye_ratio: f64, lip_opening: f64, lip_width: f64) -> LandmarkSet {
    let mut points = vec![Point::new(150.0, 200.0); 68];
    points[NOSE_BRIDGE] = Point::new(150.0, 110.0);
    for (i, p) in eye(100.0, eye_ratio).into_iter().enumerate() {
        points[LEFT_EYE.start + i] = p;
    }
    for (i, p) in eye(200.0, eye_ratio).into_iter().enumerate() {
        points[RIGHT_EYE.start + i] = p;
    }
    points[MOUTH_LEFT] = Point::new(150.0 - lip_width / 2.0, 220.0);
    points[MOUTH_RIGHT] = Point::new(150.0 + lip_width / 2.0, 220.0);
    points[UPPER_LIP_TOP] = Point::new(150.0, 220.0 - lip_opening / 2.0);
    points[LOWER_LIP_BOTTOM] = Point::new(150.0, 220.0 + lip_opening / 2.0);
    LandmarkSet::new(points).unwrap()
}

fn replay(landmarks: LandmarkSet) -> ReplayDetector {
    ReplayDetector::from_frames(vec![ReplayFrame {
        faces: vec![ReplayFace {
            region: FaceRegion::new(8.0, 8.0, 40.0, 32.0),
            landmarks,
        }],
    }])
    .unwrap()
}

fn attentive() -> ReplayDetector {
    replay(face(0.3, 10.0, 40.0))
}

fn talking() -> ReplayDetector {
    replay(face(0.3, 25.0, 20.0))
}

fn split_geometry() -> WindowGeometry {
    WindowGeometry {
        width: 800,
        height: 1080,
        screen_width: 1920,
        screen_height: 1080,
    }
}

fn full_geometry() -> WindowGeometry {
    WindowGeometry {
        width: 1920,
        height: 1080,
        screen_width: 1920,
        screen_height: 1080,
    }
}

fn new_session<S: FrameSource>(
    source: S,
    detector: ReplayDetector,
    config: SessionConfig,
) -> Session<S, ReplayDetector, RecordingPresenter> {
    Session::new(config, source, detector, RecordingPresenter::default()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_end_of_stream_stops_and_releases() {
    let source = ScriptedSource::frames(3);
    let released = source.released.clone();
    let mut session = new_session(source, attentive(), SessionConfig::default());

    let (tx, rx) = mpsc::channel(4);
    drop(tx);
    let report = session.run(rx, &FixedFocus(true)).await;

    assert_eq!(report.reason, StopReason::EndOfStream);
    assert_eq!(report.stats.frames_read, 3);
    assert_eq!(report.stats.frames_processed, 3);
    assert_eq!(session.presenter().rendered, 3);
    assert!(released.get());

    let display = session.presenter().last_display.clone().unwrap();
    assert_eq!(display.status, StatusLabel::Pending);
    assert_eq!(display.frame_sequence, 2);
    assert_eq!(display.lip_opening, Some(10.0));
    assert_eq!(display.lip_width, Some(40.0));
    assert_eq!(display.warning, None);
}

#[tokio::test(start_paused = true)]
async fn test_speaking_warns_once_then_ends_session() {
    let mut session = new_session(ScriptedSource::frames(300), talking(), SessionConfig::default());

    let (_tx, rx) = mpsc::channel(4);
    let report = session.run(rx, &FixedFocus(true)).await;

    assert_eq!(report.reason, StopReason::Alert(AlertKind::SpeakingLimitExceeded));
    assert_eq!(report.stats.frames_processed, 101);

    let presenter = session.presenter();
    assert_eq!(presenter.warnings, vec![AlertKind::StopTalking]);
    assert_eq!(presenter.exits, vec![AlertKind::SpeakingLimitExceeded]);
    // the terminating frame is not rendered
    assert_eq!(presenter.rendered, 100);

    let display = presenter.last_display.clone().unwrap();
    assert_eq!(display.warning.as_deref(), Some(AlertKind::StopTalking.message()));
    assert_eq!(display.lip_opening, Some(25.0));
    assert_eq!(display.lip_width, Some(20.0));
}

#[tokio::test(start_paused = true)]
async fn test_focus_loss_keeps_speaking_warning_line() {
    let config = SessionConfig {
        focus_check_ms: 500,
        ..Default::default()
    };
    let mut session = new_session(ScriptedSource::endless(), talking(), config);

    let (tx, rx) = mpsc::channel(4);
    tokio::spawn(async move {
        // past the stop-talking warning and the first focus poll, short of the limit
        sleep(Duration::from_millis(800)).await;
        tx.send(WindowEvent::StopRequested).await.unwrap();
    });

    let report = session.run(rx, &FixedFocus(false)).await;
    assert_eq!(report.reason, StopReason::Stopped);

    let presenter = session.presenter();
    assert_eq!(presenter.warnings, vec![AlertKind::StopTalking, AlertKind::FocusLost]);
    let display = presenter.last_display.clone().unwrap();
    assert_eq!(display.warning.as_deref(), Some(AlertKind::StopTalking.message()));
}

#[tokio::test(start_paused = true)]
async fn test_short_speech_only_warns() {
    let mut session = new_session(ScriptedSource::frames(40), talking(), SessionConfig::default());

    let (_tx, rx) = mpsc::channel(4);
    let report = session.run(rx, &FixedFocus(true)).await;

    assert_eq!(report.reason, StopReason::EndOfStream);
    assert_eq!(session.presenter().warnings, vec![AlertKind::StopTalking]);
    assert!(session.presenter().exits.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_read_failure_is_skipped_by_default() {
    let source = ScriptedSource::script(vec![
        Ok(frame(0)),
        Err(CameraError::Read("device busy".into())),
        Ok(frame(1)),
    ]);
    let mut session = new_session(source, attentive(), SessionConfig::default());

    let (_tx, rx) = mpsc::channel(4);
    let report = session.run(rx, &FixedFocus(true)).await;

    assert_eq!(report.reason, StopReason::EndOfStream);
    assert_eq!(report.stats.frames_skipped, 1);
    assert_eq!(report.stats.frames_processed, 2);
}

#[tokio::test(start_paused = true)]
async fn test_read_failure_stops_when_configured() {
    let source = ScriptedSource::script(vec![
        Ok(frame(0)),
        Err(CameraError::Read("device unplugged".into())),
        Ok(frame(1)),
    ]);
    let config = SessionConfig {
        on_frame_failure: FrameFailurePolicy::Stop,
        ..Default::default()
    };
    let mut session = new_session(source, attentive(), config);

    let (_tx, rx) = mpsc::channel(4);
    let report = session.run(rx, &FixedFocus(true)).await;

    assert_eq!(report.reason, StopReason::Alert(AlertKind::FrameSourceFailed));
    assert_eq!(report.stats.frames_processed, 1);
    assert_eq!(session.presenter().exits, vec![AlertKind::FrameSourceFailed]);
}

#[tokio::test(start_paused = true)]
async fn test_split_screen_ends_session_after_delay() {
    let mut session = new_session(ScriptedSource::endless(), attentive(), SessionConfig::default());

    let (tx, rx) = mpsc::channel(4);
    tx.send(WindowEvent::Configure(split_geometry())).await.unwrap();

    let started = Instant::now();
    let report = session.run(rx, &FixedFocus(true)).await;
    let elapsed = started.elapsed();

    assert_eq!(report.reason, StopReason::Alert(AlertKind::SplitScreen));
    assert!(elapsed >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_secs(6));
    assert_eq!(session.presenter().exits, vec![AlertKind::SplitScreen]);
}

#[tokio::test(start_paused = true)]
async fn test_restoring_window_cancels_split_timer() {
    let mut session = new_session(ScriptedSource::endless(), attentive(), SessionConfig::default());

    let (tx, rx) = mpsc::channel(4);
    tx.send(WindowEvent::Configure(split_geometry())).await.unwrap();
    tokio::spawn(async move {
        sleep(Duration::from_secs(2)).await;
        tx.send(WindowEvent::Configure(full_geometry())).await.unwrap();
        sleep(Duration::from_secs(6)).await;
        tx.send(WindowEvent::StopRequested).await.unwrap();
    });

    let report = session.run(rx, &FixedFocus(true)).await;

    assert_eq!(report.reason, StopReason::Stopped);
    assert!(session.presenter().exits.is_empty());
    assert!(report.stats.frames_processed > 500);
}

#[tokio::test(start_paused = true)]
async fn test_focus_loss_warns_once() {
    let mut session = new_session(ScriptedSource::endless(), attentive(), SessionConfig::default());

    let (tx, rx) = mpsc::channel(4);
    tx.send(WindowEvent::FocusIn).await.unwrap();
    tokio::spawn(async move {
        sleep(Duration::from_secs(4)).await;
        tx.send(WindowEvent::StopRequested).await.unwrap();
    });

    let report = session.run(rx, &FixedFocus(false)).await;

    assert_eq!(report.reason, StopReason::Stopped);
    assert_eq!(session.presenter().warnings, vec![AlertKind::FocusLost]);
    assert_eq!(session.alerts().fire_count(AlertKind::FocusLost), 1);
    let display = session.presenter().last_display.clone().unwrap();
    assert_eq!(display.warning, None);
}

#[tokio::test(start_paused = true)]
async fn test_close_requires_confirmation() {
    let mut session = Session::new(
        SessionConfig::default(),
        ScriptedSource::frames(5),
        attentive(),
        RecordingPresenter {
            refuse_quit: true,
            ..Default::default()
        },
    )
    .unwrap();

    let (tx, rx) = mpsc::channel(4);
    tx.send(WindowEvent::CloseRequested).await.unwrap();
    let report = session.run(rx, &FixedFocus(true)).await;
    assert_eq!(report.reason, StopReason::EndOfStream);

    let mut session = new_session(ScriptedSource::endless(), attentive(), SessionConfig::default());
    let (tx, rx) = mpsc::channel(4);
    tx.send(WindowEvent::PointerMoved { x: 12, y: 34 }).await.unwrap();
    tx.send(WindowEvent::CloseRequested).await.unwrap();
    let report = session.run(rx, &FixedFocus(true)).await;

    assert_eq!(report.reason, StopReason::WindowClosed);
    assert_eq!(session.display().pointer, (12, 34));
    // both events are handled before the first tick
    assert_eq!(report.stats.frames_read, 0);
}
