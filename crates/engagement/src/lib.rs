//! Engagement signals from 68-point facial landmarks
//!
//! Per-frame analysis of a webcam feed:
//! - Eye aspect ratio and blink state (drowsiness)
//! - Gaze and head alignment against the nose bridge (focus)
//! - Lip opening and width (speaking)
//!
//! Raw measurements pass through debounced counters so single-frame noise
//! never flips the displayed status.

pub mod analysis;
pub mod config;
pub mod detector;
pub mod drowsiness;
pub mod eye;
pub mod gaze;
pub mod geometry;
pub mod landmarks;
pub mod lip;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod overlay;
pub mod state;
pub mod status;

pub use analysis::{EngagementAlert, FrameAnalysis};
pub use config::{DetectorKind, EngagementConfig, NoFacePolicy};
pub use detector::{load_detector, FaceRegion, LandmarkDetector, ReplayDetector};
pub use drowsiness::DrowsinessStateMachine;
pub use eye::{BlinkState, EyePair, EyeStateClassifier};
pub use gaze::{GazeAlignmentClassifier, GazeDirection};
pub use geometry::Point;
pub use landmarks::LandmarkSet;
pub use lip::{LipActivityStateMachine, LipEscalation, LipReading};
pub use state::ClassifierState;
pub use status::{EyeActivity, SpeakingStatus, StatusLabel};

use camera_capture::VideoFrame;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Engagement error types
#[derive(Error, Debug)]
pub enum EngagementError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("No face detected")]
    NoFace,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Expected 68 landmarks, got {0}")]
    InvalidLandmarks(usize),
}

/// Engagement analysis module: detector plus the per-frame state machines
pub struct EngagementModule<D> {
    config: EngagementConfig,
    detector: D,
    eyes: EyeStateClassifier,
    gaze: GazeAlignmentClassifier,
    drowsiness: DrowsinessStateMachine,
    lip: LipActivityStateMachine,
    state: ClassifierState,
}

impl<D: LandmarkDetector> EngagementModule<D> {
    /// Create a new engagement module with configuration
    pub fn new(config: EngagementConfig, detector: D) -> Result<Self, EngagementError> {
        config.validate().map_err(EngagementError::Config)?;
        info!(
            "Engagement module ready (no-face policy: {:?}, detector: {:?})",
            config.no_face_policy, config.detector
        );

        Ok(Self {
            eyes: EyeStateClassifier::new(&config),
            gaze: GazeAlignmentClassifier::new(&config),
            drowsiness: DrowsinessStateMachine::new(&config),
            lip: LipActivityStateMachine::new(&config),
            state: ClassifierState::default(),
            detector,
            config,
        })
    }

    /// Analyze a single frame
    pub fn analyze(&mut self, frame: &VideoFrame) -> Result<FrameAnalysis, EngagementError> {
        let gray = frame
            .to_gray_image()
            .ok_or_else(|| EngagementError::ImageProcessing("frame buffer does not match its size".into()))?;

        let faces = self.detector.detect_faces(&gray)?;

        let Some(face) = faces.first().copied() else {
            self.state.face_absent_frames = self.state.face_absent_frames.saturating_add(1);
            if self.config.no_face_policy == NoFacePolicy::Reset {
                self.state.reset_counters();
            }
            debug!("No face in frame {} ({} in a row)", frame.sequence, self.state.face_absent_frames);

            return Ok(FrameAnalysis {
                face_detected: false,
                status: self.state.status(),
                speaking: self.speaking_status(),
                state: self.state.clone(),
                ..Default::default()
            });
        };

        if faces.len() > 1 {
            debug!("{} faces in frame {}, using the first", faces.len(), frame.sequence);
        }
        self.state.face_absent_frames = 0;

        let landmarks = self.detector.predict_landmarks(&gray, &face)?;
        let mut analysis = self.evaluate(&landmarks);
        analysis.face_count = faces.len();
        analysis.face = Some(face);
        Ok(analysis)
    }

    /// Run every classifier and state machine on one landmark set
    pub fn evaluate(&mut self, landmarks: &LandmarkSet) -> FrameAnalysis {
        let previous_status = self.state.status();

        let eyes = EyePair {
            left: self.eyes.read(&landmarks.left_eye()),
            right: self.eyes.read(&landmarks.right_eye()),
        };
        let gaze = self.gaze.classify_gaze(landmarks);
        let head_alignment = self.gaze.classify_head_alignment(landmarks);

        let status = self.drowsiness.step(&mut self.state.drowsiness, &eyes, gaze);
        let lip = self.lip.step(&mut self.state.lip, landmarks);

        if status != previous_status {
            info!("Status changed: {:?} -> {:?}", previous_status, status);
        }

        let alerts: Vec<EngagementAlert> = lip.escalation.map(EngagementAlert::from).into_iter().collect();
        for alert in &alerts {
            warn!("Engagement alert: {:?} after {} speaking frames", alert, lip.speaking_frames);
        }

        FrameAnalysis {
            face_detected: true,
            face_count: 1,
            face: None,
            landmarks: Some(landmarks.clone()),
            eyes: Some(eyes),
            gaze: Some(gaze),
            head_alignment: Some(head_alignment),
            lip: Some(lip),
            status,
            speaking: lip.status,
            state: self.state.clone(),
            alerts,
        }
    }

    fn speaking_status(&self) -> SpeakingStatus {
        if self.state.lip.speaking_frames > self.config.speaking_frames {
            SpeakingStatus::Speaking
        } else {
            SpeakingStatus::NotSpeaking
        }
    }

    /// Current classifier state
    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    pub fn config(&self) -> &EngagementConfig {
        &self.config
    }

    /// Reset classifier state (new session)
    pub fn reset_state(&mut self) {
        self.state.reset();
    }
}
