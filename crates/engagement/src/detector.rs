//! Face and landmark detection backends

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{DetectorKind, EngagementConfig};
use crate::landmarks::LandmarkSet;
use crate::EngagementError;

/// Face bounding box in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "full_confidence")]
    pub confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

impl FaceRegion {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height, confidence: 1.0 }
    }

    /// Region covering a whole image
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// Maps a grayscale image to faces, and each face to 68 landmarks
pub trait LandmarkDetector {
    /// Find face regions in the frame
    fn detect_faces(&mut self, gray: &GrayImage) -> Result<Vec<FaceRegion>, EngagementError>;

    /// Predict the 68 landmarks inside a face region
    fn predict_landmarks(&mut self, gray: &GrayImage, face: &FaceRegion) -> Result<LandmarkSet, EngagementError>;
}

impl<T: LandmarkDetector + ?Sized> LandmarkDetector for Box<T> {
    fn detect_faces(&mut self, gray: &GrayImage) -> Result<Vec<FaceRegion>, EngagementError> {
        (**self).detect_faces(gray)
    }

    fn predict_landmarks(&mut self, gray: &GrayImage, face: &FaceRegion) -> Result<LandmarkSet, EngagementError> {
        (**self).predict_landmarks(gray, face)
    }
}

/// One recorded face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFace {
    pub region: FaceRegion,
    pub landmarks: LandmarkSet,
}

/// Detections recorded for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    #[serde(default)]
    pub faces: Vec<ReplayFace>,
}

/// Replays detections recorded as JSON lines, one frame per line.
///
/// The recording wraps around when the session outlasts it.
pub struct ReplayDetector {
    frames: Vec<ReplayFrame>,
    cursor: usize,
    current: Option<usize>,
}

impl ReplayDetector {
    /// Load a recording from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngagementError> {
        let path = path.as_ref();
        info!("Loading landmark recording from {}", path.display());

        let file = File::open(path).map_err(|e| {
            error!("Failed to open landmark recording: {}", e);
            EngagementError::ModelLoad(format!("{}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    /// Parse a recording from any reader
    pub fn from_reader(reader: impl Read) -> Result<Self, EngagementError> {
        let mut frames = Vec::new();
        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line = line.map_err(|e| EngagementError::ModelLoad(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: ReplayFrame = serde_json::from_str(&line).map_err(|e| {
                EngagementError::ModelLoad(format!("line {}: {}", index + 1, e))
            })?;
            frames.push(frame);
        }
        Self::from_frames(frames)
    }

    pub fn from_frames(frames: Vec<ReplayFrame>) -> Result<Self, EngagementError> {
        if frames.is_empty() {
            return Err(EngagementError::ModelLoad("landmark recording is empty".into()));
        }
        info!("Landmark recording holds {} frames", frames.len());
        Ok(Self {
            frames,
            cursor: 0,
            current: None,
        })
    }

    /// Number of recorded frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkDetector for ReplayDetector {
    fn detect_faces(&mut self, _gray: &GrayImage) -> Result<Vec<FaceRegion>, EngagementError> {
        if self.cursor >= self.frames.len() {
            debug!("Landmark recording exhausted, rewinding");
            self.cursor = 0;
        }
        let index = self.cursor;
        self.cursor += 1;
        self.current = Some(index);

        Ok(self.frames[index].faces.iter().map(|face| face.region).collect())
    }

    fn predict_landmarks(&mut self, _gray: &GrayImage, face: &FaceRegion) -> Result<LandmarkSet, EngagementError> {
        let frame = self
            .current
            .and_then(|index| self.frames.get(index))
            .ok_or(EngagementError::NoFace)?;

        frame
            .faces
            .iter()
            .find(|recorded| recorded.region == *face)
            .map(|recorded| recorded.landmarks.clone())
            .ok_or(EngagementError::NoFace)
    }
}

/// Build the configured detector backend. A missing model is fatal.
pub fn load_detector(config: &EngagementConfig) -> Result<Box<dyn LandmarkDetector>, EngagementError> {
    match config.detector {
        DetectorKind::Replay => Ok(Box::new(ReplayDetector::open(&config.landmark_model_path)?)),
        #[cfg(feature = "onnx")]
        DetectorKind::Onnx => Ok(Box::new(crate::onnx::OnnxLandmarkDetector::new(config)?)),
        #[cfg(not(feature = "onnx"))]
        DetectorKind::Onnx => Err(EngagementError::Config(
            "ONNX detector requested but the `onnx` feature is not enabled".into(),
        )),
    }
}
