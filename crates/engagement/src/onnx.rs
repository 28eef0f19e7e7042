//! ONNX Runtime detector backend
//!
//! - Face model (optional): UltraFace-style detector with `scores` [1, N, 2]
//!   and `boxes` [1, N, 4] outputs, corners normalized to 0..1.
//! - Landmark model: 68-point regressor (PFLD-style) taking a 3-channel
//!   square crop and returning 136 values normalized to the crop.
//!
//! Without a face model the whole frame is treated as a single face.

use image::imageops::{self, FilterType};
use image::GrayImage;
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use tracing::{debug, error, info, warn};

use crate::config::EngagementConfig;
use crate::detector::{FaceRegion, LandmarkDetector};
use crate::geometry::Point;
use crate::landmarks::{LandmarkSet, NUM_FACIAL_LANDMARKS};
use crate::EngagementError;

const FACE_INPUT: (u32, u32) = (320, 240);
const LANDMARK_INPUT: u32 = 112;
const FACE_SCORE_THRESHOLD: f32 = 0.7;
const FACE_IOU_THRESHOLD: f32 = 0.3;

fn load_session(path: &str, what: &str) -> Result<Session, EngagementError> {
    info!("Loading {} model from {}", what, path);
    if !std::path::Path::new(path).exists() {
        error!("{} model not found at {}", what, path);
        return Err(EngagementError::ModelLoad(format!("{} model not found: {}", what, path)));
    }

    Session::builder()
        .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
        .and_then(|builder| builder.commit_from_file(path))
        .map_err(|e| {
            error!("Failed to load {} model: {}", what, e);
            EngagementError::ModelLoad(e.to_string())
        })
}

fn inference_error(e: ort::Error) -> EngagementError {
    EngagementError::Inference(e.to_string())
}

/// Gray image to a normalized 1x3xHxW tensor
fn to_tensor(gray: &GrayImage, mean: f32, scale: f32) -> Array4<f32> {
    let (w, h) = gray.dimensions();
    let mut input = Array4::<f32>::zeros((1, 3, h as usize, w as usize));
    for (x, y, pixel) in gray.enumerate_pixels() {
        let v = (pixel[0] as f32 - mean) / scale;
        for c in 0..3 {
            input[[0, c, y as usize, x as usize]] = v;
        }
    }
    input
}

fn iou(a: &FaceRegion, b: &FaceRegion) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);
    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Greedy non-maximum suppression, highest confidence first
fn suppress(mut candidates: Vec<FaceRegion>) -> Vec<FaceRegion> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut kept: Vec<FaceRegion> = Vec::new();
    for candidate in candidates {
        if kept.iter().all(|k| iou(k, &candidate) < FACE_IOU_THRESHOLD) {
            kept.push(candidate);
        }
    }
    kept
}

/// Face and landmark models run through ONNX Runtime
pub struct OnnxLandmarkDetector {
    face_session: Option<Session>,
    landmark_session: Session,
}

impl OnnxLandmarkDetector {
    pub fn new(config: &EngagementConfig) -> Result<Self, EngagementError> {
        let face_session = match &config.face_model_path {
            Some(path) => Some(load_session(path, "face")?),
            None => {
                warn!("No face model configured; treating each frame as one face");
                None
            }
        };
        let landmark_session = load_session(&config.landmark_model_path, "landmark")?;

        Ok(Self {
            face_session,
            landmark_session,
        })
    }
}

impl LandmarkDetector for OnnxLandmarkDetector {
    fn detect_faces(&mut self, gray: &GrayImage) -> Result<Vec<FaceRegion>, EngagementError> {
        let (frame_w, frame_h) = gray.dimensions();
        let Some(session) = &self.face_session else {
            return Ok(vec![FaceRegion::full_frame(frame_w, frame_h)]);
        };

        let resized = imageops::resize(gray, FACE_INPUT.0, FACE_INPUT.1, FilterType::Triangle);
        let input = to_tensor(&resized, 127.0, 128.0);

        let outputs = session
            .run(ort::inputs![input].map_err(inference_error)?)
            .map_err(inference_error)?;
        let scores: Vec<f32> = outputs["scores"]
            .try_extract_tensor::<f32>()
            .map_err(inference_error)?
            .iter()
            .copied()
            .collect();
        let boxes: Vec<f32> = outputs["boxes"]
            .try_extract_tensor::<f32>()
            .map_err(inference_error)?
            .iter()
            .copied()
            .collect();

        let candidates = scores
            .chunks_exact(2)
            .zip(boxes.chunks_exact(4))
            .filter(|(score, _)| score[1] > FACE_SCORE_THRESHOLD)
            .map(|(score, b)| {
                let x1 = (b[0] * frame_w as f32).clamp(0.0, frame_w as f32);
                let y1 = (b[1] * frame_h as f32).clamp(0.0, frame_h as f32);
                let x2 = (b[2] * frame_w as f32).clamp(0.0, frame_w as f32);
                let y2 = (b[3] * frame_h as f32).clamp(0.0, frame_h as f32);
                FaceRegion {
                    x: x1,
                    y: y1,
                    width: x2 - x1,
                    height: y2 - y1,
                    confidence: score[1],
                }
            })
            .filter(|region| region.area() > 0.0)
            .collect();

        let faces = suppress(candidates);
        debug!("Face model returned {} faces", faces.len());
        Ok(faces)
    }

    fn predict_landmarks(&mut self, gray: &GrayImage, face: &FaceRegion) -> Result<LandmarkSet, EngagementError> {
        let (frame_w, frame_h) = gray.dimensions();
        let x = face.x.max(0.0) as u32;
        let y = face.y.max(0.0) as u32;
        let w = (face.width as u32).min(frame_w.saturating_sub(x));
        let h = (face.height as u32).min(frame_h.saturating_sub(y));
        if w == 0 || h == 0 {
            return Err(EngagementError::ImageProcessing("face region outside frame".into()));
        }

        let crop = imageops::crop_imm(gray, x, y, w, h).to_image();
        let resized = imageops::resize(&crop, LANDMARK_INPUT, LANDMARK_INPUT, FilterType::Triangle);
        let input = to_tensor(&resized, 0.0, 255.0);

        let outputs = self
            .landmark_session
            .run(ort::inputs![input].map_err(inference_error)?)
            .map_err(inference_error)?;
        let values: Vec<f32> = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(inference_error)?
            .iter()
            .copied()
            .collect();

        if values.len() < NUM_FACIAL_LANDMARKS * 2 {
            return Err(EngagementError::InvalidLandmarks(values.len() / 2));
        }

        let points = values
            .chunks_exact(2)
            .take(NUM_FACIAL_LANDMARKS)
            .map(|xy| {
                Point::new(
                    x as f64 + xy[0] as f64 * w as f64,
                    y as f64 + xy[1] as f64 * h as f64,
                )
            })
            .collect();
        LandmarkSet::new(points)
    }
}
