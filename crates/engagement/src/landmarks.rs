//! 68-point facial landmark sets
//!
//! Index layout follows the iBUG 300-W annotation used by common
//! 68-point shape predictors:
//!
//! - 0-16: Jaw outline
//! - 17-26: Eyebrows
//! - 27-35: Nose (27 is the top of the nose bridge)
//! - 36-41: Left eye (image left)
//! - 42-47: Right eye
//! - 48-59: Outer lip (48 and 54 are the mouth corners, 51 upper-lip top, 57 lower-lip bottom)
//! - 60-67: Inner lip

use serde::{Deserialize, Serialize};

use crate::geometry::{centroid, Point};
use crate::EngagementError;

/// Number of points in a landmark set
pub const NUM_FACIAL_LANDMARKS: usize = 68;

pub const NOSE_BRIDGE: usize = 27;
pub const LEFT_EYE: std::ops::Range<usize> = 36..42;
pub const RIGHT_EYE: std::ops::Range<usize> = 42..48;
pub const MOUTH_LEFT: usize = 48;
pub const UPPER_LIP_TOP: usize = 51;
pub const MOUTH_RIGHT: usize = 54;
pub const LOWER_LIP_BOTTOM: usize = 57;

/// Six eye contour points in landmark order (outer corner, two upper lid
/// points, inner corner, two lower lid points).
pub type EyeContour = [Point; 6];

/// Exactly 68 landmark points for one face in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    /// Build a landmark set, rejecting anything but 68 points
    pub fn new(points: Vec<Point>) -> Result<Self, EngagementError> {
        if points.len() != NUM_FACIAL_LANDMARKS {
            return Err(EngagementError::InvalidLandmarks(points.len()));
        }
        Ok(Self { points })
    }

    /// Point at a landmark index
    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn left_eye(&self) -> EyeContour {
        contour(&self.points[LEFT_EYE])
    }

    pub fn right_eye(&self) -> EyeContour {
        contour(&self.points[RIGHT_EYE])
    }

    pub fn left_eye_center(&self) -> Point {
        centroid(&self.points[LEFT_EYE])
    }

    pub fn right_eye_center(&self) -> Point {
        centroid(&self.points[RIGHT_EYE])
    }

    pub fn nose_bridge(&self) -> Point {
        self.points[NOSE_BRIDGE]
    }

    pub fn mouth_left(&self) -> Point {
        self.points[MOUTH_LEFT]
    }

    pub fn mouth_right(&self) -> Point {
        self.points[MOUTH_RIGHT]
    }

    pub fn upper_lip_top(&self) -> Point {
        self.points[UPPER_LIP_TOP]
    }

    pub fn lower_lip_bottom(&self) -> Point {
        self.points[LOWER_LIP_BOTTOM]
    }
}

fn contour(points: &[Point]) -> EyeContour {
    [points[0], points[1], points[2], points[3], points[4], points[5]]
}

impl TryFrom<Vec<Point>> for LandmarkSet {
    type Error = EngagementError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<LandmarkSet> for Vec<Point> {
    fn from(set: LandmarkSet) -> Self {
        set.points
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthetic faces for the classifier and state machine tests.

    use super::*;

    /// Parameters for a synthetic frontal face
    #[derive(Debug, Clone, Copy)]
    pub struct FaceSpec {
        pub nose_x: f64,
        pub left_eye_x: f64,
        pub right_eye_x: f64,
        /// Half width of each eye contour
        pub eye_half_width: f64,
        /// Eye aspect ratio both eyes are drawn with
        pub eye_ratio: f64,
        /// y(57) - y(51)
        pub lip_opening: f64,
        /// x(54) - x(48)
        pub lip_width: f64,
    }

    impl Default for FaceSpec {
        fn default() -> Self {
            Self {
                nose_x: 150.0,
                left_eye_x: 100.0,
                right_eye_x: 200.0,
                eye_half_width: 15.0,
                eye_ratio: 0.3,
                lip_opening: 10.0,
                lip_width: 40.0,
            }
        }
    }

    /// Eye contour centered on `cx` with the requested aspect ratio
    pub fn eye(cx: f64, cy: f64, half_width: f64, ratio: f64) -> [Point; 6] {
        // vertical sum = 2 * lid gap, horizontal = 2 * half_width
        let gap = ratio * 2.0 * half_width;
        let h = gap / 2.0;
        [
            Point::new(cx - half_width, cy),
            Point::new(cx - half_width / 3.0, cy - h),
            Point::new(cx + half_width / 3.0, cy - h),
            Point::new(cx + half_width, cy),
            Point::new(cx + half_width / 3.0, cy + h),
            Point::new(cx - half_width / 3.0, cy + h),
        ]
    }

    pub fn face(spec: FaceSpec) -> LandmarkSet {
        let mut points = vec![Point::new(spec.nose_x, 200.0); NUM_FACIAL_LANDMARKS];
        points[NOSE_BRIDGE] = Point::new(spec.nose_x, 110.0);
        for (i, p) in eye(spec.left_eye_x, 100.0, spec.eye_half_width, spec.eye_ratio)
            .into_iter()
            .enumerate()
        {
            points[LEFT_EYE.start + i] = p;
        }
        for (i, p) in eye(spec.right_eye_x, 100.0, spec.eye_half_width, spec.eye_ratio)
            .into_iter()
            .enumerate()
        {
            points[RIGHT_EYE.start + i] = p;
        }
        let mouth_y = 220.0;
        points[MOUTH_LEFT] = Point::new(spec.nose_x - spec.lip_width / 2.0, mouth_y);
        points[MOUTH_RIGHT] = Point::new(spec.nose_x + spec.lip_width / 2.0, mouth_y);
        points[UPPER_LIP_TOP] = Point::new(spec.nose_x, mouth_y - spec.lip_opening / 2.0);
        points[LOWER_LIP_BOTTOM] = Point::new(spec.nose_x, mouth_y + spec.lip_opening / 2.0);
        LandmarkSet::new(points).unwrap()
    }

    pub fn open_eyes() -> LandmarkSet {
        face(FaceSpec::default())
    }

    pub fn closed_eyes() -> LandmarkSet {
        face(FaceSpec { eye_ratio: 0.1, ..FaceSpec::default() })
    }

    pub fn looking_left() -> LandmarkSet {
        face(FaceSpec { nose_x: 200.0, left_eye_x: 100.0, right_eye_x: 200.0, ..FaceSpec::default() })
    }

    pub fn speaking() -> LandmarkSet {
        face(FaceSpec { lip_opening: 25.0, lip_width: 20.0, ..FaceSpec::default() })
    }
}
