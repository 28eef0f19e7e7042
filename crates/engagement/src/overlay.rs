//! Frame annotation for display

use camera_capture::VideoFrame;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::analysis::FrameAnalysis;
use crate::EngagementError;

const FACE_BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LANDMARK_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Draw the face box and landmark dots onto a copy of the frame
pub fn annotate(frame: &VideoFrame, analysis: &FrameAnalysis) -> Result<RgbImage, EngagementError> {
    let mut img = frame
        .to_rgb_image()
        .ok_or_else(|| EngagementError::ImageProcessing("frame buffer does not match its size".into()))?;

    if let Some(face) = &analysis.face {
        let width = face.width.round().max(1.0) as u32;
        let height = face.height.round().max(1.0) as u32;
        let rect = Rect::at(face.x.round() as i32, face.y.round() as i32).of_size(width, height);
        draw_hollow_rect_mut(&mut img, rect, FACE_BOX_COLOR);
        // second pass for a 2px outline
        if width > 2 && height > 2 {
            let inner = Rect::at(face.x.round() as i32 + 1, face.y.round() as i32 + 1)
                .of_size(width - 2, height - 2);
            draw_hollow_rect_mut(&mut img, inner, FACE_BOX_COLOR);
        }
    }

    if let Some(landmarks) = &analysis.landmarks {
        for point in landmarks.points() {
            draw_filled_circle_mut(
                &mut img,
                (point.x.round() as i32, point.y.round() as i32),
                1,
                LANDMARK_COLOR,
            );
        }
    }

    Ok(img)
}
