//! Frame sources

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::imageops::FilterType;
use image::GenericImageView;
use tracing::{debug, info, warn};

use crate::{CameraConfig, CameraError, VideoFrame};

/// Anything that yields frames to the session loop, one per tick.
pub trait FrameSource {
    /// Read the next frame
    fn read(&mut self) -> Result<VideoFrame, CameraError>;

    /// Release the underlying capture resource. Reads after release fail.
    fn release(&mut self) {}
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read(&mut self) -> Result<VideoFrame, CameraError> {
        (**self).read()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Replays a directory of still images (sorted by file name) as a camera.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    target_size: Option<(u32, u32)>,
    repeat: bool,
    opened_at: Instant,
    sequence: u32,
    released: bool,
}

impl ImageSequenceSource {
    /// Open the frame directory configured in `device`
    pub fn open(config: &CameraConfig) -> Result<Self, CameraError> {
        let dir = Path::new(&config.device);
        let entries = std::fs::read_dir(dir)
            .map_err(|e| CameraError::Open(format!("{}: {}", dir.display(), e)))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(CameraError::Open(format!("no images in {}", dir.display())));
        }

        info!("Opened image sequence {} ({} frames)", dir.display(), paths.len());

        Ok(Self {
            paths,
            cursor: 0,
            target_size: config.target_size(),
            repeat: config.repeat,
            opened_at: Instant::now(),
            sequence: 0,
            released: false,
        })
    }

    /// Number of images in the sequence
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the sequence holds no images
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn read(&mut self) -> Result<VideoFrame, CameraError> {
        if self.released {
            return Err(CameraError::NotInitialized);
        }

        if self.cursor >= self.paths.len() {
            if !self.repeat {
                return Err(CameraError::EndOfStream);
            }
            debug!("Image sequence exhausted, rewinding");
            self.cursor = 0;
        }

        let path = &self.paths[self.cursor];
        self.cursor += 1;

        let img = image::open(path).map_err(|e| {
            warn!("Failed to decode {}: {}", path.display(), e);
            CameraError::Read(format!("{}: {}", path.display(), e))
        })?;

        let img = match self.target_size {
            Some((w, h)) if (w, h) != img.dimensions() => img.resize_exact(w, h, FilterType::Nearest),
            _ => img,
        };

        let timestamp_ns = self.opened_at.elapsed().as_nanos() as u64;
        let frame = VideoFrame::from_rgb_image(img.to_rgb8(), timestamp_ns, self.sequence);
        self.sequence = self.sequence.wrapping_add(1);
        Ok(frame)
    }

    fn release(&mut self) {
        if !self.released {
            info!("Releasing image sequence after {} frames", self.sequence);
            self.released = true;
        }
    }
}
