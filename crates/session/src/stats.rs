//! Session frame statistics

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    /// Frames the source delivered
    pub frames_read: u64,
    /// Frames that went through analysis
    pub frames_processed: u64,
    /// Ticks skipped because of read or analysis failures
    pub frames_skipped: u64,
    /// Processed frames without a face
    pub frames_without_face: u64,
    /// Total time spent analyzing and rendering
    pub processing_time: Duration,
}

impl SessionStats {
    pub fn record_frame(&mut self, elapsed: Duration, face_detected: bool) {
        self.frames_processed += 1;
        self.processing_time += elapsed;
        if !face_detected {
            self.frames_without_face += 1;
        }
    }

    /// Mean processing time per frame
    pub fn average_processing_time(&self) -> Option<Duration> {
        if self.frames_processed == 0 {
            return None;
        }
        Some(self.processing_time / self.frames_processed as u32)
    }

    /// Frames per second the pipeline could sustain
    pub fn processing_fps(&self) -> Option<f64> {
        self.average_processing_time()
            .map(|avg| avg.as_secs_f64())
            .filter(|secs| *secs > 0.0)
            .map(|secs| 1.0 / secs)
    }
}
