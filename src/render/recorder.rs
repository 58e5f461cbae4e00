//! Frame recorder capturing every Nth rendered frame as PNG.

use super::{export_png, Frame, RenderError};

/// Default number of frames kept by a recording.
pub const DEFAULT_MAX_FRAMES: usize = 200;
/// Default capture interval, in rendered frames.
pub const DEFAULT_INTERVAL: u32 = 2;

/// Captures rendered frames while recording.
///
/// Usage:
/// ```ignore
/// recorder.start(200, 2);
/// loop {
///     let frame = sim.render();
///     recorder.capture(frame)?;
/// }
/// let frames = recorder.stop();
/// ```
#[derive(Debug, Clone)]
pub struct FrameRecorder {
    frames: Vec<Vec<u8>>,
    recording: bool,
    max_frames: usize,
    interval: u32,
    /// Frames offered since `start`.
    counter: u32,
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            recording: false,
            max_frames: DEFAULT_MAX_FRAMES,
            interval: DEFAULT_INTERVAL,
            counter: 0,
        }
    }
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new recording, discarding any previous frames.
    ///
    /// Zero values fall back to the defaults.
    pub fn start(&mut self, max_frames: usize, interval: u32) {
        self.frames.clear();
        self.counter = 0;
        self.max_frames = if max_frames == 0 {
            DEFAULT_MAX_FRAMES
        } else {
            max_frames
        };
        self.interval = if interval == 0 {
            DEFAULT_INTERVAL
        } else {
            interval
        };
        self.recording = true;
    }

    /// Offer a rendered frame.
    ///
    /// Returns true if the frame was captured. Recording stops by itself
    /// once `max_frames` frames are held.
    pub fn capture(&mut self, frame: &Frame) -> Result<bool, RenderError> {
        if !self.recording {
            return Ok(false);
        }

        self.counter += 1;
        if self.counter % self.interval != 0 {
            return Ok(false);
        }

        if self.frames.len() >= self.max_frames {
            self.recording = false;
            return Ok(false);
        }

        self.frames.push(export_png(frame)?);
        Ok(true)
    }

    /// Stop recording and hand over the captured frames.
    pub fn stop(&mut self) -> Vec<Vec<u8>> {
        self.recording = false;
        std::mem::take(&mut self.frames)
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Get number of frames recorded so far.
    pub fn frames_captured(&self) -> usize {
        self.frames.len()
    }

    /// Fraction of `max_frames` captured so far.
    pub fn progress(&self) -> f32 {
        if self.max_frames > 0 {
            self.frames.len() as f32 / self.max_frames as f32
        } else {
            0.0
        }
    }
}
