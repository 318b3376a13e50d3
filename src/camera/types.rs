//! Capture types shared by every frame source.

use std::fmt;
use std::time::Duration;

use crate::frame::RawFrame;

/// Capture resolution negotiated with the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 320x180 - small and fast, plenty for a terminal-sized output
    pub const LOW: Resolution = Resolution {
        width: 320,
        height: 180,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size in bytes of one packed YUYV frame at this resolution.
    pub fn frame_len(&self) -> usize {
        RawFrame::expected_len(self.width, self.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::LOW
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Settings for opening a frame source.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Device path or name, e.g. `/dev/video0`
    pub device: String,
    /// Requested capture resolution
    pub resolution: Resolution,
    /// How long `next_frame` waits before reporting a timeout
    pub timeout: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            device: default_device().to_string(),
            resolution: Resolution::default(),
            timeout: Duration::from_secs(1),
        }
    }
}

/// Platform default capture device.
pub fn default_device() -> &'static str {
    if cfg!(target_os = "macos") {
        "0"
    } else {
        "/dev/video0"
    }
}

/// Errors reported by a frame source.
#[derive(Debug)]
pub enum CaptureError {
    /// No frame arrived within the timeout
    Timeout,
    /// A frame ended early (short read)
    Truncated { expected: usize, actual: usize },
    /// The source has no more frames
    EndOfStream,
    /// ffmpeg executable not found
    FfmpegNotFound,
    /// Failed to spawn the capture process
    SpawnFailed(std::io::Error),
    /// Device-level failure
    Device(String),
}

impl CaptureError {
    /// Whether the loop should simply ask for the next frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CaptureError::Timeout | CaptureError::Truncated { .. })
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Timeout => write!(f, "Timed out waiting for a frame"),
            CaptureError::Truncated { expected, actual } => {
                write!(f, "Short frame: expected {} bytes, got {}", expected, actual)
            }
            CaptureError::EndOfStream => write!(f, "Capture stream ended"),
            CaptureError::FfmpegNotFound => {
                write!(
                    f,
                    "FFmpeg not found. Install it (e.g. `apt install ffmpeg`) or use --source stdin"
                )
            }
            CaptureError::SpawnFailed(e) => write!(f, "Failed to spawn FFmpeg: {}", e),
            CaptureError::Device(msg) => write!(f, "Capture device error: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::SpawnFailed(e) => Some(e),
            _ => None,
        }
    }
}

/// Anything that yields raw YUYV frames on demand.
pub trait FrameSource {
    /// Resolution of the frames this source produces.
    fn resolution(&self) -> Resolution;

    /// Block until the next frame is available or the timeout elapses.
    fn next_frame(&mut self) -> Result<RawFrame, CaptureError>;
}
