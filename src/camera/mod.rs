//! Frame acquisition.
//!
//! The render loop only sees the [`FrameSource`] trait:
//! - [`FfmpegSource`] - spawns `ffmpeg` against a capture device
//! - [`StreamSource`] - concatenated raw frames from any reader (stdin, files)
//! - `NativeCamera` - direct device access via nokhwa (`camera` feature)

mod ffmpeg;
#[cfg(feature = "camera")]
mod native;
mod stream;
mod types;

pub use ffmpeg::{ffmpeg_args, FfmpegSource};
#[cfg(feature = "camera")]
pub use native::NativeCamera;
pub use stream::StreamSource;
pub use types::{default_device, CaptureError, CaptureSettings, FrameSource, Resolution};
