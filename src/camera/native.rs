//! Native capture through nokhwa (enabled with the `camera` feature).

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution as NokhwaResolution,
};
use nokhwa::{Camera, NokhwaError};

use super::types::{CaptureError, CaptureSettings, FrameSource, Resolution};
use crate::frame::RawFrame;

/// Camera opened directly in YUYV mode.
pub struct NativeCamera {
    camera: Camera,
    resolution: Resolution,
}

impl NativeCamera {
    /// Open the camera whose index is `settings.device` (e.g. `"0"`).
    pub fn open(settings: &CaptureSettings) -> Result<Self, CaptureError> {
        let index = settings
            .device
            .trim_start_matches("/dev/video")
            .parse::<u32>()
            .map(CameraIndex::Index)
            .map_err(|_| CaptureError::Device(format!("invalid camera index '{}'", settings.device)))?;

        let format = CameraFormat::new(
            NokhwaResolution::new(settings.resolution.width, settings.resolution.height),
            FrameFormat::YUYV,
            30,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let mut camera = Camera::new(index, requested).map_err(device_error)?;
        if camera.frame_format() != FrameFormat::YUYV {
            return Err(CaptureError::Device(format!(
                "camera does not offer YUYV (negotiated {})",
                camera.frame_format()
            )));
        }
        camera.open_stream().map_err(device_error)?;

        let res = camera.resolution();
        let resolution = Resolution::new(res.width(), res.height());
        if resolution != settings.resolution {
            log::warn!(
                "camera negotiated {} instead of {}",
                resolution,
                settings.resolution
            );
        }

        Ok(Self { camera, resolution })
    }
}

fn device_error(e: NokhwaError) -> CaptureError {
    CaptureError::Device(e.to_string())
}

impl FrameSource for NativeCamera {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn next_frame(&mut self) -> Result<RawFrame, CaptureError> {
        match self.camera.frame() {
            Ok(buffer) => {
                let res = buffer.resolution();
                Ok(RawFrame::new(buffer.buffer().to_vec(), res.width(), res.height()))
            }
            // A failed read is usually a dropped frame; the loop retries
            Err(NokhwaError::ReadFrame(msg)) => {
                log::debug!("frame read failed: {}", msg);
                Err(CaptureError::Timeout)
            }
            Err(e) => Err(device_error(e)),
        }
    }
}

impl Drop for NativeCamera {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}
