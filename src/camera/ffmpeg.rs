//! Capture through an `ffmpeg` child process emitting raw YUYV on stdout.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::thread;

use super::stream::StreamSource;
use super::types::{CaptureError, CaptureSettings, FrameSource, Resolution};
use crate::frame::RawFrame;

/// Input demuxer for the platform's camera API.
fn input_format() -> &'static str {
    if cfg!(target_os = "macos") {
        "avfoundation"
    } else if cfg!(target_os = "windows") {
        "dshow"
    } else {
        "v4l2"
    }
}

/// Build the ffmpeg arguments that stream `settings.device` as packed
/// `yuyv422` frames to stdout.
pub fn ffmpeg_args(settings: &CaptureSettings) -> Vec<String> {
    let size = settings.resolution.to_string();
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        input_format().into(),
    ];
    if input_format() == "v4l2" {
        args.extend(["-input_format".into(), "yuyv422".into()]);
    }
    args.extend([
        "-video_size".into(),
        size.clone(),
        "-i".into(),
        settings.device.clone(),
        // Scale in case the device picked a different mode
        "-vf".into(),
        format!("scale={}:{}", settings.resolution.width, settings.resolution.height),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "yuyv422".into(),
        "-".into(),
    ]);
    args
}

/// Frame source backed by a running ffmpeg process.
pub struct FfmpegSource {
    child: Child,
    stream: StreamSource,
}

impl FfmpegSource {
    /// Spawn ffmpeg for the configured device.
    pub fn spawn(settings: &CaptureSettings) -> Result<Self, CaptureError> {
        let args = ffmpeg_args(settings);
        log::info!("spawning ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CaptureError::FfmpegNotFound
                } else {
                    CaptureError::SpawnFailed(e)
                }
            })?;

        // Forward ffmpeg diagnostics to the log
        if let Some(stderr) = child.stderr.take() {
            thread::spawn(move || {
                for line in BufReader::new(stderr).lines() {
                    match line {
                        Ok(l) => log::warn!("[ffmpeg] {}", l),
                        Err(_) => break,
                    }
                }
            });
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptureError::Device("ffmpeg stdout not captured".to_string()))?;
        let stream = StreamSource::new(stdout, settings.resolution, settings.timeout);

        Ok(Self { child, stream })
    }
}

impl FrameSource for FfmpegSource {
    fn resolution(&self) -> Resolution {
        self.stream.resolution()
    }

    fn next_frame(&mut self) -> Result<RawFrame, CaptureError> {
        match self.stream.next_frame() {
            Err(CaptureError::EndOfStream) => match self.child.try_wait() {
                Ok(Some(status)) if !status.success() => Err(CaptureError::Device(format!(
                    "ffmpeg exited with {}",
                    status
                ))),
                _ => Err(CaptureError::EndOfStream),
            },
            other => other,
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
