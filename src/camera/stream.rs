//! Frame source over any byte stream of concatenated YUYV frames.

use std::io::{ErrorKind, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::types::{CaptureError, FrameSource, Resolution};
use crate::frame::RawFrame;

/// Reads fixed-size frames from a stream on a background thread.
///
/// The channel between the reader and the render loop holds a single frame,
/// so the reader never runs more than one frame ahead.
pub struct StreamSource {
    resolution: Resolution,
    timeout: Duration,
    rx: Receiver<Result<RawFrame, CaptureError>>,
    reader: Option<JoinHandle<()>>,
}

impl StreamSource {
    pub fn new<R>(reader: R, resolution: Resolution, timeout: Duration) -> Self
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        let handle = thread::spawn(move || read_frames(reader, resolution, tx));

        Self {
            resolution,
            timeout,
            rx,
            reader: Some(handle),
        }
    }

    /// Frames from standard input, e.g. piped from an external grabber.
    pub fn stdin(resolution: Resolution, timeout: Duration) -> Self {
        Self::new(std::io::stdin(), resolution, timeout)
    }
}

impl FrameSource for StreamSource {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn next_frame(&mut self) -> Result<RawFrame, CaptureError> {
        match self.rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(CaptureError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(CaptureError::EndOfStream),
        }
    }
}

impl Drop for StreamSource {
    fn drop(&mut self) {
        // The reader may be blocked in read(); only reap it if it has exited.
        if let Some(handle) = self.reader.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

fn read_frames<R: Read>(
    mut reader: R,
    resolution: Resolution,
    tx: SyncSender<Result<RawFrame, CaptureError>>,
) {
    let frame_len = resolution.frame_len();

    loop {
        let mut data = vec![0u8; frame_len];
        let result = match read_full(&mut reader, &mut data) {
            Ok(0) => break,
            Ok(n) if n < frame_len => {
                // A short read can only happen at end of stream
                let _ = tx.send(Err(CaptureError::Truncated {
                    expected: frame_len,
                    actual: n,
                }));
                break;
            }
            Ok(_) => Ok(RawFrame::new(data, resolution.width, resolution.height)),
            Err(e) => {
                let _ = tx.send(Err(CaptureError::Device(e.to_string())));
                break;
            }
        };

        if tx.send(result).is_err() {
            // Receiver dropped
            break;
        }
    }
    log::debug!("frame reader finished");
}

/// Fill `buf` as far as the stream allows; returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
