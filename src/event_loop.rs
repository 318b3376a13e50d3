//! The capture/render loop as an explicit state machine.
//!
//! ```text
//!            timeout / short frame
//!              +-------------+
//!              v             |
//!   --> AwaitingFrame -------+----> Fatal      (device failure)
//!         |   ^    |  \
//!   frame |   |    |   +----------> Finished   (stream ended)
//!         v   |    +--------------> Cancelled  (cancel requested)
//!      FrameReady -----------------> Fatal      (sample write / output error)
//!                  \---------------> Finished   (background capture complete)
//! ```
//!
//! Exactly one frame is in flight: the next frame is requested only after the
//! current one has been rendered. Cancellation is checked between frames.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::background::{BackgroundStore, StoreError};
use crate::camera::{CaptureError, FrameSource};
use crate::frame::{PixelBuffer, RawFrame};
use crate::pipeline::{Pipeline, PipelineError};
use crate::terminal::FrameSink;

/// Frames averaged by the FPS counter.
pub const FPS_WINDOW: usize = 10;

/// Cooperative shutdown flag shared with a signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Cancel on Ctrl+C / SIGTERM. Call once at startup.
    pub fn install_ctrlc_handler(&self) -> Result<(), ctrlc::Error> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            log::info!("interrupt received, shutting down");
            token.cancel();
        })
    }
}

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("aborting background capture: {0}")]
    Store(#[from] StoreError),

    #[error("failed to write frame: {0}")]
    Output(#[from] io::Error),
}

/// States of the render loop.
#[derive(Debug)]
pub enum LoopState {
    AwaitingFrame,
    FrameReady(RawFrame),
    Cancelled,
    Finished,
    Fatal(SessionError),
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoopState::Cancelled | LoopState::Finished | LoopState::Fatal(_)
        )
    }
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames_rendered: u64,
    pub frames_dropped: u64,
    pub timeouts: u64,
    pub samples_saved: u32,
}

/// Writes consecutive decoded frames as background samples `0..count`.
#[derive(Debug)]
pub struct BackgroundRecorder {
    store: BackgroundStore,
    next_index: u32,
    count: u32,
}

impl BackgroundRecorder {
    pub fn new(store: BackgroundStore, count: u32) -> Self {
        Self {
            store,
            next_index: 0,
            count,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.next_index >= self.count
    }

    /// Save `frame` as the next sample. Returns `true` once all samples are
    /// written.
    pub fn record(&mut self, frame: &PixelBuffer) -> Result<bool, StoreError> {
        if !self.is_complete() {
            self.store.save(self.next_index, frame)?;
            self.next_index += 1;
        }
        Ok(self.is_complete())
    }

    pub fn saved(&self) -> u32 {
        self.next_index
    }
}

/// Moving average of render rate over the last [`FPS_WINDOW`] frames.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    samples: [f64; FPS_WINDOW],
    next: usize,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        self.samples[self.next] = if secs > 0.0 { 1.0 / secs } else { 0.0 };
        self.next = (self.next + 1) % FPS_WINDOW;
    }

    /// Average over the whole window; unfilled slots count as zero.
    pub fn average(&self) -> f64 {
        self.samples.iter().sum::<f64>() / FPS_WINDOW as f64
    }
}

/// One capture/render session.
pub struct Session<'a, S: FrameSource, K: FrameSink> {
    source: S,
    sink: K,
    pipeline: &'a Pipeline,
    cancel: CancelToken,
    recorder: Option<BackgroundRecorder>,
    fps: Option<FpsCounter>,
    stats: SessionStats,
}

impl<'a, S: FrameSource, K: FrameSink> Session<'a, S, K> {
    pub fn new(source: S, sink: K, pipeline: &'a Pipeline, cancel: CancelToken) -> Self {
        Self {
            source,
            sink,
            pipeline,
            cancel,
            recorder: None,
            fps: None,
            stats: SessionStats::default(),
        }
    }

    /// Save every decoded frame as a background sample until `recorder` is
    /// complete, then finish.
    pub fn with_recorder(mut self, recorder: BackgroundRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Print the render rate below each frame.
    pub fn with_fps(mut self) -> Self {
        self.fps = Some(FpsCounter::new());
        self
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Advance the state machine by one transition.
    pub fn step(&mut self, state: LoopState) -> LoopState {
        match state {
            LoopState::AwaitingFrame => self.await_frame(),
            LoopState::FrameReady(raw) => self.handle_frame(raw),
            terminal => terminal,
        }
    }

    fn await_frame(&mut self) -> LoopState {
        if self.cancel.is_cancelled() {
            return LoopState::Cancelled;
        }

        match self.source.next_frame() {
            Ok(raw) => LoopState::FrameReady(raw),
            Err(CaptureError::Timeout) => {
                log::debug!("timed out waiting for frame");
                self.stats.timeouts += 1;
                LoopState::AwaitingFrame
            }
            Err(e) if e.is_recoverable() => {
                log::debug!("skipping frame: {}", e);
                self.stats.frames_dropped += 1;
                LoopState::AwaitingFrame
            }
            Err(CaptureError::EndOfStream) => {
                log::info!("capture stream ended");
                LoopState::Finished
            }
            Err(e) => LoopState::Fatal(e.into()),
        }
    }

    fn handle_frame(&mut self, raw: RawFrame) -> LoopState {
        let decoded = match self.pipeline.decode(&raw) {
            Ok(img) => img,
            Err(e) => {
                log::debug!("dropping frame: {}", e);
                self.stats.frames_dropped += 1;
                return LoopState::AwaitingFrame;
            }
        };

        let mut capture_complete = false;
        if let Some(recorder) = self.recorder.as_mut() {
            match recorder.record(&decoded) {
                Ok(done) => {
                    self.stats.samples_saved = recorder.saved();
                    capture_complete = done;
                }
                Err(e) => return LoopState::Fatal(e.into()),
            }
        }

        let started = Instant::now();
        let text = match self.pipeline.render(&decoded) {
            Ok(text) => text,
            Err(e) if e.is_recoverable() => {
                log::debug!("dropping frame: {}", e);
                self.stats.frames_dropped += 1;
                return LoopState::AwaitingFrame;
            }
            Err(e) => return LoopState::Fatal(e.into()),
        };

        if let Err(e) = self.sink.present(&text) {
            return LoopState::Fatal(e.into());
        }
        self.stats.frames_rendered += 1;

        if let Some(fps) = self.fps.as_mut() {
            fps.record(started.elapsed());
            let line = format!("FPS: {:.0}", fps.average());
            if let Err(e) = self.sink.status(&line) {
                return LoopState::Fatal(e.into());
            }
        }

        if capture_complete {
            log::info!("background capture complete ({} samples)", self.stats.samples_saved);
            LoopState::Finished
        } else {
            LoopState::AwaitingFrame
        }
    }

    /// Run until cancelled, finished or a fatal error occurs.
    pub fn run(&mut self) -> Result<SessionStats, SessionError> {
        let mut state = LoopState::AwaitingFrame;
        while !state.is_terminal() {
            state = self.step(state);
        }

        match state {
            LoopState::Fatal(e) => Err(e),
            _ => Ok(self.stats),
        }
    }
}
