//! Per-frame processing: decode, resample, chroma key and render.
//!
//! A [`Pipeline`] is built once per session from the [`RenderConfig`] and is
//! read-only afterwards. Each call works on a buffer it owns exclusively;
//! nothing carries over from one frame to the next.

use crate::ascii::{BlockRenderer, GlyphRenderer};
use crate::background::{BackgroundStore, StoreError};
use crate::chroma_key::{ChromaKey, ChromaKeyError};
use crate::config::{RenderConfig, RenderMode};
use crate::frame::{decode_yuyv, resample, DecodeError, Kernel, PixelBuffer, RawFrame};

/// Errors from building or running the frame pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    ChromaKey(#[from] ChromaKeyError),

    #[error("could not load background samples: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Decode failures drop the frame; everything else ends the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::Decode(_))
    }
}

/// Text renderer selected by [`RenderMode`].
#[derive(Debug, Clone)]
pub enum Renderer {
    Glyph(GlyphRenderer),
    Block(BlockRenderer),
}

impl Renderer {
    pub fn from_config(config: &RenderConfig) -> Self {
        match config.mode {
            RenderMode::Glyph => Renderer::Glyph(GlyphRenderer::new(
                config.ramp.clone(),
                config.forced_color,
                config.profile,
            )),
            RenderMode::Block => Renderer::Block(BlockRenderer::new(config.profile, config.width)),
        }
    }

    pub fn render(&self, img: &PixelBuffer) -> String {
        match self {
            Renderer::Glyph(r) => r.render(img),
            Renderer::Block(r) => r.render(img),
        }
    }
}

/// The frame-processing chain for one session.
#[derive(Debug, Clone)]
pub struct Pipeline {
    working_size: (u32, u32),
    kernel: Kernel,
    chroma_key: Option<ChromaKey>,
    renderer: Renderer,
}

impl Pipeline {
    /// Build a pipeline from explicit parts.
    ///
    /// A chroma key must have been prepared at `working_size`.
    pub fn new(
        working_size: (u32, u32),
        renderer: Renderer,
        chroma_key: Option<ChromaKey>,
    ) -> Result<Self, PipelineError> {
        if let Some(key) = &chroma_key {
            let (sample_width, sample_height) = key.dimensions();
            if (sample_width, sample_height) != working_size {
                return Err(ChromaKeyError::DimensionMismatch {
                    index: 0,
                    sample_width,
                    sample_height,
                    frame_width: working_size.0,
                    frame_height: working_size.1,
                }
                .into());
            }
        }

        Ok(Self {
            working_size,
            kernel: Kernel::Bilinear,
            chroma_key,
            renderer,
        })
    }

    /// Build the pipeline described by `config`, loading background samples
    /// from `store` when chroma keying is enabled. A missing or unreadable
    /// sample is an error.
    pub fn from_config(config: &RenderConfig, store: &BackgroundStore) -> Result<Self, PipelineError> {
        let working_size = config.working_size();

        let chroma_key = match config.chroma_key {
            Some(threshold) => {
                let (width, height) = working_size;
                let samples = store.load_all(&config.background.samples, width, height)?;
                log::info!(
                    "loaded {} background sample(s) from {}",
                    samples.len(),
                    store.dir().display()
                );
                Some(ChromaKey::new(&samples, threshold)?)
            }
            None => None,
        };

        let pipeline = Self::new(working_size, Renderer::from_config(config), chroma_key)?;
        Ok(match config.mode {
            RenderMode::Glyph => pipeline,
            // Block cells carry color only, so the fit gets the sharper kernel
            RenderMode::Block => pipeline.with_kernel(Kernel::Lanczos3),
        })
    }

    /// Use `kernel` for the per-frame resize to the working size.
    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn working_size(&self) -> (u32, u32) {
        self.working_size
    }

    /// Decode a raw frame at capture resolution.
    pub fn decode(&self, raw: &RawFrame) -> Result<PixelBuffer, DecodeError> {
        decode_yuyv(raw)
    }

    /// Scale a decoded frame to the working size with the pipeline's kernel
    /// (bilinear for glyphs, Lanczos3 for the block-mode fit), key out the background
    /// and render it to text.
    pub fn render(&self, decoded: &PixelBuffer) -> Result<String, PipelineError> {
        let (width, height) = self.working_size;
        let mut img = resample(decoded, width, height, self.kernel);

        if let Some(key) = &self.chroma_key {
            let keyed = key.apply(&mut img)?;
            log::trace!("keyed out {} of {} pixels", keyed, width * height);
        }

        Ok(self.renderer.render(&img))
    }

    /// Run the whole chain on one raw frame.
    pub fn process(&self, raw: &RawFrame) -> Result<String, PipelineError> {
        let decoded = self.decode(raw)?;
        self.render(&decoded)
    }
}
