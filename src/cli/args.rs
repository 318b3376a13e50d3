//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{CharacterSet, Profile, Source};
use termcam::config::{Overrides, RenderMode};

/// Render a webcam feed as text in the terminal
#[derive(Parser, Debug)]
#[command(name = "termcam")]
#[command(version, about = "Live webcam rendered as terminal text", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Where frames come from
    #[arg(long, value_enum)]
    pub source: Option<Source>,

    /// Capture device (e.g. /dev/video0)
    #[arg(long)]
    pub device: Option<String>,

    /// Camera capture width
    #[arg(long)]
    pub cam_width: Option<u32>,

    /// Camera capture height
    #[arg(long)]
    pub cam_height: Option<u32>,

    /// Output width in columns (default: terminal width)
    #[arg(long, short = 'W')]
    pub width: Option<u32>,

    /// Output height in rows (default: terminal height)
    #[arg(long, short = 'H')]
    pub height: Option<u32>,

    /// Render with colored half blocks instead of glyphs
    #[arg(long)]
    pub block: bool,

    /// Use a single foreground color (hex, e.g. "#00ff00")
    #[arg(long)]
    pub color: Option<String>,

    /// ASCII character set
    #[arg(long, value_enum)]
    pub charset: Option<CharacterSet>,

    /// Custom glyph ramp, emptiest to densest
    #[arg(long)]
    pub ramp: Option<String>,

    /// Terminal color profile
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,

    /// Remove the background using stored samples
    #[arg(long)]
    pub greenscreen: bool,

    /// Chroma-key distance threshold
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Directory holding background samples
    #[arg(long)]
    pub sample_dir: Option<PathBuf>,

    /// Background sample index to load (repeatable)
    #[arg(long = "sample")]
    pub samples: Vec<u32>,

    /// Capture a new set of background samples
    #[arg(long)]
    pub gen: bool,

    /// Show frames per second
    #[arg(long)]
    pub fps: bool,
}

impl Args {
    /// Command-line values that override the config file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            width: self.width,
            height: self.height,
            mode: self.block.then_some(RenderMode::Block),
            color: self.color.clone(),
            charset: self.charset.map(Into::into),
            ramp: self.ramp.clone(),
            profile: self.profile.map(Into::into),
            fps: self.fps,
            source: self.source.map(Into::into),
            device: self.device.clone(),
            capture_width: self.cam_width,
            capture_height: self.cam_height,
            chroma_key: self.greenscreen,
            threshold: self.threshold,
            sample_dir: self.sample_dir.clone(),
            samples: self.samples.clone(),
            capture_background: self.gen,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Create default config file
    Init,
}
