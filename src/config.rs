//! Configuration file handling and assembly of the run-time [`RenderConfig`].
//!
//! Settings come from three layers, highest precedence first: command-line
//! overrides, `~/.config/termcam/config.toml` (or `--config PATH`), and
//! built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ascii::{CharSet, IntensityRamp, RampTooShort};
use crate::background::DEFAULT_SAMPLE_INDEX;
use crate::camera::{default_device, CaptureSettings, Resolution};
use crate::chroma_key::DEFAULT_THRESHOLD;
use crate::frame::fit_size;
use crate::terminal::{ColorProfile, ParseColorError, Rgb};

/// Output size used when neither the user nor the terminal provides one.
pub const FALLBACK_SIZE: (u32, u32) = (125, 50);

/// Frames written by background capture mode before it stops.
pub const DEFAULT_CAPTURE_COUNT: u32 = 101;

pub const DEFAULT_SAMPLE_DIR: &str = "bgsample";

/// Template written by `termcam config init`.
pub const DEFAULT_CONFIG_TOML: &str = r##"# termcam configuration

[output]
# Output size in terminal cells (default: terminal size)
# width = 125
# height = 50
# "glyph" or "block"
mode = "glyph"
# Single foreground color for every glyph, e.g. "#00ff00"
# color = "#00ff00"
# classic, standard, blocks or minimal
charset = "classic"
# Custom ramp, emptiest to densest (overrides charset)
# ramp = " .:-=+*#%@"
# auto, truecolor, ansi256, ansi or none
profile = "auto"
fps = false

[capture]
# ffmpeg, stdin or native
source = "ffmpeg"
device = "/dev/video0"
width = 320
height = 180
timeout_ms = 1000

[chroma_key]
enabled = false
threshold = 0.13
directory = "bgsample"
samples = [40]
capture_count = 101
"##;

/// How frames are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One ramp glyph per pixel
    #[default]
    Glyph,
    /// One half-block cell per vertical pixel pair
    Block,
}

/// Where raw frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Ffmpeg,
    Stdin,
    Native,
}

/// Requested color profile; `Auto` is resolved by detection at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileChoice {
    #[default]
    Auto,
    TrueColor,
    Ansi256,
    Ansi,
    None,
}

impl ProfileChoice {
    pub fn resolve(self, detect: impl FnOnce() -> ColorProfile) -> ColorProfile {
        match self {
            ProfileChoice::Auto => detect(),
            ProfileChoice::TrueColor => ColorProfile::TrueColor,
            ProfileChoice::Ansi256 => ColorProfile::Ansi256,
            ProfileChoice::Ansi => ColorProfile::Ansi16,
            ProfileChoice::None => ColorProfile::NoColor,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub capture: CaptureConfig,
    pub chroma_key: ChromaKeyConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mode: Option<RenderMode>,
    pub color: Option<String>,
    pub charset: Option<String>,
    pub ramp: Option<String>,
    pub profile: Option<ProfileChoice>,
    pub fps: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CaptureConfig {
    pub source: Option<SourceKind>,
    pub device: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ChromaKeyConfig {
    pub enabled: bool,
    pub threshold: Option<f64>,
    pub directory: Option<PathBuf>,
    pub samples: Option<Vec<u32>>,
    pub capture_count: Option<u32>,
}

impl Config {
    /// Load configuration from `path`, or from [`default_path`] when `None`.
    ///
    /// A missing default file yields the defaults; an explicitly given path
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.is_some();
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            if explicit {
                return Err(ConfigError::NotFound { path });
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        Self::parse(&content).map_err(|e| ConfigError::Parse { path, source: e })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    InvalidColor(#[from] ParseColorError),

    #[error(transparent)]
    InvalidRamp(#[from] RampTooShort),

    #[error("unknown charset '{0}' (expected classic, standard, blocks or minimal)")]
    UnknownCharset(String),

    #[error("chroma-key threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f64),

    #[error("{name} must be greater than zero")]
    InvalidDimension { name: &'static str },

    #[error("capture width must be even for 4:2:2 frames, got {0}")]
    OddCaptureWidth(u32),

    #[error("chroma key needs at least one background sample index")]
    NoSamples,
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("termcam").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/termcam/config.toml")
        })
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mode: Option<RenderMode>,
    pub color: Option<String>,
    pub charset: Option<CharSet>,
    pub ramp: Option<String>,
    pub profile: Option<ProfileChoice>,
    pub fps: bool,
    pub source: Option<SourceKind>,
    pub device: Option<String>,
    pub capture_width: Option<u32>,
    pub capture_height: Option<u32>,
    pub chroma_key: bool,
    pub threshold: Option<f64>,
    pub sample_dir: Option<PathBuf>,
    pub samples: Vec<u32>,
    pub capture_background: bool,
}

/// Background sample settings shared by capture and chroma-key modes.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSettings {
    pub directory: PathBuf,
    /// Indices loaded for chroma keying
    pub samples: Vec<u32>,
    /// Frames written in capture mode
    pub capture_count: u32,
}

/// Validated, read-only configuration for one session.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Output width in terminal columns
    pub width: u32,
    /// Output height in terminal rows
    pub height: u32,
    pub mode: RenderMode,
    pub ramp: IntensityRamp,
    pub forced_color: Option<Rgb>,
    pub profile: ColorProfile,
    pub show_fps: bool,
    pub source: SourceKind,
    pub capture: CaptureSettings,
    /// Chroma-key distance threshold; `None` when keying is disabled
    pub chroma_key: Option<f64>,
    pub background: BackgroundSettings,
    /// Save captured frames as background samples instead of keying
    pub capture_background: bool,
}

impl RenderConfig {
    /// Merge overrides, file and defaults, then validate.
    ///
    /// `terminal_size` is the current terminal size (columns, rows) when
    /// stdout is a TTY; `detect` is only called for the `auto` profile.
    pub fn resolve(
        file: &Config,
        cli: &Overrides,
        terminal_size: Option<(u16, u16)>,
        detect: impl FnOnce() -> ColorProfile,
    ) -> Result<Self, ConfigError> {
        let (term_width, term_height) = match terminal_size {
            // Keep the last row free so the trailing newline does not scroll
            Some((cols, rows)) if cols > 0 && rows > 1 => (cols as u32, rows as u32 - 1),
            _ => FALLBACK_SIZE,
        };
        let width = cli.width.or(file.output.width).unwrap_or(term_width);
        let height = cli.height.or(file.output.height).unwrap_or(term_height);
        positive("output width", width)?;
        positive("output height", height)?;

        let ramp = match cli.ramp.as_ref().or(file.output.ramp.as_ref()) {
            Some(custom) => IntensityRamp::parse(custom)?,
            None => match (cli.charset, file.output.charset.as_deref()) {
                (Some(set), _) => set.ramp(),
                (None, Some(name)) => CharSet::from_name(name)
                    .ok_or_else(|| ConfigError::UnknownCharset(name.to_string()))?
                    .ramp(),
                (None, None) => IntensityRamp::default(),
            },
        };

        let forced_color = cli
            .color
            .as_deref()
            .or(file.output.color.as_deref())
            .filter(|s| !s.is_empty())
            .map(str::parse::<Rgb>)
            .transpose()?;

        let profile = cli
            .profile
            .or(file.output.profile)
            .unwrap_or_default()
            .resolve(detect);

        let capture_width = cli.capture_width.or(file.capture.width).unwrap_or(Resolution::LOW.width);
        let capture_height = cli
            .capture_height
            .or(file.capture.height)
            .unwrap_or(Resolution::LOW.height);
        positive("capture width", capture_width)?;
        positive("capture height", capture_height)?;
        if capture_width % 2 != 0 {
            return Err(ConfigError::OddCaptureWidth(capture_width));
        }

        let capture = CaptureSettings {
            device: cli
                .device
                .clone()
                .or_else(|| file.capture.device.clone())
                .unwrap_or_else(|| default_device().to_string()),
            resolution: Resolution::new(capture_width, capture_height),
            timeout: Duration::from_millis(file.capture.timeout_ms.unwrap_or(1000)),
        };

        let background = BackgroundSettings {
            directory: cli
                .sample_dir
                .clone()
                .or_else(|| file.chroma_key.directory.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SAMPLE_DIR)),
            samples: if cli.samples.is_empty() {
                file.chroma_key
                    .samples
                    .clone()
                    .unwrap_or_else(|| vec![DEFAULT_SAMPLE_INDEX])
            } else {
                cli.samples.clone()
            },
            capture_count: file.chroma_key.capture_count.unwrap_or(DEFAULT_CAPTURE_COUNT),
        };

        let capture_background = cli.capture_background;
        let chroma_key = if (cli.chroma_key || file.chroma_key.enabled) && !capture_background {
            let threshold = cli
                .threshold
                .or(file.chroma_key.threshold)
                .unwrap_or(DEFAULT_THRESHOLD);
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ConfigError::InvalidThreshold(threshold));
            }
            if background.samples.is_empty() {
                return Err(ConfigError::NoSamples);
            }
            Some(threshold)
        } else {
            None
        };

        Ok(Self {
            width,
            height,
            mode: cli.mode.or(file.output.mode).unwrap_or_default(),
            ramp,
            forced_color,
            profile,
            show_fps: cli.fps || file.output.fps,
            source: cli.source.or(file.capture.source).unwrap_or_default(),
            capture,
            chroma_key,
            background,
            capture_background,
        })
    }

    /// Pixel resolution the pipeline works at.
    ///
    /// Glyph mode stretches the frame to one pixel per cell. Block mode packs
    /// two pixels per cell, which makes them roughly square, so the capture
    /// aspect ratio is kept and the image fits inside `width` x `2 * height`.
    pub fn working_size(&self) -> (u32, u32) {
        match self.mode {
            RenderMode::Glyph => (self.width, self.height),
            RenderMode::Block => {
                let capture = self.capture.resolution;
                fit_size(capture.width, capture.height, self.width, self.height.saturating_mul(2))
            }
        }
    }
}

fn positive(name: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::InvalidDimension { name })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn resolve(file: &Config, cli: &Overrides) -> Result<RenderConfig, ConfigError> {
        RenderConfig::resolve(file, cli, None, || ColorProfile::Ansi256)
    }

    #[test]
    fn test_defaults() {
        let cfg = resolve(&Config::default(), &Overrides::default()).unwrap();
        assert_eq!((cfg.width, cfg.height), FALLBACK_SIZE);
        assert_eq!(cfg.mode, RenderMode::Glyph);
        assert_eq!(cfg.ramp, IntensityRamp::default());
        assert_eq!(cfg.profile, ColorProfile::Ansi256);
        assert_eq!(cfg.capture.resolution, Resolution::new(320, 180));
        assert_eq!(cfg.background.samples, vec![40]);
        assert_eq!(cfg.background.directory, PathBuf::from("bgsample"));
        assert_eq!(cfg.background.capture_count, 101);
        assert!(cfg.chroma_key.is_none());
        assert!(cfg.forced_color.is_none());
        assert!(!cfg.show_fps);
    }

    #[test]
    fn test_terminal_size_used_when_unset() {
        let cfg = RenderConfig::resolve(
            &Config::default(),
            &Overrides::default(),
            Some((80, 24)),
            || ColorProfile::NoColor,
        )
        .unwrap();
        assert_eq!((cfg.width, cfg.height), (80, 23));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = Config::parse(
            r##"
            [output]
            width = 40
            height = 20
            mode = "block"
            color = "#ff0000"

            [chroma_key]
            enabled = true
            threshold = 0.2
            samples = [1, 2]
            "##,
        )
        .unwrap();
        let cli = Overrides {
            width: Some(60),
            color: Some("#00ff00".to_string()),
            threshold: Some(0.1),
            ..Default::default()
        };
        let cfg = resolve(&file, &cli).unwrap();
        assert_eq!((cfg.width, cfg.height), (60, 20));
        assert_eq!(cfg.mode, RenderMode::Block);
        assert_eq!(cfg.working_size(), (60, 34));
        assert_eq!(cfg.forced_color, Some(Rgb::new(0, 255, 0)));
        assert_eq!(cfg.chroma_key, Some(0.1));
        assert_eq!(cfg.background.samples, vec![1, 2]);
    }

    #[test]
    fn test_block_working_size_huge_height() {
        let cli = Overrides {
            width: Some(100),
            height: Some(u32::MAX),
            mode: Some(RenderMode::Block),
            ..Default::default()
        };
        let cfg = resolve(&Config::default(), &cli).unwrap();
        assert_eq!(cfg.working_size(), (100, 56));
    }

    #[test]
    fn test_capture_mode_disables_chroma_key() {
        let cli = Overrides {
            chroma_key: true,
            capture_background: true,
            ..Default::default()
        };
        let cfg = resolve(&Config::default(), &cli).unwrap();
        assert!(cfg.capture_background);
        assert!(cfg.chroma_key.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let bad_color = Overrides {
            color: Some("#zz0000".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve(&Config::default(), &bad_color),
            Err(ConfigError::InvalidColor(_))
        ));

        let bad_ramp = Overrides {
            ramp: Some("#".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve(&Config::default(), &bad_ramp),
            Err(ConfigError::InvalidRamp(_))
        ));

        let bad_threshold = Overrides {
            chroma_key: true,
            threshold: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(
            resolve(&Config::default(), &bad_threshold),
            Err(ConfigError::InvalidThreshold(_))
        ));

        let zero_width = Overrides {
            width: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            resolve(&Config::default(), &zero_width),
            Err(ConfigError::InvalidDimension { .. })
        ));

        let odd = Overrides {
            capture_width: Some(321),
            ..Default::default()
        };
        assert!(matches!(
            resolve(&Config::default(), &odd),
            Err(ConfigError::OddCaptureWidth(321))
        ));
    }

    #[test]
    fn test_unknown_charset_in_file() {
        let file = Config::parse("[output]\ncharset = \"braille\"\n").unwrap();
        assert!(matches!(
            resolve(&file, &Overrides::default()),
            Err(ConfigError::UnknownCharset(_))
        ));
    }

    #[test]
    fn test_profile_choice() {
        let file = Config::parse("[output]\nprofile = \"none\"\n").unwrap();
        let cfg = resolve(&file, &Overrides::default()).unwrap();
        assert_eq!(cfg.profile, ColorProfile::NoColor);
    }

    #[test]
    fn test_template_parses() {
        let cfg = Config::parse(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(cfg.capture.width, Some(320));
        assert_eq!(cfg.chroma_key.samples, Some(vec![40]));
        assert_eq!(cfg.output.mode, Some(RenderMode::Glyph));
        // The hex color example must not end the literal early
        assert!(DEFAULT_CONFIG_TOML.contains("# color = \"#00ff00\""));
        assert_eq!(cfg.chroma_key.capture_count, Some(101));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let missing = PathBuf::from("/definitely/not/here/config.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[capture]\nsource = \"stdin\"\ntimeout_ms = 250").unwrap();
        let cfg = Config::load(Some(file.path())).unwrap();
        assert_eq!(cfg.capture.source, Some(SourceKind::Stdin));
        assert_eq!(cfg.capture.timeout_ms, Some(250));
    }

    #[test]
    fn test_load_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output\nwidth = ").unwrap();
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }
}
