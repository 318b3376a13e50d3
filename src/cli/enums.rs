//! CLI value enums and their conversions into library types.

use clap::ValueEnum;

use termcam::ascii;
use termcam::config::{ProfileChoice, SourceKind};

/// ASCII character set for glyph rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CharacterSet {
    #[default]
    Classic,
    Standard,
    Blocks,
    Minimal,
}

impl From<CharacterSet> for ascii::CharSet {
    fn from(c: CharacterSet) -> Self {
        match c {
            CharacterSet::Classic => ascii::CharSet::Classic,
            CharacterSet::Standard => ascii::CharSet::Standard,
            CharacterSet::Blocks => ascii::CharSet::Blocks,
            CharacterSet::Minimal => ascii::CharSet::Minimal,
        }
    }
}

/// Frame source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Spawn ffmpeg against the capture device
    Ffmpeg,
    /// Read raw YUYV frames from standard input
    Stdin,
    /// Open the device directly (requires the `camera` feature)
    Native,
}

impl From<Source> for SourceKind {
    fn from(s: Source) -> Self {
        match s {
            Source::Ffmpeg => SourceKind::Ffmpeg,
            Source::Stdin => SourceKind::Stdin,
            Source::Native => SourceKind::Native,
        }
    }
}

/// Terminal color profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    Auto,
    Truecolor,
    Ansi256,
    Ansi,
    None,
}

impl From<Profile> for ProfileChoice {
    fn from(p: Profile) -> Self {
        match p {
            Profile::Auto => ProfileChoice::Auto,
            Profile::Truecolor => ProfileChoice::TrueColor,
            Profile::Ansi256 => ProfileChoice::Ansi256,
            Profile::Ansi => ProfileChoice::Ansi,
            Profile::None => ProfileChoice::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_to_ascii_charset() {
        assert_eq!(
            ascii::CharSet::from(CharacterSet::Classic),
            ascii::CharSet::Classic
        );
        assert_eq!(
            ascii::CharSet::from(CharacterSet::Blocks),
            ascii::CharSet::Blocks
        );
        assert_eq!(
            ascii::CharSet::from(CharacterSet::Minimal),
            ascii::CharSet::Minimal
        );
    }

    #[test]
    fn test_profile_to_choice() {
        assert_eq!(ProfileChoice::from(Profile::Truecolor), ProfileChoice::TrueColor);
        assert_eq!(ProfileChoice::from(Profile::None), ProfileChoice::None);
    }

    #[test]
    fn test_source_to_kind() {
        assert_eq!(SourceKind::from(Source::Stdin), SourceKind::Stdin);
    }
}
