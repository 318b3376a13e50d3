//! Terminal color capabilities and nearest-color mapping.

use crossterm::style::Color;
use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn distance_sq(&self, other: &Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error for a malformed hex color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}': expected #rgb or #rrggbb")]
pub struct ParseColorError(pub String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#rrggbb` or `#rgb` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                // #abc is shorthand for #aabbcc
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Rgb::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(err()),
        }
    }
}

/// The 16 basic ANSI colors with their xterm default values.
const ANSI16: [(Color, Rgb); 16] = [
    (Color::Black, Rgb::new(0, 0, 0)),
    (Color::DarkRed, Rgb::new(128, 0, 0)),
    (Color::DarkGreen, Rgb::new(0, 128, 0)),
    (Color::DarkYellow, Rgb::new(128, 128, 0)),
    (Color::DarkBlue, Rgb::new(0, 0, 128)),
    (Color::DarkMagenta, Rgb::new(128, 0, 128)),
    (Color::DarkCyan, Rgb::new(0, 128, 128)),
    (Color::Grey, Rgb::new(192, 192, 192)),
    (Color::DarkGrey, Rgb::new(128, 128, 128)),
    (Color::Red, Rgb::new(255, 0, 0)),
    (Color::Green, Rgb::new(0, 255, 0)),
    (Color::Yellow, Rgb::new(255, 255, 0)),
    (Color::Blue, Rgb::new(0, 0, 255)),
    (Color::Magenta, Rgb::new(255, 0, 255)),
    (Color::Cyan, Rgb::new(0, 255, 255)),
    (Color::White, Rgb::new(255, 255, 255)),
];

/// Channel levels of the xterm 6x6x6 color cube (indices 16..=231).
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// What the output terminal can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorProfile {
    /// 24-bit color
    #[default]
    TrueColor,
    /// xterm 256-color palette
    Ansi256,
    /// 16 basic ANSI colors
    Ansi16,
    /// No color escapes at all
    NoColor,
}

impl ColorProfile {
    /// Pick a profile from the number of colors the terminal reports.
    pub fn from_color_count(count: u32) -> Self {
        match count {
            0..=1 => ColorProfile::NoColor,
            2..=16 => ColorProfile::Ansi16,
            17..=256 => ColorProfile::Ansi256,
            _ => ColorProfile::TrueColor,
        }
    }

    /// Detect the profile of stdout once at startup.
    ///
    /// `NO_COLOR` or a non-terminal stdout disable colors; otherwise the
    /// count reported by crossterm (`COLORTERM` / `TERM`) decides.
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            return ColorProfile::NoColor;
        }
        if !std::io::stdout().is_terminal() {
            return ColorProfile::NoColor;
        }
        let count = crossterm::style::available_color_count();
        // crossterm reports truecolor as u16::MAX
        if count == u16::MAX {
            ColorProfile::TrueColor
        } else {
            Self::from_color_count(count as u32)
        }
    }

    /// Nearest color this profile can represent, or `None` for [`ColorProfile::NoColor`].
    pub fn nearest(&self, rgb: Rgb) -> Option<Color> {
        match self {
            ColorProfile::TrueColor => Some(Color::Rgb {
                r: rgb.r,
                g: rgb.g,
                b: rgb.b,
            }),
            ColorProfile::Ansi256 => Some(Color::AnsiValue(nearest_ansi256(rgb))),
            ColorProfile::Ansi16 => Some(nearest_ansi16(rgb)),
            ColorProfile::NoColor => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorProfile::TrueColor => "truecolor",
            ColorProfile::Ansi256 => "ansi256",
            ColorProfile::Ansi16 => "ansi",
            ColorProfile::NoColor => "none",
        }
    }
}

fn nearest_ansi16(rgb: Rgb) -> Color {
    ANSI16
        .iter()
        .min_by_key(|(_, value)| value.distance_sq(&rgb))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}

/// Nearest entry of the 256-color palette, choosing between the closest
/// color-cube cell and the closest step of the grayscale ramp (232..=255).
fn nearest_ansi256(rgb: Rgb) -> u8 {
    let cube_index = |v: u8| -> usize {
        CUBE_LEVELS
            .iter()
            .enumerate()
            .min_by_key(|(_, level)| (**level as i32 - v as i32).abs())
            .map(|(i, _)| i)
            .unwrap_or(0)
    };
    let (ri, gi, bi) = (cube_index(rgb.r), cube_index(rgb.g), cube_index(rgb.b));
    let cube = Rgb::new(CUBE_LEVELS[ri], CUBE_LEVELS[gi], CUBE_LEVELS[bi]);
    let cube_code = (16 + 36 * ri + 6 * gi + bi) as u8;

    // Gray ramp: 24 steps from 8 to 238
    let avg = (rgb.r as u32 + rgb.g as u32 + rgb.b as u32) / 3;
    let gray_step = (avg.saturating_sub(3) / 10).min(23) as u8;
    let level = 8 + 10 * gray_step;
    let gray = Rgb::new(level, level, level);
    let gray_code = 232 + gray_step;

    if gray.distance_sq(&rgb) < cube.distance_sq(&rgb) {
        gray_code
    } else {
        cube_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!("#ff8000".parse::<Rgb>().unwrap(), Rgb::new(255, 128, 0));
        assert_eq!("00ff00".parse::<Rgb>().unwrap(), Rgb::new(0, 255, 0));
        assert_eq!("#fa0".parse::<Rgb>().unwrap(), Rgb::new(255, 170, 0));
    }

    #[test]
    fn test_parse_invalid_colors() {
        assert!("".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert!("red".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let c = Rgb::new(1, 171, 255);
        assert_eq!(c.to_string(), "#01abff");
        assert_eq!(c.to_string().parse::<Rgb>().unwrap(), c);
    }

    #[test]
    fn test_truecolor_is_exact() {
        assert_eq!(
            ColorProfile::TrueColor.nearest(Rgb::new(1, 2, 3)),
            Some(Color::Rgb { r: 1, g: 2, b: 3 })
        );
    }

    #[test]
    fn test_ansi256_cube_and_gray() {
        assert_eq!(nearest_ansi256(Rgb::new(255, 0, 0)), 196);
        assert_eq!(nearest_ansi256(Rgb::new(0, 0, 0)), 16);
        assert_eq!(nearest_ansi256(Rgb::new(255, 255, 255)), 231);
        // Mid gray lands on the gray ramp rather than the cube
        assert_eq!(nearest_ansi256(Rgb::new(128, 128, 128)), 244);
    }

    #[test]
    fn test_ansi16_nearest() {
        assert_eq!(ColorProfile::Ansi16.nearest(Rgb::new(250, 10, 10)), Some(Color::Red));
        assert_eq!(ColorProfile::Ansi16.nearest(Rgb::new(10, 10, 10)), Some(Color::Black));
        assert_eq!(ColorProfile::Ansi16.nearest(Rgb::new(0, 120, 130)), Some(Color::DarkCyan));
    }

    #[test]
    fn test_no_color_profile() {
        assert_eq!(ColorProfile::NoColor.nearest(Rgb::new(9, 9, 9)), None);
    }

    #[test]
    fn test_profile_from_color_count() {
        assert_eq!(ColorProfile::from_color_count(0), ColorProfile::NoColor);
        assert_eq!(ColorProfile::from_color_count(8), ColorProfile::Ansi16);
        assert_eq!(ColorProfile::from_color_count(256), ColorProfile::Ansi256);
        assert_eq!(ColorProfile::from_color_count(1 << 24), ColorProfile::TrueColor);
    }
}
