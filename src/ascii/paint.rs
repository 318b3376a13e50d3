//! Escape-sequence emission for one rendered row.

use crossterm::style::{Color, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::Command;

/// Writes cells into a frame string, emitting color escapes only when the
/// color changes. Every row ends with a reset so no state leaks between rows.
pub(crate) struct RowPainter<'a> {
    out: &'a mut String,
    fg: Option<Color>,
    bg: Option<Color>,
}

impl<'a> RowPainter<'a> {
    pub(crate) fn new(out: &'a mut String) -> Self {
        Self {
            out,
            fg: None,
            bg: None,
        }
    }

    pub(crate) fn cell(&mut self, glyph: char, fg: Option<Color>, bg: Option<Color>) {
        if (self.fg.is_some() && fg.is_none()) || (self.bg.is_some() && bg.is_none()) {
            self.reset();
        }
        if fg != self.fg {
            if let Some(color) = fg {
                emit(self.out, SetForegroundColor(color));
            }
            self.fg = fg;
        }
        if bg != self.bg {
            if let Some(color) = bg {
                emit(self.out, SetBackgroundColor(color));
            }
            self.bg = bg;
        }
        self.out.push(glyph);
    }

    /// Uncolored padding cells.
    pub(crate) fn blank(&mut self, count: usize) {
        for _ in 0..count {
            self.cell(' ', None, None);
        }
    }

    pub(crate) fn finish(mut self) {
        self.reset();
        self.out.push('\n');
    }

    fn reset(&mut self) {
        if self.fg.is_some() || self.bg.is_some() {
            emit(self.out, ResetColor);
        }
        self.fg = None;
        self.bg = None;
    }
}

fn emit(out: &mut String, command: impl Command) {
    // fmt::Write for String never fails
    let _ = command.write_ansi(out);
}

/// Remove CSI escape sequences, leaving only the visible text.
pub fn strip_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.next() == Some('[') {
                // Parameters run until the final byte in 0x40..=0x7e
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_cells_have_no_escapes() {
        let mut s = String::new();
        let mut row = RowPainter::new(&mut s);
        row.cell('a', None, None);
        row.cell('b', None, None);
        row.finish();
        assert_eq!(s, "ab\n");
    }

    #[test]
    fn test_repeated_color_emitted_once() {
        let mut s = String::new();
        let mut row = RowPainter::new(&mut s);
        let red = Some(Color::Rgb { r: 255, g: 0, b: 0 });
        row.cell('x', red, None);
        row.cell('y', red, None);
        row.finish();
        assert_eq!(s, "\x1b[38;2;255;0;0mxy\x1b[0m\n");
    }

    #[test]
    fn test_strip_escapes() {
        assert_eq!(strip_escapes("\x1b[38;5;196m#\x1b[48;2;1;2;3m▀\x1b[0m\n"), "#▀\n");
        assert_eq!(strip_escapes("plain"), "plain");
    }
}
