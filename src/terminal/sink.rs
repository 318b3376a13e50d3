//! Output surface for rendered frames.

use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};

/// Destination for complete rendered frames.
pub trait FrameSink {
    /// Draw `frame` (newline-delimited rows) in place of the previous one.
    fn present(&mut self, frame: &str) -> io::Result<()>;

    /// Write a status line below the frame (e.g. the FPS counter).
    fn status(&mut self, line: &str) -> io::Result<()>;
}

/// Redraws frames in place by moving the cursor to the origin first.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TerminalSink<W> {
    fn present(&mut self, frame: &str) -> io::Result<()> {
        crossterm::queue!(self.out, MoveTo(0, 0))?;
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }

    fn status(&mut self, line: &str) -> io::Result<()> {
        crossterm::queue!(self.out, Clear(ClearType::CurrentLine))?;
        self.out.write_all(line.as_bytes())?;
        self.out.flush()
    }
}
