//! Terminal-facing collaborators: color capabilities, screen state and the
//! frame sink.

mod palette;
mod screen;
mod sink;

pub use palette::{ColorProfile, ParseColorError, Rgb};
pub use screen::ScreenGuard;
pub use sink::{FrameSink, TerminalSink};
