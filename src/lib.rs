//! termcam library crate.
//!
//! Turns a live YUYV camera feed into a text stream for a terminal. The
//! per-frame path is:
//!
//! raw frame -> [`frame::decode_yuyv`] -> [`frame::resample`] ->
//! optional [`chroma_key::ChromaKey`] -> [`ascii::GlyphRenderer`] or
//! [`ascii::BlockRenderer`] -> [`terminal::FrameSink`]

pub mod ascii;
pub mod background;
pub mod camera;
pub mod chroma_key;
pub mod config;
pub mod event_loop;
pub mod frame;
pub mod pipeline;
pub mod terminal;
