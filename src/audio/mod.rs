//! Audio module - tone synthesis and streaming playback
//!
//! This module provides:
//! - Pure sine chunk generation
//! - The output sink contract and its cpal implementation
//! - Single-tone and multi-tone playback engines

mod multi;
mod output;
mod player;
mod sink;
mod tone;

#[cfg(test)]
mod fake;

pub use multi::MultiTonePlayer;
pub use output::{CpalSink, CpalSinkFactory};
pub use player::TonePlayer;
pub use sink::{AudioSink, SinkError, SinkFactory};
pub use tone::{chunk_len, fill_chunk};

/// Sample rate used by the convenience `play` methods.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
