//! Audio output sink contract
//!
//! The engines stream PCM through this boundary instead of talking to a
//! device directly. The factory is constructor-injected so tests can
//! substitute a recording fake for the cpal-backed implementation.

use std::sync::Arc;

use thiserror::Error;

/// Errors from opening or driving an output sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("no output device available")]
    NoDevice,

    #[error("unsupported output configuration: {0}")]
    UnsupportedConfig(String),

    #[error("failed to open output stream: {0}")]
    OpenFailed(String),

    #[error("output stream error: {0}")]
    Stream(String),
}

/// A live streaming audio output.
///
/// Mono, 16-bit signed PCM at the sample rate the sink was opened with.
/// All methods are safe to call from any thread; `write` is the only one
/// expected on the hot path.
pub trait AudioSink: Send + Sync {
    /// Set the sink's output volume in `[0, 1]`.
    fn set_volume(&self, volume: f32) -> Result<(), SinkError>;

    /// Begin consuming written samples.
    fn start(&self) -> Result<(), SinkError>;

    /// Non-blocking write. Returns the number of samples accepted, which may
    /// be less than `chunk.len()` if the sink's buffer is full, or a negative
    /// value if the sink can no longer accept audio.
    fn write(&self, chunk: &[i16]) -> isize;

    /// Pause output. Safe to call more than once.
    fn stop(&self);

    /// Release the underlying device resources. After this, `is_open`
    /// returns false and `write` returns a negative value.
    fn release(&self);

    /// Whether the sink still holds an initialized output stream.
    fn is_open(&self) -> bool;
}

/// Opens sinks for a requested sample rate.
///
/// One synchronous attempt per call: it either yields a started-able sink or
/// an error, never retries.
pub trait SinkFactory: Send + Sync {
    fn open(&self, sample_rate: u32) -> Result<Arc<dyn AudioSink>, SinkError>;
}
