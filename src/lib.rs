//! tonegen - sine tone synthesis and streaming playback
//!
//! Generates 16-bit mono PCM sine waveforms for one or many simultaneously
//! active frequencies and streams them to an audio output under concurrent
//! start/stop/volume control. The output sink is an injected abstraction so
//! callers (and tests) can substitute their own.
//!
//! ```no_run
//! use tonegen::TonePlayer;
//!
//! let player = TonePlayer::with_default_output();
//! player.play(440.0);
//! std::thread::sleep(std::time::Duration::from_secs(2));
//! player.release();
//! ```

pub mod audio;
pub mod catalog;
pub mod settings;

pub use audio::{
    AudioSink, CpalSinkFactory, MultiTonePlayer, SinkError, SinkFactory, TonePlayer,
    DEFAULT_SAMPLE_RATE,
};
pub use catalog::{Category, Entry};
pub use settings::AppSettings;
