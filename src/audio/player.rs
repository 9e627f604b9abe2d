//! Single-tone playback engine
//!
//! Manages at most one playing tone. A new play request replaces the current
//! tone: the previous session's sink is stopped and released under the engine
//! lock before the new sink is opened, so there is never a window with two
//! sessions writing to the device.
//!
//! Playback calls never surface errors; a failed sink acquisition leaves the
//! engine idle and is observable only through `is_currently_playing`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::sink::{AudioSink, SinkError, SinkFactory};
use super::tone;
use super::DEFAULT_SAMPLE_RATE;

/// Pause before retrying after the sink accepts a partial chunk.
pub(crate) const SHORT_WRITE_BACKOFF: Duration = Duration::from_millis(1);

/// One live generation-and-output session.
pub(crate) struct ToneSession {
    pub(crate) id: u64,
    pub(crate) sink: Arc<dyn AudioSink>,
    pub(crate) task: Option<thread::JoinHandle<()>>,
}

struct PlayerState {
    playing: bool,
    closed: bool,
    next_id: u64,
    session: Option<ToneSession>,
}

/// Plays a single sine tone at a time through an injected sink.
pub struct TonePlayer {
    inner: Arc<Mutex<PlayerState>>,
    volume: Arc<AtomicU32>,
    factory: Arc<dyn SinkFactory>,
}

impl TonePlayer {
    pub fn new(factory: Arc<dyn SinkFactory>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PlayerState {
                playing: false,
                closed: false,
                next_id: 0,
                session: None,
            })),
            volume: Arc::new(AtomicU32::new(1.0_f32.to_bits())),
            factory,
        }
    }

    /// Play through the system default output device.
    pub fn with_default_output() -> Self {
        Self::new(Arc::new(super::output::CpalSinkFactory))
    }

    /// Play `frequency` at 44100 Hz and full volume.
    pub fn play(&self, frequency: f64) {
        self.play_frequency(frequency, DEFAULT_SAMPLE_RATE, 1.0);
    }

    /// Start playing `frequency`, replacing any tone already playing.
    ///
    /// Returns immediately; generation happens on a background thread. On any
    /// sink failure the engine is left idle and nothing is raised.
    pub fn play_frequency(&self, frequency: f64, sample_rate: u32, volume: f32) {
        let stale_task = {
            let mut state = self.inner.lock().unwrap();
            if state.closed {
                log::debug!("play_frequency after release ignored");
                return;
            }
            let stale = clear_session(&mut state);

            let volume = volume.clamp(0.0, 1.0);
            self.volume.store(volume.to_bits(), Ordering::Relaxed);

            if let Err(e) = self.open_session(&mut state, frequency, sample_rate, volume) {
                log::warn!("Failed to start {} Hz tone: {}", frequency, e);
            }
            stale
        };
        // Join the replaced task outside the lock; its loop needs the lock to
        // observe the cancellation.
        if let Some(task) = stale_task {
            let _ = task.join();
        }
    }

    fn open_session(
        &self,
        state: &mut PlayerState,
        frequency: f64,
        sample_rate: u32,
        volume: f32,
    ) -> Result<(), SinkError> {
        let sink = self.factory.open(sample_rate)?;
        if let Err(e) = sink.set_volume(volume).and_then(|_| sink.start()) {
            sink.release();
            return Err(e);
        }

        let id = state.next_id;
        state.next_id += 1;
        state.playing = true;

        let task = {
            let inner = Arc::clone(&self.inner);
            let volume = Arc::clone(&self.volume);
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                generation_loop(&inner, id, &*sink, frequency, sample_rate, &volume);
                finish_session(&inner, id);
            })
        };
        state.session = Some(ToneSession {
            id,
            sink,
            task: Some(task),
        });
        log::info!("Playing {} Hz ({} Hz sample rate)", frequency, sample_rate);
        Ok(())
    }

    /// Set the engine volume, clamped to `[0, 1]`, and propagate it to the
    /// live sink if there is one. Propagation failures are swallowed.
    pub fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.volume.store(volume.to_bits(), Ordering::Relaxed);
        let state = self.inner.lock().unwrap();
        if let Some(session) = &state.session {
            if let Err(e) = session.sink.set_volume(volume) {
                log::debug!("Volume update not applied to sink: {}", e);
            }
        }
    }

    /// Last clamped volume.
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    pub fn is_currently_playing(&self) -> bool {
        self.inner.lock().unwrap().playing
    }

    /// Stop the current tone, if any. Idempotent.
    pub fn stop(&self) {
        let stale_task = {
            let mut state = self.inner.lock().unwrap();
            clear_session(&mut state)
        };
        if let Some(task) = stale_task {
            let _ = task.join();
        }
    }

    /// Stop playback and permanently close the engine. Returns once the
    /// generation task has exited; later calls are silent no-ops.
    pub fn release(&self) {
        let stale_task = {
            let mut state = self.inner.lock().unwrap();
            state.closed = true;
            clear_session(&mut state)
        };
        if let Some(task) = stale_task {
            let _ = task.join();
        }
        log::info!("Tone player released");
    }
}

impl Drop for TonePlayer {
    fn drop(&mut self) {
        self.release();
    }
}

/// Tear down the current session under the lock and hand back its task
/// handle for the caller to join after unlocking.
fn clear_session(state: &mut PlayerState) -> Option<thread::JoinHandle<()>> {
    state.playing = false;
    state.session.take().and_then(|mut session| {
        session.sink.stop();
        session.sink.release();
        session.task.take()
    })
}

/// Clear engine state when the generation task exits on its own (write
/// failure or sink loss). A replacement session keeps its own state.
fn finish_session(inner: &Mutex<PlayerState>, id: u64) {
    let mut state = inner.lock().unwrap();
    if state.session.as_ref().map(|s| s.id) == Some(id) {
        state.playing = false;
        if let Some(session) = state.session.take() {
            drop(state);
            session.sink.stop();
            session.sink.release();
        }
    }
}

/// Chunked generation loop shared by both engines.
///
/// `still_current` decides continuation each iteration; it is the
/// cancellation observation point, so stopping takes effect within one chunk.
pub(crate) fn run_tone_loop(
    sink: &dyn AudioSink,
    frequency: f64,
    sample_rate: u32,
    volume: &AtomicU32,
    still_current: impl Fn() -> bool,
) {
    let mut buf = vec![0i16; tone::chunk_len(sample_rate)];
    loop {
        if !still_current() || !sink.is_open() {
            break;
        }
        let gain = f32::from_bits(volume.load(Ordering::Relaxed));
        tone::fill_chunk(&mut buf, frequency, sample_rate, gain);
        let written = sink.write(&buf);
        if written < 0 {
            break;
        }
        if (written as usize) < buf.len() {
            thread::sleep(SHORT_WRITE_BACKOFF);
        }
    }
}

fn generation_loop(
    inner: &Arc<Mutex<PlayerState>>,
    id: u64,
    sink: &dyn AudioSink,
    frequency: f64,
    sample_rate: u32,
    volume: &AtomicU32,
) {
    run_tone_loop(sink, frequency, sample_rate, volume, || {
        let state = inner.lock().unwrap();
        state.session.as_ref().map(|s| s.id) == Some(id)
    });
}
