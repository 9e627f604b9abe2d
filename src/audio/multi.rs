//! Multi-tone playback engine
//!
//! Keeps an independent session per frequency, each with its own sink and
//! generation thread. Session identity is the exact bit pattern of the `f64`
//! frequency: two values that differ in the last bit are two sessions, by
//! design. A play request for an already-active frequency is a no-op.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use super::player::{run_tone_loop, ToneSession};
use super::sink::{SinkError, SinkFactory};
use super::DEFAULT_SAMPLE_RATE;

/// Map key preserving exact `f64` identity (no rounding or quantizing).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct FreqKey(u64);

impl FreqKey {
    fn new(hz: f64) -> Self {
        Self(hz.to_bits())
    }

    fn hz(self) -> f64 {
        f64::from_bits(self.0)
    }
}

struct MultiState {
    closed: bool,
    next_id: u64,
    sessions: HashMap<FreqKey, ToneSession>,
}

/// Plays any number of simultaneous sine tones, one sink per frequency.
pub struct MultiTonePlayer {
    inner: Arc<Mutex<MultiState>>,
    volume: Arc<AtomicU32>,
    factory: Arc<dyn SinkFactory>,
}

impl MultiTonePlayer {
    pub fn new(factory: Arc<dyn SinkFactory>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MultiState {
                closed: false,
                next_id: 0,
                sessions: HashMap::new(),
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

    /// Start a session for `frequency` unless one is already active.
    ///
    /// Idempotent per exact frequency value: a second call neither replaces
    /// the session nor restarts generation. Sink failures register nothing.
    pub fn play_frequency(&self, frequency: f64, sample_rate: u32, volume: f32) {
        let mut state = self.inner.lock().unwrap();
        if state.closed {
            log::debug!("play_frequency after release ignored");
            return;
        }
        let key = FreqKey::new(frequency);
        if state.sessions.contains_key(&key) {
            return;
        }

        let volume = volume.clamp(0.0, 1.0);
        self.volume.store(volume.to_bits(), Ordering::Relaxed);

        if let Err(e) = self.open_session(&mut state, key, sample_rate, volume) {
            log::warn!("Failed to start {} Hz tone: {}", frequency, e);
        }
    }

    fn open_session(
        &self,
        state: &mut MultiState,
        key: FreqKey,
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

        let task = {
            let inner = Arc::clone(&self.inner);
            let volume = Arc::clone(&self.volume);
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                run_tone_loop(&*sink, key.hz(), sample_rate, &volume, || {
                    let state = inner.lock().unwrap();
                    state.sessions.get(&key).map(|s| s.id) == Some(id)
                });
                finish_session(&inner, key, id);
            })
        };
        state.sessions.insert(
            key,
            ToneSession {
                id,
                sink,
                task: Some(task),
            },
        );
        log::info!("Playing {} Hz ({} Hz sample rate)", key.hz(), sample_rate);
        Ok(())
    }

    /// Set the shared volume, clamped to `[0, 1]`, and propagate it to every
    /// active session's sink. Propagation failures are swallowed.
    pub fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.volume.store(volume.to_bits(), Ordering::Relaxed);
        let state = self.inner.lock().unwrap();
        for session in state.sessions.values() {
            if let Err(e) = session.sink.set_volume(volume) {
                log::debug!("Volume update not applied to sink: {}", e);
            }
        }
    }

    /// Last clamped volume.
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    /// Stop the session for `frequency`. No-op if none is active.
    pub fn stop_frequency(&self, frequency: f64) {
        let key = FreqKey::new(frequency);
        let session = self.inner.lock().unwrap().sessions.remove(&key);
        if let Some(mut session) = session {
            session.sink.stop();
            session.sink.release();
            if let Some(task) = session.task.take() {
                let _ = task.join();
            }
            log::info!("Stopped {} Hz", frequency);
        }
    }

    /// Stop every active session.
    pub fn stop_all(&self) {
        let frequencies = self.active_frequencies();
        for frequency in frequencies {
            self.stop_frequency(frequency);
        }
    }

    pub fn is_frequency_playing(&self, frequency: f64) -> bool {
        self.inner
            .lock()
            .unwrap()
            .sessions
            .contains_key(&FreqKey::new(frequency))
    }

    /// Frequencies with an active session, in ascending order.
    pub fn active_frequencies(&self) -> Vec<f64> {
        let state = self.inner.lock().unwrap();
        let mut frequencies: Vec<f64> = state.sessions.keys().map(|k| k.hz()).collect();
        frequencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        frequencies
    }

    /// Stop everything and permanently close the engine. Returns once all
    /// generation tasks have exited; later calls are silent no-ops.
    pub fn release(&self) {
        self.stop_all();
        self.inner.lock().unwrap().closed = true;
        log::info!("Multi-tone player released");
    }
}

impl Drop for MultiTonePlayer {
    fn drop(&mut self) {
        self.release();
    }
}

/// Remove the session's own map entry when its loop exits on its own (write
/// failure or sink loss). A successor session under the same key is left
/// untouched.
fn finish_session(inner: &Mutex<MultiState>, key: FreqKey, id: u64) {
    let mut state = inner.lock().unwrap();
    if state.sessions.get(&key).map(|s| s.id) == Some(id) {
        if let Some(session) = state.sessions.remove(&key) {
            drop(state);
            session.sink.stop();
            session.sink.release();
        }
    }
}
