//! Recording sink used by the engine tests.
//!
//! Captures written samples instead of emitting sound, with a bounded
//! capacity so generation loops hit the short-write path and stay paced
//! instead of filling memory.

use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::sink::{AudioSink, SinkError, SinkFactory};

pub struct FakeSink {
    written: Mutex<Vec<i16>>,
    volume: Mutex<f32>,
    open: AtomicBool,
    started: AtomicBool,
    released: AtomicBool,
    capacity: usize,
    /// Samples to accept before `write` starts returning -1; negative means
    /// never fail.
    fail_after: AtomicIsize,
}

impl FakeSink {
    fn new(capacity: usize) -> Self {
        Self {
            written: Mutex::new(Vec::new()),
            volume: Mutex::new(1.0),
            open: AtomicBool::new(true),
            started: AtomicBool::new(false),
            released: AtomicBool::new(false),
            capacity,
            fail_after: AtomicIsize::new(-1),
        }
    }

    pub fn written(&self) -> Vec<i16> {
        self.written.lock().unwrap().clone()
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }

    pub fn was_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    pub fn was_released(&self) -> bool {
        self.released.load(Ordering::Relaxed)
    }

    /// Make `write` fail after `samples` more samples have been accepted.
    pub fn fail_after(&self, samples: usize) {
        self.fail_after.store(samples as isize, Ordering::Relaxed);
    }
}

impl AudioSink for FakeSink {
    fn set_volume(&self, volume: f32) -> Result<(), SinkError> {
        if !self.is_open() {
            return Err(SinkError::Stream("sink released".into()));
        }
        *self.volume.lock().unwrap() = volume;
        Ok(())
    }

    fn start(&self) -> Result<(), SinkError> {
        self.started.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn write(&self, chunk: &[i16]) -> isize {
        if !self.is_open() {
            return -1;
        }
        let budget = self.fail_after.load(Ordering::Relaxed);
        if budget == 0 {
            return -1;
        }
        let mut written = self.written.lock().unwrap();
        let mut room = self.capacity.saturating_sub(written.len());
        if budget > 0 {
            room = room.min(budget as usize);
        }
        let accepted = chunk.len().min(room);
        written.extend_from_slice(&chunk[..accepted]);
        if budget > 0 {
            self.fail_after
                .store(budget - accepted as isize, Ordering::Relaxed);
        }
        accepted as isize
    }

    fn stop(&self) {
        self.started.store(false, Ordering::Relaxed);
    }

    fn release(&self) {
        self.open.store(false, Ordering::Relaxed);
        self.released.store(true, Ordering::Relaxed);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }
}

pub struct FakeSinkFactory {
    opened: Mutex<Vec<Arc<FakeSink>>>,
    fail_open: AtomicBool,
    capacity: usize,
}

impl FakeSinkFactory {
    pub fn new() -> Arc<Self> {
        // Room for a few chunks at 44.1 kHz before short writes kick in
        Arc::new(Self {
            opened: Mutex::new(Vec::new()),
            fail_open: AtomicBool::new(false),
            capacity: 4410 * 4,
        })
    }

    pub fn failing() -> Arc<Self> {
        let factory = Self::new();
        factory.fail_open.store(true, Ordering::Relaxed);
        factory
    }

    pub fn opened(&self) -> Vec<Arc<FakeSink>> {
        self.opened.lock().unwrap().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn last(&self) -> Arc<FakeSink> {
        self.opened.lock().unwrap().last().unwrap().clone()
    }
}

impl SinkFactory for FakeSinkFactory {
    fn open(&self, _sample_rate: u32) -> Result<Arc<dyn AudioSink>, SinkError> {
        if self.fail_open.load(Ordering::Relaxed) {
            return Err(SinkError::NoDevice);
        }
        let sink = Arc::new(FakeSink::new(self.capacity));
        self.opened.lock().unwrap().push(Arc::clone(&sink));
        Ok(sink)
    }
}

/// Poll `condition` until it holds or the deadline passes.
pub fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    panic!("timed out waiting for: {}", what);
}
