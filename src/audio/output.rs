//! cpal-backed audio output sink
//!
//! Implements [`AudioSink`] over the default output device. Generated mono
//! PCM is pushed into an SPSC ring buffer and drained by the cpal output
//! callback, which applies the sink volume and fans the mono signal out to
//! however many channels the device wants.
//!
//! cpal streams are not `Send`, so each sink owns a dedicated thread that
//! builds the stream and services play/pause/release commands; the handle
//! the engines hold only touches atomics, the ring producer, and a channel.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedBufferSize;
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapRb,
};

use super::sink::{AudioSink, SinkError, SinkFactory};

/// Fallback minimum buffer size in frames when the device does not report one.
const DEFAULT_MIN_BUFFER: u32 = 1024;

enum StreamCommand {
    Start(mpsc::Sender<Result<(), SinkError>>),
    Stop,
    Release,
}

/// Opens [`CpalSink`]s on the system default output device.
#[derive(Debug, Default)]
pub struct CpalSinkFactory;

impl SinkFactory for CpalSinkFactory {
    fn open(&self, sample_rate: u32) -> Result<Arc<dyn AudioSink>, SinkError> {
        CpalSink::open(sample_rate).map(|sink| Arc::new(sink) as Arc<dyn AudioSink>)
    }
}

/// One open output stream on the default device.
pub struct CpalSink {
    producer: Mutex<ringbuf::HeapProd<i16>>,
    commands: Mutex<mpsc::Sender<StreamCommand>>,
    volume: Arc<AtomicU32>,
    open: Arc<AtomicBool>,
}

impl CpalSink {
    /// Open a mono 16-bit PCM sink at the given sample rate.
    pub fn open(sample_rate: u32) -> Result<Self, SinkError> {
        if sample_rate == 0 {
            return Err(SinkError::UnsupportedConfig("sample rate is zero".into()));
        }

        let volume = Arc::new(AtomicU32::new(1.0_f32.to_bits()));
        let open = Arc::new(AtomicBool::new(false));
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        {
            let volume = Arc::clone(&volume);
            let open = Arc::clone(&open);
            thread::spawn(move || {
                stream_thread(sample_rate, cmd_rx, ready_tx, volume, open);
            });
        }

        // The stream thread reports the ring producer once the device stream
        // is built, or the error that prevented it.
        let producer = match ready_rx.recv() {
            Ok(Ok(producer)) => producer,
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(SinkError::OpenFailed("stream thread exited".into())),
        };

        Ok(Self {
            producer: Mutex::new(producer),
            commands: Mutex::new(cmd_tx),
            volume,
            open,
        })
    }

    fn send(&self, command: StreamCommand) -> Result<(), SinkError> {
        self.commands
            .lock()
            .map_err(|_| SinkError::Stream("sink poisoned".into()))?
            .send(command)
            .map_err(|_| SinkError::Stream("stream thread gone".into()))
    }
}

impl AudioSink for CpalSink {
    fn set_volume(&self, volume: f32) -> Result<(), SinkError> {
        if !self.is_open() {
            return Err(SinkError::Stream("sink released".into()));
        }
        self.volume
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
        Ok(())
    }

    fn start(&self) -> Result<(), SinkError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(StreamCommand::Start(reply_tx))?;
        reply_rx
            .recv()
            .unwrap_or_else(|_| Err(SinkError::Stream("stream thread gone".into())))
    }

    fn write(&self, chunk: &[i16]) -> isize {
        if !self.is_open() {
            return -1;
        }
        match self.producer.lock() {
            Ok(mut producer) => producer.push_slice(chunk) as isize,
            Err(_) => -1,
        }
    }

    fn stop(&self) {
        let _ = self.send(StreamCommand::Stop);
    }

    fn release(&self) {
        self.open.store(false, Ordering::Relaxed);
        let _ = self.send(StreamCommand::Release);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        self.release();
    }
}

/// Owns the cpal stream for one sink; exits on `Release` or when the sink
/// handle is dropped.
fn stream_thread(
    sample_rate: u32,
    commands: mpsc::Receiver<StreamCommand>,
    ready: mpsc::Sender<Result<ringbuf::HeapProd<i16>, SinkError>>,
    volume: Arc<AtomicU32>,
    open: Arc<AtomicBool>,
) {
    let stream = match build_stream(sample_rate, &ready, volume, &open) {
        Some(stream) => stream,
        None => return,
    };

    for command in commands {
        match command {
            StreamCommand::Start(reply) => {
                let result = stream
                    .play()
                    .map_err(|e| SinkError::Stream(e.to_string()));
                let _ = reply.send(result);
            }
            StreamCommand::Stop => {
                if let Err(e) = stream.pause() {
                    log::warn!("Failed to pause output stream: {}", e);
                }
            }
            StreamCommand::Release => break,
        }
    }

    open.store(false, Ordering::Relaxed);
    drop(stream);
}

/// Build the device stream and hand the ring producer back to the opener.
/// Returns `None` after reporting any failure.
fn build_stream(
    sample_rate: u32,
    ready: &mpsc::Sender<Result<ringbuf::HeapProd<i16>, SinkError>>,
    volume: Arc<AtomicU32>,
    open: &AtomicBool,
) -> Option<cpal::Stream> {
    let host = cpal::default_host();
    let device = match host.default_output_device() {
        Some(d) => d,
        None => {
            let _ = ready.send(Err(SinkError::NoDevice));
            return None;
        }
    };

    let supported = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready.send(Err(SinkError::OpenFailed(e.to_string())));
            return None;
        }
    };

    // Buffer capacity is twice the device minimum to absorb scheduling jitter.
    let min_frames = match supported.buffer_size() {
        SupportedBufferSize::Range { min, .. } => *min,
        SupportedBufferSize::Unknown => DEFAULT_MIN_BUFFER,
    };
    if min_frames == 0 {
        let _ = ready.send(Err(SinkError::UnsupportedConfig(
            "device reported a zero minimum buffer size".into(),
        )));
        return None;
    }
    let capacity = min_frames as usize * 2;

    let channels = supported.channels() as usize;
    let config = cpal::StreamConfig {
        channels: supported.channels(),
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let rb = HeapRb::<i16>::new(capacity);
    let (producer, mut consumer) = rb.split();

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let gain = f32::from_bits(volume.load(Ordering::Relaxed));
            for frame in data.chunks_mut(channels) {
                let value = consumer.try_pop().unwrap_or(0) as f32 / 32768.0 * gain;
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        |err| log::error!("Audio output error: {}", err),
        None,
    );

    match stream {
        Ok(stream) => {
            log::info!(
                "Opened output sink: {} Hz, {} channel(s), {} sample buffer",
                sample_rate,
                channels,
                capacity
            );
            // Mark the sink open before the handle is released to the caller
            open.store(true, Ordering::Relaxed);
            let _ = ready.send(Ok(producer));
            Some(stream)
        }
        Err(e) => {
            let _ = ready.send(Err(SinkError::OpenFailed(e.to_string())));
            None
        }
    }
}
