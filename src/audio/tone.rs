//! Sine tone synthesis
//!
//! Pure sample math: turns (frequency, sample rate, volume) into chunks of
//! 16-bit signed mono PCM. No device or threading concerns live here.

use std::f64::consts::PI;

/// Samples per generated chunk for a given sample rate.
///
/// One tenth of a second of audio, bounded to keep write latency and
/// cancellation latency reasonable at extreme sample rates.
pub fn chunk_len(sample_rate: u32) -> usize {
    (sample_rate / 10).clamp(1024, 8192) as usize
}

/// Fill `buf` with one chunk of a sine tone.
///
/// The waveform starts at sample index 0 on every call rather than carrying
/// phase across chunks, so consecutive chunks are identical. Unless the chunk
/// length is an exact multiple of the tone's period this produces a small
/// discontinuity at each chunk boundary.
///
/// `volume` is a snapshot taken once per chunk; callers must not re-read a
/// shared volume per sample.
pub fn fill_chunk(buf: &mut [i16], frequency: f64, sample_rate: u32, volume: f32) {
    let rate = sample_rate as f64;
    let gain = volume as f64;
    for (i, out) in buf.iter_mut().enumerate() {
        let angle = 2.0 * PI * frequency * i as f64 / rate;
        let sample = angle.sin().clamp(-1.0, 1.0) * gain;
        let scaled = (sample * i16::MAX as f64).round();
        *out = scaled.clamp(i16::MIN as f64, i16::MAX as f64) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_len_is_tenth_of_a_second_within_bounds() {
        assert_eq!(chunk_len(44100), 4410);
        assert_eq!(chunk_len(48000), 4800);
        // Low rates are pulled up to the floor
        assert_eq!(chunk_len(8000), 1024);
        assert_eq!(chunk_len(0), 1024);
        // High rates are capped
        assert_eq!(chunk_len(96000), 8192);
        assert_eq!(chunk_len(192_000), 8192);
    }

    #[test]
    fn first_sample_is_always_zero() {
        let mut buf = [0i16; 16];
        fill_chunk(&mut buf, 440.0, 44100, 1.0);
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn quarter_rate_tone_hits_full_scale() {
        // f = rate/4 gives samples 0, +max, 0, -max, repeating
        let mut buf = [0i16; 8];
        fill_chunk(&mut buf, 11025.0, 44100, 1.0);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[1], i16::MAX);
        assert!(buf[2].abs() <= 1);
        assert_eq!(buf[3], -i16::MAX);
    }

    #[test]
    fn volume_scales_amplitude() {
        let mut full = [0i16; 64];
        let mut half = [0i16; 64];
        fill_chunk(&mut full, 1000.0, 44100, 1.0);
        fill_chunk(&mut half, 1000.0, 44100, 0.5);
        let max_full = full.iter().map(|s| s.abs()).max().unwrap();
        let max_half = half.iter().map(|s| s.abs()).max().unwrap();
        assert!(max_half < max_full);
        assert!((max_half as f64 - max_full as f64 * 0.5).abs() <= 1.0);
    }

    #[test]
    fn zero_volume_is_silence() {
        let mut buf = [1i16; 256];
        fill_chunk(&mut buf, 440.0, 44100, 0.0);
        assert!(buf.iter().all(|&s| s == 0));
    }

    #[test]
    fn chunks_are_identical_across_calls() {
        // Phase restarts at zero each chunk, so repeated fills match exactly
        let mut a = [0i16; 1024];
        let mut b = [0i16; 1024];
        fill_chunk(&mut a, 333.0, 44100, 0.7);
        fill_chunk(&mut b, 333.0, 44100, 0.7);
        assert_eq!(a, b);
    }
}
