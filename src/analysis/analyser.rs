// Analyser - turns blocks of PCM into analyser-style frames
//
// Each block of `fft_size` float samples in [-1, 1] becomes one frame:
// - time domain: unsigned bytes, floor(128 * (x + 1)) clamped to 0..=255
// - frequency domain: Blackman-windowed FFT magnitude, normalized by the
//   block length, smoothed against the previous block, converted to dB and
//   mapped linearly from [min_decibels, max_decibels] onto 0..=255
//
// The frame carries `fft_size / 2` bins spanning 0..Nyquist.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::analysis::frame::{Frame, FrameLayout};
use crate::config::AnalyserConfig;
use crate::error::SourceError;

/// Smallest accepted FFT size
pub const MIN_FFT_SIZE: usize = 32;
/// Largest accepted FFT size
pub const MAX_FFT_SIZE: usize = 32_768;

/// Stateful PCM to frame converter
///
/// Keeps the smoothed magnitude spectrum between calls, so one analyser
/// must be used for exactly one stream.
pub struct Analyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Blackman window (pre-computed)
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    min_decibels: f32,
    max_decibels: f32,
    smoothing_time_constant: f32,
}

impl Analyser {
    /// Create an analyser from configuration
    ///
    /// # Errors
    /// `SourceError::InvalidSpec` when the FFT size is not a power of two in
    /// range, the decibel range is empty, or the smoothing constant falls
    /// outside [0, 1]
    pub fn new(config: &AnalyserConfig) -> Result<Self, SourceError> {
        let fft_size = config.fft_size;
        if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
            return Err(SourceError::InvalidSpec {
                reason: format!(
                    "fft_size must be a power of two in {}..={}, got {}",
                    MIN_FFT_SIZE, MAX_FFT_SIZE, fft_size
                ),
            });
        }
        if config.max_decibels <= config.min_decibels {
            return Err(SourceError::InvalidSpec {
                reason: format!(
                    "max_decibels ({}) must exceed min_decibels ({})",
                    config.max_decibels, config.min_decibels
                ),
            });
        }
        if !(0.0..=1.0).contains(&config.smoothing_time_constant) {
            return Err(SourceError::InvalidSpec {
                reason: format!(
                    "smoothing_time_constant must be within [0, 1], got {}",
                    config.smoothing_time_constant
                ),
            });
        }

        let n = fft_size as f32;
        let window = (0..fft_size)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / n;
                0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
            })
            .collect();

        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        Ok(Self {
            fft,
            fft_size,
            window,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            min_decibels: config.min_decibels,
            max_decibels: config.max_decibels,
            smoothing_time_constant: config.smoothing_time_constant,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Layout of the frames this analyser produces
    pub fn layout(&self, sample_rate_hz: u32) -> FrameLayout {
        FrameLayout::new(sample_rate_hz, self.fft_size, self.bin_count())
    }

    /// Fill `out` from one block of PCM
    ///
    /// Blocks shorter than `fft_size` are zero-padded; extra samples are
    /// ignored. `out` is resized to the analyser layout if needed.
    pub fn analyse(&mut self, pcm: &[f32], out: &mut Frame) {
        let bins = self.bin_count();
        out.time_samples.resize(self.fft_size, 128.0);
        out.freq_magnitudes.resize(bins, 0.0);

        for i in 0..self.fft_size {
            let x = pcm.get(i).copied().unwrap_or(0.0);
            out.time_samples[i] = time_byte(x);
            self.scratch[i] = Complex::new(x * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let norm = 1.0 / self.fft_size as f32;
        let tau = self.smoothing_time_constant;
        let db_scale = 255.0 / (self.max_decibels - self.min_decibels);

        for k in 0..bins {
            let magnitude = self.scratch[k].norm() * norm;
            let mut smoothed = tau * self.smoothed[k] + (1.0 - tau) * magnitude;
            if !smoothed.is_finite() {
                smoothed = 0.0;
            }
            self.smoothed[k] = smoothed;

            out.freq_magnitudes[k] = if smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                (db_scale * (db - self.min_decibels)).floor().clamp(0.0, 255.0)
            } else {
                0.0
            };
        }
    }

    /// Forget the smoothed spectrum (start of a new stream)
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }
}

/// Map a float sample in [-1, 1] to an unsigned analyser byte
#[inline]
pub fn time_byte(sample: f32) -> f32 {
    (128.0 * (sample + 1.0)).floor().clamp(0.0, 255.0)
}
