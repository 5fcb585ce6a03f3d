// Metric finalizer - converts accumulated session state into quality metrics
//
// Finalization is total: it never fails and degrades to absent optional
// metrics on zero frames, silence or an empty spectrum. It reads the
// accumulator without mutating it, so calling it twice on the same state
// yields identical metrics.

use super::accumulator::AccumulatorState;
use super::spectrum::{dominant_frequency_hz, spectral_centroid_hz};

/// Objective quality metrics for one capture session
///
/// Level values (rms, peak, noise floor) are in centered sample units.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Metrics {
    /// Mean per-frame RMS
    pub rms: f64,
    /// Largest absolute centered sample seen
    pub peak: f64,
    /// Share of samples at or next to a rail, in percent
    pub clipping_percent: f64,
    /// Mean RMS of the noise window, absent when no frame was recorded
    pub noise_floor_rms: Option<f64>,
    /// 20·log10(rms / noise floor), absent when the noise floor is absent or zero
    pub snr_db: Option<f64>,
    /// Frequency of the strongest accumulated bin
    pub dominant_freq_hz: Option<u32>,
    /// Magnitude-weighted mean frequency, absent for a zero-energy spectrum
    pub spectral_centroid_hz: Option<u32>,
    /// Mean centered sample normalized to [-1, 1]
    pub dc_offset: f64,
}

impl Metrics {
    /// Copy rounded for presentation
    ///
    /// Levels, clipping and SNR keep 2 decimals; DC offset keeps 3.
    pub fn rounded(&self) -> Metrics {
        Metrics {
            rms: round_to(self.rms, 2),
            peak: round_to(self.peak, 2),
            clipping_percent: round_to(self.clipping_percent, 2),
            noise_floor_rms: self.noise_floor_rms.map(|v| round_to(v, 2)),
            snr_db: self.snr_db.map(|v| round_to(v, 2)),
            dominant_freq_hz: self.dominant_freq_hz,
            spectral_centroid_hz: self.spectral_centroid_hz,
            dc_offset: round_to(self.dc_offset, 3),
        }
    }
}

/// Compute the final metric set for a session
///
/// # Arguments
/// * `state` - Accumulated session statistics
/// * `sample_rate_hz` - Sample rate of the captured signal
pub fn finalize(state: &AccumulatorState, sample_rate_hz: u32) -> Metrics {
    let frames = state.frame_count().max(1) as f64;
    let rms = state.sum_rms() / frames;
    let clipping_percent =
        100.0 * state.clipped_sample_count() as f64 / state.total_sample_count().max(1) as f64;

    let half_range = state.scale().full_scale_half_range as f64;
    let dc_offset = if half_range > 0.0 {
        (state.sum_mean() / frames) / half_range
    } else {
        0.0
    };

    let noise_floor_rms = state.noise_window().average();
    let snr_db = noise_floor_rms
        .filter(|&noise| noise > 0.0)
        .map(|noise| 20.0 * (rms / noise).log10());

    let accum = state.freq_magnitude_accum();
    let (dominant_freq_hz, spectral_centroid_hz) = if state.frame_count() > 0 && !accum.is_empty()
    {
        let bin_width = (sample_rate_hz as f64 / 2.0) / accum.len() as f64;
        (
            dominant_frequency_hz(accum, bin_width),
            spectral_centroid_hz(accum, bin_width),
        )
    } else {
        (None, None)
    };

    Metrics {
        rms,
        peak: state.peak_abs(),
        clipping_percent,
        noise_floor_rms,
        snr_db,
        dominant_freq_hz,
        spectral_centroid_hz,
        dc_offset,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
