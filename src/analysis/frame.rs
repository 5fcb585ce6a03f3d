// Frame data model - one capture tick in time and frequency representation
//
// A frame pairs a fixed-size buffer of raw amplitude samples with a
// fixed-size buffer of non-negative bin magnitudes derived from the same
// signal window. Both lengths are declared once per session through
// FrameLayout and never change afterwards.

use crate::error::{FrameBuffer, SessionError};

/// Amplitude scale of the raw time-domain samples
///
/// Raw samples are centered by subtracting `zero_offset`; a centered sample
/// whose magnitude is within `clip_margin` of `full_scale_half_range`
/// counts as clipped.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SampleScale {
    pub zero_offset: f32,
    pub full_scale_half_range: f32,
    pub clip_margin: f32,
}

impl SampleScale {
    /// Unsigned 8-bit samples centered at 128 (analyser byte data)
    pub const UNSIGNED_8BIT: SampleScale = SampleScale {
        zero_offset: 128.0,
        full_scale_half_range: 128.0,
        clip_margin: 1.0,
    };

    /// Remove the encoding offset from a raw sample
    #[inline]
    pub fn center(&self, raw: f32) -> f64 {
        raw as f64 - self.zero_offset as f64
    }

    /// Whether a centered sample sits on (or within the margin of) a rail
    #[inline]
    pub fn is_clipped(&self, centered: f64) -> bool {
        centered.abs() >= (self.full_scale_half_range - self.clip_margin) as f64
    }
}

impl Default for SampleScale {
    fn default() -> Self {
        Self::UNSIGNED_8BIT
    }
}

/// Buffer geometry declared at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameLayout {
    /// Sample rate of the underlying signal in Hz
    pub sample_rate_hz: u32,
    /// Number of time-domain samples per frame
    pub time_len: usize,
    /// Number of frequency bins per frame (covering 0..Nyquist)
    pub freq_bins: usize,
}

impl FrameLayout {
    pub fn new(sample_rate_hz: u32, time_len: usize, freq_bins: usize) -> Self {
        Self {
            sample_rate_hz,
            time_len,
            freq_bins,
        }
    }

    /// Reject layouts the finalizer could not work with
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.sample_rate_hz == 0 {
            return Err(SessionError::InvalidLayout {
                reason: "sample rate must be > 0".to_string(),
            });
        }
        if self.time_len == 0 {
            return Err(SessionError::InvalidLayout {
                reason: "time-domain frame length must be > 0".to_string(),
            });
        }
        if self.freq_bins == 0 {
            return Err(SessionError::InvalidLayout {
                reason: "frequency bin count must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Width of one frequency bin in Hz
    pub fn bin_width_hz(&self) -> f64 {
        (self.sample_rate_hz as f64 / 2.0) / self.freq_bins as f64
    }
}

/// One capture tick
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Raw amplitude samples (offset-encoded, see SampleScale)
    pub time_samples: Vec<f32>,
    /// Non-negative magnitude per frequency bin
    pub freq_magnitudes: Vec<f32>,
}

impl Frame {
    pub fn new(time_samples: Vec<f32>, freq_magnitudes: Vec<f32>) -> Self {
        Self {
            time_samples,
            freq_magnitudes,
        }
    }

    /// Pre-allocated frame matching a layout, filled with the scale's zero
    pub fn silent(layout: &FrameLayout, scale: &SampleScale) -> Self {
        Self {
            time_samples: vec![scale.zero_offset; layout.time_len],
            freq_magnitudes: vec![0.0; layout.freq_bins],
        }
    }

    /// Verify both buffers have the lengths declared for the session
    pub fn check_layout(&self, layout: &FrameLayout) -> Result<(), SessionError> {
        if self.time_samples.len() != layout.time_len {
            return Err(SessionError::FrameLengthMismatch {
                buffer: FrameBuffer::Time,
                expected: layout.time_len,
                actual: self.time_samples.len(),
            });
        }
        if self.freq_magnitudes.len() != layout.freq_bins {
            return Err(SessionError::FrameLengthMismatch {
                buffer: FrameBuffer::Frequency,
                expected: layout.freq_bins,
                actual: self.freq_magnitudes.len(),
            });
        }
        Ok(())
    }
}
