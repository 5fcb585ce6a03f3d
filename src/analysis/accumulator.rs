// Frame accumulator - streaming statistics over a capture session
//
// Consumes one frame at a time and folds it into running sums and extrema.
// Per-frame cost is O(frame size); retained state is O(1) apart from the
// element-wise magnitude accumulator, whose length is fixed by the first
// frame. No raw per-frame history is kept.

use super::frame::{Frame, SampleScale};
use super::noise::{NoiseWindowSampler, DEFAULT_NOISE_WINDOW_FRAMES};

/// Instantaneous reading produced for every accumulated frame
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameReading {
    /// RMS of the centered samples of this frame
    pub rms: f64,
    /// Level meter position in percent (0-100)
    pub level_percent: f64,
}

/// Running statistics for one capture session
///
/// Owned by exactly one session and mutated only through [`update`].
///
/// [`update`]: AccumulatorState::update
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatorState {
    scale: SampleScale,
    frame_count: u64,
    sum_rms: f64,
    peak_abs: f64,
    clipped_sample_count: u64,
    total_sample_count: u64,
    sum_mean: f64,
    freq_magnitude_accum: Vec<f64>,
    noise_window: NoiseWindowSampler,
}

impl AccumulatorState {
    /// Create an empty state for samples on the given scale
    ///
    /// # Arguments
    /// * `scale` - Offset and full-scale range of the raw samples
    /// * `noise_window_frames` - Number of leading frames sampled for the noise floor
    pub fn new(scale: SampleScale, noise_window_frames: usize) -> Self {
        Self {
            scale,
            frame_count: 0,
            sum_rms: 0.0,
            peak_abs: 0.0,
            clipped_sample_count: 0,
            total_sample_count: 0,
            sum_mean: 0.0,
            freq_magnitude_accum: Vec::new(),
            noise_window: NoiseWindowSampler::new(noise_window_frames),
        }
    }

    /// Fold one frame into the running statistics
    ///
    /// Time-domain samples are centered, then contribute their RMS, peak,
    /// clip count and mean. Magnitudes are added element-wise into the
    /// spectrum accumulator, which is sized by the first frame.
    ///
    /// # Returns
    /// The frame's RMS and level meter reading
    pub fn update(&mut self, frame: &Frame) -> FrameReading {
        let samples = &frame.time_samples;
        let len = samples.len();

        let mut sum_squares = 0.0f64;
        let mut mean_sum = 0.0f64;
        let mut max_abs = 0.0f64;
        let mut clipped = 0u64;

        for &raw in samples {
            let centered = self.scale.center(raw);
            mean_sum += centered;
            sum_squares += centered * centered;
            max_abs = max_abs.max(centered.abs());
            if self.scale.is_clipped(centered) {
                clipped += 1;
            }
        }

        let frame_rms = if len > 0 {
            (sum_squares / len as f64).sqrt()
        } else {
            0.0
        };

        self.frame_count += 1;
        self.sum_rms += frame_rms;
        self.peak_abs = self.peak_abs.max(max_abs);
        self.clipped_sample_count += clipped;
        self.total_sample_count += len as u64;
        if len > 0 {
            self.sum_mean += mean_sum / len as f64;
        }
        self.noise_window.offer(frame_rms);

        if self.freq_magnitude_accum.is_empty() {
            self.freq_magnitude_accum = vec![0.0; frame.freq_magnitudes.len()];
        }
        debug_assert_eq!(
            self.freq_magnitude_accum.len(),
            frame.freq_magnitudes.len(),
            "magnitude buffer length changed mid-session"
        );
        for (acc, &mag) in self
            .freq_magnitude_accum
            .iter_mut()
            .zip(frame.freq_magnitudes.iter())
        {
            *acc += mag as f64;
        }

        FrameReading {
            rms: frame_rms,
            level_percent: level_percent(frame_rms, &self.scale),
        }
    }

    pub fn scale(&self) -> &SampleScale {
        &self.scale
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn sum_rms(&self) -> f64 {
        self.sum_rms
    }

    pub fn peak_abs(&self) -> f64 {
        self.peak_abs
    }

    pub fn clipped_sample_count(&self) -> u64 {
        self.clipped_sample_count
    }

    pub fn total_sample_count(&self) -> u64 {
        self.total_sample_count
    }

    pub fn sum_mean(&self) -> f64 {
        self.sum_mean
    }

    pub fn freq_magnitude_accum(&self) -> &[f64] {
        &self.freq_magnitude_accum
    }

    pub fn noise_window(&self) -> &NoiseWindowSampler {
        &self.noise_window
    }
}

impl Default for AccumulatorState {
    fn default() -> Self {
        Self::new(SampleScale::UNSIGNED_8BIT, DEFAULT_NOISE_WINDOW_FRAMES)
    }
}

/// Level meter position for a frame RMS
///
/// Twice the RMS as a fraction of full scale, capped at 100%.
pub fn level_percent(rms: f64, scale: &SampleScale) -> f64 {
    let half_range = scale.full_scale_half_range as f64;
    if half_range <= 0.0 {
        return 0.0;
    }
    ((rms / half_range) * 100.0 * 2.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(time: &[f32], freq: &[f32]) -> Frame {
        Frame::new(time.to_vec(), freq.to_vec())
    }

    #[test]
    fn test_fresh_state_is_empty() {
        let state = AccumulatorState::default();
        assert_eq!(state.frame_count(), 0);
        assert_eq!(state.total_sample_count(), 0);
        assert!(state.freq_magnitude_accum().is_empty());
        assert!(state.noise_window().is_empty());
    }

    #[test]
    fn test_single_frame_statistics() {
        let mut state = AccumulatorState::default();
        // Centered: -4, 4, -4, 4 -> rms 4, peak 4, mean 0
        let reading = state.update(&frame(&[124.0, 132.0, 124.0, 132.0], &[1.0, 2.0]));

        assert!((reading.rms - 4.0).abs() < 1e-12);
        assert!((reading.level_percent - 6.25).abs() < 1e-12);
        assert_eq!(state.frame_count(), 1);
        assert_eq!(state.peak_abs(), 4.0);
        assert_eq!(state.clipped_sample_count(), 0);
        assert_eq!(state.total_sample_count(), 4);
        assert_eq!(state.sum_mean(), 0.0);
        assert_eq!(state.freq_magnitude_accum(), &[1.0, 2.0]);
        assert_eq!(state.noise_window().values(), &[4.0]);
    }

    #[test]
    fn test_magnitudes_accumulate_element_wise() {
        let mut state = AccumulatorState::default();
        state.update(&frame(&[128.0; 4], &[1.0, 0.0, 3.0]));
        state.update(&frame(&[128.0; 4], &[2.0, 5.0, 0.5]));
        assert_eq!(state.freq_magnitude_accum(), &[3.0, 5.0, 3.5]);
    }

    #[test]
    fn test_clipped_samples_counted_at_both_rails() {
        let mut state = AccumulatorState::default();
        state.update(&frame(&[0.0, 1.0, 2.0, 128.0, 254.0, 255.0], &[0.0]));
        assert_eq!(state.clipped_sample_count(), 3);
        assert_eq!(state.total_sample_count(), 6);
        assert_eq!(state.peak_abs(), 128.0);
        assert!(state.clipped_sample_count() <= state.total_sample_count());
    }

    #[test]
    fn test_mean_tracks_dc_bias() {
        let mut state = AccumulatorState::default();
        state.update(&frame(&[138.0; 8], &[0.0]));
        state.update(&frame(&[148.0; 8], &[0.0]));
        assert!((state.sum_mean() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_peak_is_running_maximum() {
        let mut state = AccumulatorState::default();
        state.update(&frame(&[100.0, 128.0], &[0.0]));
        state.update(&frame(&[120.0, 130.0], &[0.0]));
        assert_eq!(state.peak_abs(), 28.0);
    }

    #[test]
    fn test_level_meter_caps_at_100() {
        let scale = SampleScale::UNSIGNED_8BIT;
        assert_eq!(level_percent(0.0, &scale), 0.0);
        assert!((level_percent(32.0, &scale) - 50.0).abs() < 1e-12);
        assert_eq!(level_percent(127.0, &scale), 100.0);
    }

    #[test]
    fn test_noise_window_stops_after_configured_frames() {
        let mut state = AccumulatorState::new(SampleScale::UNSIGNED_8BIT, 3);
        for _ in 0..5 {
            state.update(&frame(&[130.0, 126.0], &[0.0]));
        }
        assert_eq!(state.frame_count(), 5);
        assert_eq!(state.noise_window().len(), 3);
    }
}
