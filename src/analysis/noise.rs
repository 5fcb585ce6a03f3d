// Noise window sampler - ambient noise floor estimate
//
// Keeps the RMS of the first K frames of a session. The window is filled
// unconditionally: if the user starts talking right away the estimate will
// include speech.

/// Default number of frames sampled for the noise floor
pub const DEFAULT_NOISE_WINDOW_FRAMES: usize = 30;

/// Fixed-capacity record of the leading per-frame RMS values
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseWindowSampler {
    capacity: usize,
    rms: Vec<f64>,
}

impl NoiseWindowSampler {
    /// Create an empty sampler that keeps at most `capacity` values
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rms: Vec::with_capacity(capacity),
        }
    }

    /// Record a frame RMS while the window still has room
    ///
    /// # Returns
    /// `true` if the value was kept
    pub fn offer(&mut self, frame_rms: f64) -> bool {
        if self.rms.len() < self.capacity {
            self.rms.push(frame_rms);
            true
        } else {
            false
        }
    }

    pub fn is_full(&self) -> bool {
        self.rms.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.rms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rms.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Recorded values in arrival order
    pub fn values(&self) -> &[f64] {
        &self.rms
    }

    /// Mean of the recorded values, `None` when nothing was recorded
    pub fn average(&self) -> Option<f64> {
        if self.rms.is_empty() {
            None
        } else {
            Some(self.rms.iter().sum::<f64>() / self.rms.len() as f64)
        }
    }
}

impl Default for NoiseWindowSampler {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_WINDOW_FRAMES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_caps_at_capacity() {
        let mut sampler = NoiseWindowSampler::default();
        for i in 0..45 {
            let kept = sampler.offer(i as f64);
            assert_eq!(kept, i < 30, "frame {} kept={}", i, kept);
        }
        assert_eq!(sampler.len(), 30);
        assert!(sampler.is_full());
        // Only the first 30 frames are kept: 0..=29
        assert_eq!(sampler.values().last().copied(), Some(29.0));
    }

    #[test]
    fn test_average() {
        let mut sampler = NoiseWindowSampler::new(4);
        assert_eq!(sampler.average(), None);
        sampler.offer(2.0);
        sampler.offer(4.0);
        assert_eq!(sampler.average(), Some(3.0));
    }

    #[test]
    fn test_zero_capacity_never_records() {
        let mut sampler = NoiseWindowSampler::new(0);
        assert!(!sampler.offer(1.0));
        assert!(sampler.is_empty());
        assert_eq!(sampler.average(), None);
    }
}
