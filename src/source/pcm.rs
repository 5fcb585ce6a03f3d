// PcmFrameSource - in-memory PCM played through the analyser
//
// The buffer is cut into consecutive, non-overlapping blocks of `fft_size`
// samples; each block becomes one frame. A trailing partial block is not
// emitted.

use crate::analysis::analyser::Analyser;
use crate::analysis::frame::{Frame, FrameLayout};
use crate::config::AnalyserConfig;
use crate::error::SourceError;
use crate::source::{FrameSource, SourceRead};

pub struct PcmFrameSource {
    samples: Vec<f32>,
    sample_rate_hz: u32,
    analyser: Analyser,
    cursor: usize,
}

impl PcmFrameSource {
    /// Wrap mono PCM samples in [-1, 1]
    ///
    /// # Errors
    /// `SourceError::InvalidSpec` for a zero sample rate or an unusable
    /// analyser configuration
    pub fn new(
        samples: Vec<f32>,
        sample_rate_hz: u32,
        config: &AnalyserConfig,
    ) -> Result<Self, SourceError> {
        if sample_rate_hz == 0 {
            return Err(SourceError::InvalidSpec {
                reason: "sample rate must be > 0".to_string(),
            });
        }
        let analyser = Analyser::new(config)?;
        Ok(Self {
            samples,
            sample_rate_hz,
            analyser,
            cursor: 0,
        })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Number of frames this source yields from the start
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.analyser.fft_size()
    }

    pub fn duration_ms(&self) -> u64 {
        self.samples.len() as u64 * 1000 / self.sample_rate_hz as u64
    }

    /// Restart from the first sample with a cleared analyser
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.analyser.reset();
    }
}

impl FrameSource for PcmFrameSource {
    fn layout(&self) -> FrameLayout {
        self.analyser.layout(self.sample_rate_hz)
    }

    fn next_frame(&mut self, frame: &mut Frame) -> SourceRead {
        let block = self.analyser.fft_size();
        let end = self.cursor + block;
        if end > self.samples.len() {
            return SourceRead::Exhausted;
        }

        self.analyser.analyse(&self.samples[self.cursor..end], frame);
        self.cursor = end;
        SourceRead::Frame
    }
}
