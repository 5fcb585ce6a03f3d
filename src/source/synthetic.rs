//! Deterministic synthetic signals.
//!
//! Generators render mono PCM in [-1, 1] that stands in for a microphone in
//! tests and in the CLI `synth` command. Noise is seeded, so every render of
//! the same spec is identical.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::AnalyserConfig;
use crate::error::SourceError;
use crate::source::pcm::PcmFrameSource;

/// Supported waveform patterns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticPattern {
    Sine,
    Square,
    WhiteNoise,
    Silence,
}

impl SyntheticPattern {
    fn is_periodic(self) -> bool {
        matches!(self, SyntheticPattern::Sine | SyntheticPattern::Square)
    }
}

impl fmt::Display for SyntheticPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyntheticPattern::Sine => "sine",
            SyntheticPattern::Square => "square",
            SyntheticPattern::WhiteNoise => "noise",
            SyntheticPattern::Silence => "silence",
        };
        f.write_str(name)
    }
}

impl FromStr for SyntheticPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sine" => Ok(SyntheticPattern::Sine),
            "square" => Ok(SyntheticPattern::Square),
            "noise" | "white_noise" | "white-noise" => Ok(SyntheticPattern::WhiteNoise),
            "silence" => Ok(SyntheticPattern::Silence),
            other => Err(format!(
                "unknown pattern '{}' (expected sine, square, noise or silence)",
                other
            )),
        }
    }
}

/// Declarative description of a synthetic signal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyntheticSpec {
    pub pattern: SyntheticPattern,
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_frequency_hz() -> f32 {
    440.0
}

fn default_amplitude() -> f32 {
    0.1
}

fn default_duration_ms() -> u32 {
    2_000
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_seed() -> u64 {
    0x5A5A_FFF0
}

impl SyntheticSpec {
    /// Spec with default frequency, amplitude, duration, rate and seed
    pub fn new(pattern: SyntheticPattern) -> Self {
        Self {
            pattern,
            frequency_hz: default_frequency_hz(),
            amplitude: default_amplitude(),
            duration_ms: default_duration_ms(),
            sample_rate_hz: default_sample_rate(),
            seed: default_seed(),
        }
    }

    pub fn validate(&self) -> Result<(), SourceError> {
        if self.sample_rate_hz == 0 {
            return Err(invalid("sample rate must be > 0"));
        }
        if self.duration_ms == 0 {
            return Err(invalid("duration must be > 0 ms"));
        }
        if !self.amplitude.is_finite() || !(0.0..=1.0).contains(&self.amplitude) {
            return Err(invalid(format!(
                "amplitude must be within [0, 1], got {}",
                self.amplitude
            )));
        }
        if self.pattern.is_periodic() {
            let nyquist = self.sample_rate_hz as f32 / 2.0;
            if !self.frequency_hz.is_finite()
                || self.frequency_hz <= 0.0
                || self.frequency_hz >= nyquist
            {
                return Err(invalid(format!(
                    "frequency must be within (0, {}) Hz, got {}",
                    nyquist, self.frequency_hz
                )));
            }
        }
        Ok(())
    }

    /// Number of samples the spec renders
    pub fn sample_count(&self) -> usize {
        (self.duration_ms as u64 * self.sample_rate_hz as u64 / 1000) as usize
    }

    /// Render the whole signal
    pub fn render(&self) -> Result<Vec<f32>, SourceError> {
        self.validate()?;

        let count = self.sample_count();
        let step = self.frequency_hz / self.sample_rate_hz as f32;
        let amplitude = self.amplitude;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut phase = 0.0f32;

        let samples = (0..count)
            .map(|_| {
                let value = match self.pattern {
                    SyntheticPattern::Sine => (2.0 * PI * phase).sin() * amplitude,
                    SyntheticPattern::Square => {
                        if phase < 0.5 {
                            amplitude
                        } else {
                            -amplitude
                        }
                    }
                    SyntheticPattern::WhiteNoise => rng.gen_range(-1.0f32..1.0) * amplitude,
                    SyntheticPattern::Silence => 0.0,
                };
                phase += step;
                if phase >= 1.0 {
                    phase -= 1.0;
                }
                value
            })
            .collect();

        Ok(samples)
    }

    /// Render and wrap the signal in a frame source
    pub fn build_source(&self, config: &AnalyserConfig) -> Result<PcmFrameSource, SourceError> {
        PcmFrameSource::new(self.render()?, self.sample_rate_hz, config)
    }
}

fn invalid(reason: impl Into<String>) -> SourceError {
    SourceError::InvalidSpec {
        reason: reason.into(),
    }
}
