//! Configuration management for the diagnostic engine
//!
//! This module provides runtime configuration loading from JSON files so the
//! analyser front end and the capture worker can be tuned without
//! recompilation. The classification thresholds are a fixed policy and are
//! deliberately absent from this file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::frame::SampleScale;

/// Complete diagnostic configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub analyser: AnalyserConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Frame accumulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of leading frames whose RMS forms the noise floor estimate
    pub noise_window_frames: usize,
    /// Value subtracted from every raw time-domain sample
    pub zero_offset: f32,
    /// Magnitude of a full-scale centered sample
    pub full_scale_half_range: f32,
    /// Distance from the rail at which a centered sample counts as clipped
    pub clip_margin: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            noise_window_frames: 30,
            zero_offset: 128.0,
            full_scale_half_range: 128.0,
            clip_margin: 1.0,
        }
    }
}

impl EngineConfig {
    /// Sample scale described by this configuration
    pub fn sample_scale(&self) -> SampleScale {
        SampleScale {
            zero_offset: self.zero_offset,
            full_scale_half_range: self.full_scale_half_range,
            clip_margin: self.clip_margin,
        }
    }
}

/// Analyser front end parameters (PCM to frame conversion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyserConfig {
    /// FFT window size in samples; frames carry `fft_size / 2` bins
    pub fft_size: usize,
    /// Sample rate assumed for synthetic sources
    pub sample_rate_hz: u32,
    /// Magnitude in dB mapped to byte 0
    pub min_decibels: f32,
    /// Magnitude in dB mapped to byte 255
    pub max_decibels: f32,
    /// Exponential smoothing applied to bin magnitudes between frames
    pub smoothing_time_constant: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            sample_rate_hz: 44_100,
            min_decibels: -100.0,
            max_decibels: -30.0,
            smoothing_time_constant: 0.8,
        }
    }
}

/// Capture worker parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of pre-allocated frames circulating between producer and worker
    pub queue_capacity: usize,
    /// Sleep between polls when the frame queue is empty
    pub idle_sleep_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            idle_sleep_ms: 1,
        }
    }
}

impl DiagnosticConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file is missing or
    /// invalid (a warning is logged in both cases)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiagnosticConfig::default();
        assert_eq!(config.engine.noise_window_frames, 30);
        assert_eq!(config.engine.zero_offset, 128.0);
        assert_eq!(config.analyser.fft_size, 2048);
        assert_eq!(config.analyser.sample_rate_hz, 44_100);
        assert_eq!(config.worker.queue_capacity, 64);
    }

    #[test]
    fn test_partial_json_uses_section_defaults() {
        let json = r#"{ "analyser": { "fft_size": 1024, "sample_rate_hz": 48000,
            "min_decibels": -90.0, "max_decibels": -20.0,
            "smoothing_time_constant": 0.5 } }"#;
        let config: DiagnosticConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.analyser.fft_size, 1024);
        assert_eq!(config.analyser.sample_rate_hz, 48_000);
        assert_eq!(config.engine.noise_window_frames, 30);
        assert_eq!(config.worker.idle_sleep_ms, 1);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = DiagnosticConfig::load_from_file("/nonexistent/mic_diag.json");
        assert_eq!(config.engine.noise_window_frames, 30);
    }

    #[test]
    fn test_sample_scale_from_engine_config() {
        let scale = EngineConfig::default().sample_scale();
        assert_eq!(scale.zero_offset, 128.0);
        assert_eq!(scale.full_scale_half_range, 128.0);
        assert_eq!(scale.clip_margin, 1.0);
    }
}
