// WAV loading - PCM files decoded with hound and mixed down to mono

use std::path::Path;

use crate::config::AnalyserConfig;
use crate::error::{log_source_error, SourceError};
use crate::source::pcm::PcmFrameSource;

/// Decoded mono audio
#[derive(Debug, Clone, PartialEq)]
pub struct WavAudio {
    /// Mono samples in [-1, 1]
    pub samples: Vec<f32>,
    pub sample_rate_hz: u32,
    /// Channel count of the file before mixdown
    pub channels: u16,
}

/// Read a PCM or float WAV file and average all channels into one
///
/// # Errors
/// - `WavOpen` if the file cannot be opened or a sample fails to decode
/// - `UnsupportedFormat` for bit depths other than 8, 16, 24, 32
pub fn read_wav(path: &Path) -> Result<WavAudio, SourceError> {
    let open_err = |reason: String| SourceError::WavOpen {
        path: path.display().to_string(),
        reason,
    };

    let mut reader = hound::WavReader::open(path).map_err(|err| open_err(err.to_string()))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(SourceError::UnsupportedFormat {
            reason: "file declares zero channels".to_string(),
        });
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|err| open_err(err.to_string()))?,
        hound::SampleFormat::Int => {
            let max = ((1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) - 1) as f32;
            match spec.bits_per_sample {
                8 => reader
                    .samples::<i8>()
                    .map(|sample| sample.map(|value| value as f32 / max))
                    .collect::<Result<Vec<f32>, _>>()
                    .map_err(|err| open_err(err.to_string()))?,
                16 => reader
                    .samples::<i16>()
                    .map(|sample| sample.map(|value| value as f32 / max))
                    .collect::<Result<Vec<f32>, _>>()
                    .map_err(|err| open_err(err.to_string()))?,
                24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|value| value as f32 / max))
                    .collect::<Result<Vec<f32>, _>>()
                    .map_err(|err| open_err(err.to_string()))?,
                other => {
                    return Err(SourceError::UnsupportedFormat {
                        reason: format!("{} bits per sample", other),
                    })
                }
            }
        }
    };

    let channels = spec.channels as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    log::debug!(
        "[Source] Loaded {} ({} Hz, {} ch, {} mono samples)",
        path.display(),
        spec.sample_rate,
        spec.channels,
        samples.len()
    );

    Ok(WavAudio {
        samples,
        sample_rate_hz: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Open a WAV file as a frame source
///
/// # Errors
/// Everything `read_wav` reports, plus `Exhausted` for a file without
/// samples
pub fn open_wav(path: &Path, config: &AnalyserConfig) -> Result<PcmFrameSource, SourceError> {
    let result = read_wav(path).and_then(|audio| {
        if audio.samples.is_empty() {
            return Err(SourceError::Exhausted);
        }
        PcmFrameSource::new(audio.samples, audio.sample_rate_hz, config)
    });
    if let Err(err) = &result {
        log_source_error(err, "open_wav");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_wav(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mic_diag_{}_{}.wav", name, std::process::id()))
    }

    fn write_wav(path: &Path, channels: u16, frames: &[Vec<i16>]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &sample in frame {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn reads_mono_pcm16() {
        let path = temp_wav("mono");
        write_wav(&path, 1, &[vec![0], vec![16_384], vec![-32_767]]);

        let audio = read_wav(&path).unwrap();
        assert_eq!(audio.sample_rate_hz, 8_000);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples.len(), 3);
        assert!((audio.samples[1] - 0.5).abs() < 1e-3);
        assert!((audio.samples[2] + 1.0).abs() < 1e-6);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn mixes_stereo_down_to_mono() {
        let path = temp_wav("stereo");
        write_wav(&path, 2, &[vec![16_384, 0], vec![-16_384, -16_384]]);

        let audio = read_wav(&path).unwrap();
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.samples.len(), 2);
        assert!((audio.samples[0] - 0.25).abs() < 1e-3);
        assert!((audio.samples[1] + 0.5).abs() < 1e-3);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_reports_wav_open() {
        let err = read_wav(Path::new("/nonexistent/mic_diag.wav")).unwrap_err();
        assert!(matches!(err, SourceError::WavOpen { .. }));
    }

    #[test]
    fn empty_file_is_exhausted() {
        let path = temp_wav("empty");
        write_wav(&path, 1, &[]);
        let result = open_wav(&path, &AnalyserConfig::default());
        assert!(matches!(result, Err(SourceError::Exhausted)));
        let _ = std::fs::remove_file(path);
    }
}
