// Frame source error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Frame source error code constants
///
/// Error code range: 1001-1004
pub struct SourceErrorCodes {}

impl SourceErrorCodes {
    /// WAV file could not be opened or decoded
    pub const WAV_OPEN: i32 = 1001;

    /// Audio format is not supported by the source
    pub const UNSUPPORTED_FORMAT: i32 = 1002;

    /// Source description is invalid
    pub const INVALID_SPEC: i32 = 1003;

    /// Source has no samples to deliver
    pub const EXHAUSTED: i32 = 1004;
}

/// Log a frame source error with structured context
pub fn log_source_error(err: &SourceError, context: &str) {
    error!(
        "Source error in {}: code={}, component=FrameSource, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while building a frame source
///
/// Error code range: 1001-1004
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// WAV file could not be opened or decoded
    WavOpen { path: String, reason: String },

    /// Audio format is not supported
    UnsupportedFormat { reason: String },

    /// Source description is invalid
    InvalidSpec { reason: String },

    /// Source contains no samples
    Exhausted,
}

impl ErrorCode for SourceError {
    fn code(&self) -> i32 {
        match self {
            SourceError::WavOpen { .. } => SourceErrorCodes::WAV_OPEN,
            SourceError::UnsupportedFormat { .. } => SourceErrorCodes::UNSUPPORTED_FORMAT,
            SourceError::InvalidSpec { .. } => SourceErrorCodes::INVALID_SPEC,
            SourceError::Exhausted => SourceErrorCodes::EXHAUSTED,
        }
    }

    fn message(&self) -> String {
        match self {
            SourceError::WavOpen { path, reason } => {
                format!("Failed to open WAV {}: {}", path, reason)
            }
            SourceError::UnsupportedFormat { reason } => {
                format!("Unsupported audio format: {}", reason)
            }
            SourceError::InvalidSpec { reason } => format!("Invalid source spec: {}", reason),
            SourceError::Exhausted => "Source contains no samples".to_string(),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SourceError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SourceError {}
