// Session error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Session error code constants
///
/// Error code range: 3001-3007
pub struct SessionErrorCodes {}

impl SessionErrorCodes {
    /// Frame delivered or session finalized before any session start
    pub const NOT_STARTED: i32 = 3001;

    /// A capture session is already running
    pub const SESSION_ACTIVE: i32 = 3002;

    /// Session has already been finalized
    pub const ALREADY_FINALIZED: i32 = 3003;

    /// Metrics or verdict requested before the session ended
    pub const NOT_FINALIZED: i32 = 3004;

    /// Session parameters are unusable (zero rate or zero-length buffers)
    pub const INVALID_LAYOUT: i32 = 3005;

    /// Frame buffer length disagrees with the declared layout
    pub const FRAME_LENGTH_MISMATCH: i32 = 3006;

    /// Capture worker thread failed or disappeared
    pub const WORKER_FAILED: i32 = 3007;
}

/// Which half of a frame a length check refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameBuffer {
    /// Time-domain sample buffer
    Time,
    /// Frequency-magnitude buffer
    Frequency,
}

impl fmt::Display for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameBuffer::Time => write!(f, "time"),
            FrameBuffer::Frequency => write!(f, "frequency"),
        }
    }
}

/// Log a session error with structured context
///
/// Precondition violations indicate a broken integration, so they are
/// always logged at error level before being handed back to the caller.
pub fn log_session_error(err: &SessionError, context: &str) {
    error!(
        "Session error in {}: code={}, component=DiagnosticSession, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Session lifecycle errors
///
/// Every variant is a programming error on the caller's side: the engine
/// was driven out of order or fed frames that do not match the layout
/// declared at session start.
///
/// Error code range: 3001-3007
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// No session has been started
    NotStarted,

    /// A session is already capturing
    SessionActive,

    /// Session was already finalized
    AlreadyFinalized,

    /// Session has not been finalized yet
    NotFinalized,

    /// Declared layout is unusable
    InvalidLayout { reason: String },

    /// Frame buffer length disagrees with the declared layout
    FrameLengthMismatch {
        buffer: FrameBuffer,
        expected: usize,
        actual: usize,
    },

    /// Capture worker failed
    WorkerFailed { reason: String },
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::NotStarted => SessionErrorCodes::NOT_STARTED,
            SessionError::SessionActive => SessionErrorCodes::SESSION_ACTIVE,
            SessionError::AlreadyFinalized => SessionErrorCodes::ALREADY_FINALIZED,
            SessionError::NotFinalized => SessionErrorCodes::NOT_FINALIZED,
            SessionError::InvalidLayout { .. } => SessionErrorCodes::INVALID_LAYOUT,
            SessionError::FrameLengthMismatch { .. } => SessionErrorCodes::FRAME_LENGTH_MISMATCH,
            SessionError::WorkerFailed { .. } => SessionErrorCodes::WORKER_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::NotStarted => "No capture session has been started".to_string(),
            SessionError::SessionActive => "A capture session is already active".to_string(),
            SessionError::AlreadyFinalized => "Session was already finalized".to_string(),
            SessionError::NotFinalized => "Session has not been finalized".to_string(),
            SessionError::InvalidLayout { reason } => format!("Invalid session layout: {}", reason),
            SessionError::FrameLengthMismatch {
                buffer,
                expected,
                actual,
            } => format!(
                "Frame {} buffer length mismatch: expected {}, got {}",
                buffer, expected, actual
            ),
            SessionError::WorkerFailed { reason } => format!("Capture worker failed: {}", reason),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SessionError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_codes() {
        assert_eq!(SessionError::NotStarted.code(), SessionErrorCodes::NOT_STARTED);
        assert_eq!(
            SessionError::SessionActive.code(),
            SessionErrorCodes::SESSION_ACTIVE
        );
        assert_eq!(
            SessionError::AlreadyFinalized.code(),
            SessionErrorCodes::ALREADY_FINALIZED
        );
        assert_eq!(
            SessionError::NotFinalized.code(),
            SessionErrorCodes::NOT_FINALIZED
        );
        assert_eq!(
            SessionError::InvalidLayout {
                reason: "test".to_string()
            }
            .code(),
            SessionErrorCodes::INVALID_LAYOUT
        );
        assert_eq!(
            SessionError::FrameLengthMismatch {
                buffer: FrameBuffer::Time,
                expected: 2048,
                actual: 1024
            }
            .code(),
            SessionErrorCodes::FRAME_LENGTH_MISMATCH
        );
        assert_eq!(
            SessionError::WorkerFailed {
                reason: "test".to_string()
            }
            .code(),
            SessionErrorCodes::WORKER_FAILED
        );
    }

    #[test]
    fn test_frame_length_mismatch_message() {
        let err = SessionError::FrameLengthMismatch {
            buffer: FrameBuffer::Frequency,
            expected: 1024,
            actual: 512,
        };
        assert_eq!(
            err.message(),
            "Frame frequency buffer length mismatch: expected 1024, got 512"
        );
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::NotStarted;
        let display = format!("{}", err);
        assert!(display.contains("SessionError"));
        assert!(display.contains(&err.code().to_string()));
        assert!(display.contains("No capture session"));
    }
}
