// Error types for the microphone diagnostic engine
//
// This module defines the error taxonomy for session lifecycle faults and
// frame source failures. Degenerate audio (silence, zero frames, empty
// spectrum) is never an error: it shows up as absent metrics instead.

mod session;
mod source;

pub use session::{log_session_error, FrameBuffer, SessionError, SessionErrorCodes};
pub use source::{log_source_error, SourceError, SourceErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, so callers embedding the engine can surface
/// a stable numeric code next to the human-readable text.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
