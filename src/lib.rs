// Microphone Diagnostics Core - audio signal diagnostic engine
// Streaming frame statistics, call-quality metrics and a three-tier verdict

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod session;
pub mod source;
pub mod telemetry;

// Re-exports for convenience
pub use analysis::{
    classify, DiagnosticReport, Frame, FrameLayout, FrameReading, MetricKind, Metrics, Rating,
    Verdict,
};
pub use config::DiagnosticConfig;
pub use error::{ErrorCode, SessionError, SourceError};
pub use session::{CaptureWorker, DiagnosticEngine, DiagnosticSession, SessionPhase};
pub use source::{drive, drive_queued, FrameSource, SourceRead};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Facade round trip through the crate root re-exports
        let mut engine = DiagnosticEngine::new(DiagnosticConfig::default().engine);
        engine.on_session_start(44_100, 2048, 1024).unwrap();
        engine
            .on_frame(&Frame::new(vec![128.0; 2048], vec![0.0; 1024]))
            .unwrap();
        let verdict = engine.on_session_end().unwrap().verdict.clone();
        assert_eq!(verdict.status, Rating::Error);
        assert_eq!(classify(MetricKind::Rms, Some(0.0)), Rating::Error);
    }
}
