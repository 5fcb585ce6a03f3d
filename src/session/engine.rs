// Diagnostic session and engine facade
//
// DiagnosticSession owns one AccumulatorState for one capture and walks the
// phase machine exactly once. DiagnosticEngine is the inbound/outbound
// surface a frame source and a presentation layer talk to; it creates a
// fresh session on every start and keeps the last report readable until the
// next start.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::analysis::accumulator::{AccumulatorState, FrameReading};
use crate::analysis::classifier::{DiagnosticReport, Verdict};
use crate::analysis::frame::{Frame, FrameLayout};
use crate::analysis::metrics::{finalize, Metrics};
use crate::config::EngineConfig;
use crate::error::{log_session_error, SessionError};
use crate::session::phase::SessionPhase;
use crate::telemetry::{self, LevelGauge};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> u64 {
    NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)
}

/// One capture session, single-use
///
/// Not shared between threads: the owner is the single writer of the
/// accumulator.
#[derive(Debug)]
pub struct DiagnosticSession {
    id: u64,
    layout: FrameLayout,
    phase: SessionPhase,
    state: AccumulatorState,
    gauge: LevelGauge,
    report: Option<DiagnosticReport>,
}

impl DiagnosticSession {
    /// Start a session (Idle → Capturing) with a freshly reset accumulator
    ///
    /// # Errors
    /// `SessionError::InvalidLayout` if the layout has a zero sample rate or
    /// zero-length buffers
    pub fn start(layout: FrameLayout, config: &EngineConfig) -> Result<Self, SessionError> {
        layout.validate()?;
        let mut session = Self {
            id: next_session_id(),
            layout,
            phase: SessionPhase::Idle,
            state: AccumulatorState::new(config.sample_scale(), config.noise_window_frames),
            gauge: LevelGauge::default(),
            report: None,
        };
        session.advance(SessionPhase::Capturing);
        Ok(session)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn frame_count(&self) -> u64 {
        self.state.frame_count()
    }

    pub fn state(&self) -> &AccumulatorState {
        &self.state
    }

    /// Live level readings that passed the meter's debounce step
    pub fn levels_published(&self) -> u64 {
        self.gauge.published()
    }

    /// Feed a reading to the session's level meter
    ///
    /// Returns the level to publish, or `None` while the change stays below
    /// the debounce step.
    pub fn level_update(&mut self, reading: &FrameReading) -> Option<f64> {
        self.gauge.update(reading)
    }

    /// Accumulate one frame
    ///
    /// # Errors
    /// - `AlreadyFinalized` once the session has ended
    /// - `FrameLengthMismatch` if either buffer disagrees with the layout
    pub fn on_frame(&mut self, frame: &Frame) -> Result<FrameReading, SessionError> {
        if !self.phase.accepts_frames() {
            return Err(SessionError::AlreadyFinalized);
        }
        frame.check_layout(&self.layout)?;
        Ok(self.state.update(frame))
    }

    /// End the session: finalize metrics once, then classify once
    ///
    /// # Errors
    /// `AlreadyFinalized` if called a second time
    pub fn finish(&mut self) -> Result<&DiagnosticReport, SessionError> {
        if self.phase != SessionPhase::Capturing {
            return Err(SessionError::AlreadyFinalized);
        }

        self.advance(SessionPhase::Finalizing);
        let metrics = finalize(&self.state, self.layout.sample_rate_hz);

        let report = DiagnosticReport::from_metrics(metrics);
        self.advance(SessionPhase::Reported);
        Ok(self.report.insert(report))
    }

    /// Report, available once the session has ended
    pub fn report(&self) -> Option<&DiagnosticReport> {
        self.report.as_ref()
    }

    fn advance(&mut self, next: SessionPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal session transition {} -> {}",
            self.phase,
            next
        );
        log::debug!(
            "[DiagnosticSession {}] {} -> {}",
            self.id,
            self.phase,
            next
        );
        self.phase = next;
    }
}

/// Engine facade driven by a frame source
///
/// Inbound: `on_session_start`, `on_frame`, `on_session_end`.
/// Outbound: `metrics`, `verdict`, `report`.
///
/// Every precondition violation is logged, published as a telemetry fault
/// and returned to the caller.
#[derive(Debug)]
pub struct DiagnosticEngine {
    config: EngineConfig,
    session: Option<DiagnosticSession>,
}

impl DiagnosticEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Begin a new capture session
    ///
    /// Any previous, already reported session is discarded.
    ///
    /// # Arguments
    /// * `sample_rate_hz` - Sample rate of the captured signal
    /// * `time_len` - Time-domain samples per frame
    /// * `freq_bins` - Frequency bins per frame
    ///
    /// # Returns
    /// Identifier of the new session
    ///
    /// # Errors
    /// - `SessionActive` while another session is still capturing
    /// - `InvalidLayout` for a zero sample rate or zero-length buffers
    pub fn on_session_start(
        &mut self,
        sample_rate_hz: u32,
        time_len: usize,
        freq_bins: usize,
    ) -> Result<u64, SessionError> {
        if let Some(active) = self.session.as_ref() {
            if active.phase().accepts_frames() {
                return Err(self.fault(SessionError::SessionActive, "on_session_start"));
            }
        }

        let layout = FrameLayout::new(sample_rate_hz, time_len, freq_bins);
        let session = match DiagnosticSession::start(layout, &self.config) {
            Ok(session) => session,
            Err(err) => return Err(self.fault(err, "on_session_start")),
        };

        let id = session.id();
        log::info!(
            "[DiagnosticEngine] Session {} started: {} Hz, {} samples, {} bins",
            id,
            sample_rate_hz,
            time_len,
            freq_bins
        );
        telemetry::hub().record_session_started(id, &layout);
        self.session = Some(session);
        Ok(id)
    }

    /// Deliver one frame to the active session
    ///
    /// # Errors
    /// - `NotStarted` if no session was started
    /// - `AlreadyFinalized` after `on_session_end`
    /// - `FrameLengthMismatch` if the frame disagrees with the declared layout
    pub fn on_frame(&mut self, frame: &Frame) -> Result<FrameReading, SessionError> {
        let result = match self.session.as_mut() {
            Some(session) => session.on_frame(frame).map(|reading| {
                let level = session.level_update(&reading);
                (session.id(), session.frame_count(), reading, level)
            }),
            None => Err(SessionError::NotStarted),
        };

        match result {
            Ok((id, frame_count, reading, level)) => {
                if let Some(level) = level {
                    telemetry::hub().record_level(id, frame_count - 1, reading.rms, level);
                }
                Ok(reading)
            }
            Err(err) => Err(self.fault(err, "on_frame")),
        }
    }

    /// Signal end of stream and produce the report
    ///
    /// Legal at any point of a capture, including before the first frame.
    ///
    /// # Errors
    /// - `NotStarted` if no session was started
    /// - `AlreadyFinalized` if the session already ended
    pub fn on_session_end(&mut self) -> Result<&DiagnosticReport, SessionError> {
        let outcome = match self.session.as_mut() {
            Some(session) => {
                let id = session.id();
                let frame_count = session.frame_count();
                let level_events = session.levels_published();
                session
                    .finish()
                    .map(|report| (id, frame_count, level_events, report.verdict.status))
            }
            None => Err(SessionError::NotStarted),
        };

        match outcome {
            Ok((id, frame_count, level_events, status)) => {
                log::info!(
                    "[DiagnosticEngine] Session {} finalized after {} frames: {}",
                    id,
                    frame_count,
                    status
                );
                telemetry::hub().record_finalized(id, frame_count, level_events, status);
                self.report()
            }
            Err(err) => Err(self.fault(err, "on_session_end")),
        }
    }

    /// Report of the last ended session
    ///
    /// # Errors
    /// `NotStarted` before any session, `NotFinalized` while capturing
    pub fn report(&self) -> Result<&DiagnosticReport, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotStarted)?;
        session.report().ok_or(SessionError::NotFinalized)
    }

    /// Metrics of the last ended session
    pub fn metrics(&self) -> Result<Metrics, SessionError> {
        self.report().map(|report| report.metrics)
    }

    /// Verdict of the last ended session
    pub fn verdict(&self) -> Result<Verdict, SessionError> {
        self.report().map(|report| report.verdict.clone())
    }

    /// Discard the current session without finalizing it
    ///
    /// Used when an integration fault makes the capture unusable.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            if session.phase().accepts_frames() {
                log::warn!(
                    "[DiagnosticEngine] Session {} discarded after {} frames",
                    session.id(),
                    session.frame_count()
                );
            }
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.session
            .as_ref()
            .map(DiagnosticSession::phase)
            .unwrap_or(SessionPhase::Idle)
    }

    pub fn session(&self) -> Option<&DiagnosticSession> {
        self.session.as_ref()
    }

    fn fault(&self, err: SessionError, context: &str) -> SessionError {
        log_session_error(&err, context);
        telemetry::hub().record_fault(self.session.as_ref().map(DiagnosticSession::id), &err);
        err
    }
}

impl Default for DiagnosticEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
