//! Frame sources and session drivers.
//!
//! A frame source supplies one frame per capture tick with a layout fixed
//! for its lifetime. The engine never talks to audio hardware: live capture
//! hosts implement [`FrameSource`] themselves, while this module ships
//! in-memory PCM, synthetic and WAV sources for harnesses and tests.

use crate::analysis::classifier::DiagnosticReport;
use crate::analysis::frame::{Frame, FrameLayout};
use crate::config::{EngineConfig, WorkerConfig};
use crate::error::SessionError;
use crate::session::engine::DiagnosticEngine;
use crate::session::worker::CaptureWorker;

pub mod pcm;
pub mod synthetic;
pub mod wav;

pub use pcm::PcmFrameSource;
pub use synthetic::{SyntheticPattern, SyntheticSpec};
pub use wav::{open_wav, read_wav, WavAudio};

/// Result of asking a source for the next frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRead {
    /// The frame buffer was filled with the next tick
    Frame,
    /// End of stream; the frame buffer is untouched
    Exhausted,
}

/// Supplier of fixed-layout frames
pub trait FrameSource: Send {
    /// Layout of every frame this source produces
    fn layout(&self) -> FrameLayout;

    /// Fill `frame` with the next tick
    fn next_frame(&mut self, frame: &mut Frame) -> SourceRead;
}

/// Run one complete session on `engine` from `source`
///
/// Starts a session with the source's layout, feeds every frame in order
/// and finalizes once the source is exhausted. If a frame is rejected the
/// session is discarded and the error returned.
pub fn drive(
    engine: &mut DiagnosticEngine,
    source: &mut dyn FrameSource,
) -> Result<DiagnosticReport, SessionError> {
    let layout = source.layout();
    engine.on_session_start(layout.sample_rate_hz, layout.time_len, layout.freq_bins)?;

    let mut frame = Frame::silent(&layout, &engine.config().sample_scale());
    while source.next_frame(&mut frame) == SourceRead::Frame {
        if let Err(err) = engine.on_frame(&frame) {
            engine.reset();
            return Err(err);
        }
    }

    engine.on_session_end().cloned()
}

/// Run one complete session through a [`CaptureWorker`]
///
/// The calling thread produces frames while the worker thread accumulates
/// them; the source is drained fully before the worker is stopped.
pub fn drive_queued(
    source: &mut dyn FrameSource,
    engine_config: EngineConfig,
    worker_config: &WorkerConfig,
) -> Result<DiagnosticReport, SessionError> {
    let layout = source.layout();
    let scale = engine_config.sample_scale();
    let (worker, mut sender) = CaptureWorker::spawn(engine_config, worker_config, layout)?;

    let mut frame = Frame::silent(&layout, &scale);
    while source.next_frame(&mut frame) == SourceRead::Frame {
        sender.send(&frame)?;
    }
    drop(sender);

    worker.stop()
}
