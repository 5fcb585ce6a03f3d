//! Capture session lifecycle.
//!
//! `engine` holds the synchronous session object and the engine facade a
//! frame source drives; `worker` moves the same engine onto its own thread
//! behind a lock-free frame queue for sources that run on another scheduler.

pub mod engine;
pub mod phase;
pub mod worker;

pub use engine::{DiagnosticEngine, DiagnosticSession};
pub use phase::SessionPhase;
pub use worker::{CaptureWorker, FramePool, FramePoolChannels, FrameSender};
