// Analysis module - signal statistics, metrics and classification
//
// Pipeline for one capture session:
// Frame → AccumulatorState::update (+ NoiseWindowSampler) → finalize → DiagnosticReport
//
// The analyser submodule is an optional front end that produces frames
// from raw PCM for hosts that have no analyser of their own.

pub mod accumulator;
pub mod analyser;
pub mod classifier;
pub mod frame;
pub mod metrics;
pub mod noise;
pub mod spectrum;

pub use accumulator::{AccumulatorState, FrameReading};
pub use analyser::Analyser;
pub use classifier::{
    classify, overall_rating, DiagnosticReport, MetricKind, MetricRating, Rating, Verdict,
};
pub use frame::{Frame, FrameLayout, SampleScale};
pub use metrics::{finalize, Metrics};
pub use noise::{NoiseWindowSampler, DEFAULT_NOISE_WINDOW_FRAMES};
