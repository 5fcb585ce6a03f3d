//! Session telemetry event types consumed by live meters and CLI reporting.

use serde::{Deserialize, Serialize};

use crate::analysis::classifier::Rating;

/// Events describing the progress of capture sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    Started {
        session_id: u64,
        sample_rate_hz: u32,
        time_len: usize,
        freq_bins: usize,
    },
    Level {
        session_id: u64,
        frame_index: u64,
        rms: f64,
        level_percent: f64,
    },
    Finalized {
        session_id: u64,
        frame_count: u64,
        /// Level events the session published
        level_events: u64,
        status: Rating,
    },
    Fault {
        session_id: Option<u64>,
        code: i32,
        message: String,
    },
}

impl SessionEvent {
    /// Session the event belongs to, if any
    pub fn session_id(&self) -> Option<u64> {
        match self {
            SessionEvent::Started { session_id, .. }
            | SessionEvent::Level { session_id, .. }
            | SessionEvent::Finalized { session_id, .. } => Some(*session_id),
            SessionEvent::Fault { session_id, .. } => *session_id,
        }
    }
}
