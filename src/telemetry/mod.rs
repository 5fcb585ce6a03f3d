//! Session telemetry collector and helpers.
//!
//! The collector multiplexes session lifecycle, live level and fault events
//! into a bounded history plus an async broadcast stream.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use tokio::sync::{broadcast, mpsc};

use crate::analysis::accumulator::FrameReading;
use crate::analysis::classifier::Rating;
use crate::analysis::frame::FrameLayout;
use crate::error::{ErrorCode, SessionError};

pub mod events;

pub use events::SessionEvent;

/// Level changes smaller than this (in meter percent) are not re-published.
pub const LEVEL_DEBOUNCE_PERCENT: f64 = 1.0;

/// Global telemetry hub shared across the crate.
static HUB: Lazy<TelemetryHub> = Lazy::new(TelemetryHub::default);

/// Access the global telemetry hub.
pub fn hub() -> &'static TelemetryHub {
    &HUB
}

/// Snapshot of collector state for CLI reporting.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetrySnapshot {
    pub recent: Vec<SessionEvent>,
    pub total_events: u64,
    pub dropped_events: u64,
}

/// Broadcast-based collector retaining a bounded history of events.
pub struct TelemetryCollector {
    tx: broadcast::Sender<SessionEvent>,
    history: Mutex<VecDeque<SessionEvent>>,
    history_capacity: usize,
    total_events: AtomicU64,
    dropped_history: AtomicU64,
}

impl TelemetryCollector {
    pub fn new(buffer: usize, history_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Self {
            tx,
            history: Mutex::new(VecDeque::with_capacity(history_capacity)),
            history_capacity,
            total_events: AtomicU64::new(0),
            dropped_history: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, event: SessionEvent) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if self.history_capacity > 0 {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            if history.len() == self.history_capacity {
                history.pop_front();
                self.dropped_history.fetch_add(1, Ordering::Relaxed);
            }
            history.push_back(event.clone());
        }

        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Forward the broadcast stream into an unbounded channel.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe_unbounded(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut broadcast_rx = self.tx.subscribe();

        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("[Telemetry] Subscriber lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        rx
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        TelemetrySnapshot {
            recent: history.iter().cloned().collect(),
            total_events: self.total_events.load(Ordering::Relaxed),
            dropped_events: self.dropped_history.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new(256, 128)
    }
}

/// Debounced live level meter, owned by one session.
///
/// The hub only sees readings that passed the debounce step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelGauge {
    last: Option<f64>,
    published: u64,
}

impl LevelGauge {
    /// Level to publish for this reading, `None` while within the debounce step
    pub fn update(&mut self, reading: &FrameReading) -> Option<f64> {
        let level = reading.level_percent.clamp(0.0, 100.0);
        let changed = self
            .last
            .map(|last| (last - level).abs() >= LEVEL_DEBOUNCE_PERCENT)
            .unwrap_or(true);
        if !changed {
            return None;
        }
        self.last = Some(level);
        self.published += 1;
        Some(level)
    }

    /// Number of readings that passed the debounce step
    pub fn published(&self) -> u64 {
        self.published
    }
}

/// Top-level hub wrapping the collector.
pub struct TelemetryHub {
    collector: TelemetryCollector,
}

impl TelemetryHub {
    pub fn new(channel_capacity: usize, history_capacity: usize) -> Self {
        Self {
            collector: TelemetryCollector::new(channel_capacity, history_capacity),
        }
    }

    pub fn collector(&self) -> &TelemetryCollector {
        &self.collector
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.collector.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.collector.subscribe()
    }

    pub fn record_session_started(&self, session_id: u64, layout: &FrameLayout) {
        self.collector.publish(SessionEvent::Started {
            session_id,
            sample_rate_hz: layout.sample_rate_hz,
            time_len: layout.time_len,
            freq_bins: layout.freq_bins,
        });
    }

    /// Publish a live level reading that passed the session's `LevelGauge`.
    pub fn record_level(&self, session_id: u64, frame_index: u64, rms: f64, level_percent: f64) {
        self.collector.publish(SessionEvent::Level {
            session_id,
            frame_index,
            rms,
            level_percent,
        });
    }

    pub fn record_finalized(
        &self,
        session_id: u64,
        frame_count: u64,
        level_events: u64,
        status: Rating,
    ) {
        self.collector.publish(SessionEvent::Finalized {
            session_id,
            frame_count,
            level_events,
            status,
        });
    }

    pub fn record_fault(&self, session_id: Option<u64>, err: &SessionError) {
        self.collector.publish(SessionEvent::Fault {
            session_id,
            code: err.code(),
            message: err.message(),
        });
    }
}

impl Default for TelemetryHub {
    fn default() -> Self {
        Self::new(256, 128)
    }
}
