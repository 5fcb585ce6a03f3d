// CaptureWorker - queued, single-writer frame ingestion
//
// Frames may be produced on a different scheduler than the one that
// accumulates them (a capture callback vs. an analysis loop). The worker
// owns one DiagnosticEngine session on a dedicated thread and receives
// frames through a lock-free frame pool built from two SPSC ring buffers:
//
// - data queue: producer pushes filled frames, worker consumes
// - pool queue: worker returns emptied frames, producer recycles
//
// All frame buffers are allocated up front, so delivering a frame never
// allocates. Frames are accumulated strictly in arrival order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rtrb::{Consumer, PopError, Producer};

use crate::analysis::classifier::DiagnosticReport;
use crate::analysis::frame::{Frame, FrameLayout};
use crate::config::{EngineConfig, WorkerConfig};
use crate::error::{log_session_error, SessionError};
use crate::session::engine::DiagnosticEngine;

/// Split frame pool channels for producer/consumer separation
pub struct FramePoolChannels {
    /// Producer for sending filled frames to the worker
    pub data_producer: Producer<Frame>,
    /// Consumer for receiving filled frames in the worker
    pub data_consumer: Consumer<Frame>,
    /// Producer for returning emptied frames from the worker
    pub pool_producer: Producer<Frame>,
    /// Consumer for retrieving empty frames on the producer side
    pub pool_consumer: Consumer<Frame>,
}

/// Lock-free frame pool using dual SPSC ring buffers
pub struct FramePool;

impl FramePool {
    /// Pre-allocate `frame_count` frames shaped like `layout`
    ///
    /// # Errors
    /// `SessionError::WorkerFailed` if `frame_count` is zero
    pub fn new(frame_count: usize, layout: &FrameLayout) -> Result<FramePoolChannels, SessionError> {
        if frame_count == 0 {
            return Err(SessionError::WorkerFailed {
                reason: "frame pool capacity must be > 0".to_string(),
            });
        }

        let (mut pool_producer, pool_consumer) = rtrb::RingBuffer::new(frame_count);
        let (data_producer, data_consumer) = rtrb::RingBuffer::new(frame_count);

        for _ in 0..frame_count {
            let frame = Frame::new(vec![0.0; layout.time_len], vec![0.0; layout.freq_bins]);
            if pool_producer.push(frame).is_err() {
                return Err(SessionError::WorkerFailed {
                    reason: "frame pool filled beyond capacity".to_string(),
                });
            }
        }

        Ok(FramePoolChannels {
            data_producer,
            data_consumer,
            pool_producer,
            pool_consumer,
        })
    }
}

/// Producer half handed to the frame source
///
/// Owned by exactly one producer thread.
pub struct FrameSender {
    layout: FrameLayout,
    data_producer: Producer<Frame>,
    pool_consumer: Consumer<Frame>,
    idle_sleep: Duration,
    dropped: u64,
}

impl FrameSender {
    /// Copy a frame into a pooled buffer and queue it
    ///
    /// # Returns
    /// `Ok(false)` when every pooled frame is in flight; the frame is
    /// dropped and counted.
    ///
    /// # Errors
    /// - `FrameLengthMismatch` if the frame disagrees with the layout
    /// - `WorkerFailed` once the worker has stopped
    pub fn try_send(&mut self, frame: &Frame) -> Result<bool, SessionError> {
        let queued = self.enqueue(frame)?;
        if !queued {
            self.dropped += 1;
        }
        Ok(queued)
    }

    /// Queue a frame, waiting for a free pooled buffer if necessary
    pub fn send(&mut self, frame: &Frame) -> Result<(), SessionError> {
        while !self.enqueue(frame)? {
            thread::sleep(self.idle_sleep);
        }
        Ok(())
    }

    fn enqueue(&mut self, frame: &Frame) -> Result<bool, SessionError> {
        frame.check_layout(&self.layout)?;
        if self.data_producer.is_abandoned() {
            return Err(SessionError::WorkerFailed {
                reason: "capture worker has stopped".to_string(),
            });
        }

        match self.pool_consumer.pop() {
            Ok(mut pooled) => {
                pooled.time_samples.copy_from_slice(&frame.time_samples);
                pooled.freq_magnitudes.copy_from_slice(&frame.freq_magnitudes);
                self.data_producer
                    .push(pooled)
                    .map_err(|_| SessionError::WorkerFailed {
                        reason: "data queue full".to_string(),
                    })?;
                Ok(true)
            }
            Err(PopError::Empty) => Ok(false),
        }
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Frames rejected by `try_send` because the pool was empty
    pub fn dropped_frames(&self) -> u64 {
        self.dropped
    }
}

/// Background ingestion thread owning one capture session
pub struct CaptureWorker {
    handle: Option<JoinHandle<Result<DiagnosticReport, SessionError>>>,
    shutdown: Arc<AtomicBool>,
    processed: Arc<AtomicU64>,
    session_id: u64,
}

impl CaptureWorker {
    /// Start a session on a new worker thread
    ///
    /// # Returns
    /// The worker handle and the sender the frame source pushes into
    ///
    /// # Errors
    /// `InvalidLayout` for an unusable layout, `WorkerFailed` if the pool
    /// or thread cannot be created
    pub fn spawn(
        engine_config: EngineConfig,
        worker_config: &WorkerConfig,
        layout: FrameLayout,
    ) -> Result<(CaptureWorker, FrameSender), SessionError> {
        let channels = FramePool::new(worker_config.queue_capacity, &layout)?;
        let FramePoolChannels {
            data_producer,
            data_consumer,
            pool_producer,
            pool_consumer,
        } = channels;

        let mut engine = DiagnosticEngine::new(engine_config);
        let session_id =
            engine.on_session_start(layout.sample_rate_hz, layout.time_len, layout.freq_bins)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let processed = Arc::new(AtomicU64::new(0));
        let idle_sleep = Duration::from_millis(worker_config.idle_sleep_ms.max(1));

        let ingest = IngestLoop {
            engine,
            data_consumer,
            pool_producer,
            shutdown: Arc::clone(&shutdown),
            processed: Arc::clone(&processed),
            idle_sleep,
            session_id,
        };

        let handle = thread::Builder::new()
            .name(format!("capture-worker-{}", session_id))
            .spawn(move || ingest.run())
            .map_err(|err| SessionError::WorkerFailed {
                reason: format!("failed to spawn worker thread: {}", err),
            })?;

        let sender = FrameSender {
            layout,
            data_producer,
            pool_consumer,
            idle_sleep,
            dropped: 0,
        };

        Ok((
            CaptureWorker {
                handle: Some(handle),
                shutdown,
                processed,
                session_id,
            },
            sender,
        ))
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Frames accumulated so far
    pub fn frames_processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    /// Stop capturing, drain queued frames and finalize
    ///
    /// Frames already queued when `stop` is called are accumulated before
    /// the session is finalized.
    pub fn stop(mut self) -> Result<DiagnosticReport, SessionError> {
        self.shutdown.store(true, Ordering::Release);
        let handle = self.handle.take().ok_or_else(|| SessionError::WorkerFailed {
            reason: "worker already stopped".to_string(),
        })?;
        let result = handle.join().unwrap_or_else(|_| {
            Err(SessionError::WorkerFailed {
                reason: "worker thread panicked".to_string(),
            })
        });
        if let Err(err) = &result {
            log_session_error(err, "CaptureWorker::stop");
        }
        result
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.shutdown.store(true, Ordering::Release);
            let _ = handle.join();
        }
    }
}

struct IngestLoop {
    engine: DiagnosticEngine,
    data_consumer: Consumer<Frame>,
    pool_producer: Producer<Frame>,
    shutdown: Arc<AtomicBool>,
    processed: Arc<AtomicU64>,
    idle_sleep: Duration,
    session_id: u64,
}

impl IngestLoop {
    fn run(mut self) -> Result<DiagnosticReport, SessionError> {
        tracing::info!("[CaptureWorker {}] Starting ingestion loop", self.session_id);

        loop {
            match self.data_consumer.pop() {
                Ok(frame) => {
                    // Layout was checked by the sender
                    if let Err(err) = self.engine.on_frame(&frame) {
                        tracing::warn!(
                            "[CaptureWorker {}] Frame rejected: {}",
                            self.session_id,
                            err
                        );
                    } else {
                        self.processed.fetch_add(1, Ordering::Release);
                    }

                    if self.pool_producer.push(frame).is_err() {
                        tracing::warn!(
                            "[CaptureWorker {}] Pool queue full, dropping frame buffer",
                            self.session_id
                        );
                    }
                }
                Err(PopError::Empty) => {
                    // Check for shutdown only when the queue is drained
                    if self.shutdown.load(Ordering::Acquire) || self.data_consumer.is_abandoned()
                    {
                        // A frame may have landed between the pop and the check
                        if !self.data_consumer.is_empty() {
                            continue;
                        }
                        break;
                    }
                    thread::sleep(self.idle_sleep);
                }
            }
        }

        let report = self.engine.on_session_end()?.clone();
        tracing::info!(
            "[CaptureWorker {}] Session finalized after {} frames: {}",
            self.session_id,
            self.processed.load(Ordering::Acquire),
            report.verdict.status
        );
        Ok(report)
    }
}
