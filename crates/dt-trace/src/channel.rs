//! Bounded batch channel with hysteresis backpressure.
//!
//! # Protocol
//!
//! ```text
//!   producer                       shared state                    consumer
//!   ────────                       ────────────                    ────────
//!   send(batch) ──────────────▶  VecDeque<MovementBatch> ──────▶  recv()
//!     │ len ≥ high?                 complete / failure               │ empty?
//!     └─ wait on `drained`          cancelled                        └─ wait_for(poll) on
//!        until len ≤ low                                                `not_empty`, re-check
//! ```
//!
//! One `parking_lot::Mutex` guards the queue, the completion flag and the
//! captured failure, so every observation and transition is atomic relative
//! to the others.  The cancellation flag is an `AtomicBool` that is only set
//! with the lock held, which lets the producer poll it between lines without
//! locking.  Two condition variables
//! carry the wake-ups: `not_empty` (signalled on every send and on close) and
//! `drained` (signalled on every successful receive and on cancel).  Neither
//! is ever recreated.
//!
//! Once the producer stalls at `high`, it stays stalled until the consumer
//! has brought the queue down to `low`; it never pushes the queue past
//! `high`.
//!
//! Dropping the [`BatchSender`] without calling `finish`/`fail` (e.g. the
//! ingestion thread panicked) still marks the channel complete, so the
//! consumer cannot wait forever.  Dropping the [`BatchReceiver`] cancels the
//! producer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::{MovementBatch, TraceError, TraceResult};

pub const DEFAULT_READ_AHEAD_LOW:  usize    = 2_000;
pub const DEFAULT_READ_AHEAD_HIGH: usize    = 20_000;
pub const DEFAULT_POLL_INTERVAL:   Duration = Duration::from_millis(50);

// ── ReadAhead ─────────────────────────────────────────────────────────────────

/// Low/high water marks, in batches.
///
/// Only constructible through [`ReadAhead::new`] (or `Default`), so every
/// value reaching [`bounded`] satisfies `low < high`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReadAhead {
    low:  usize,
    high: usize,
}

impl ReadAhead {
    /// # Errors
    ///
    /// `Config` unless `low < high`.
    pub fn new(low: usize, high: usize) -> TraceResult<Self> {
        if low >= high {
            return Err(TraceError::Config(format!(
                "read-ahead low mark ({low}) must be below the high mark ({high})"
            )));
        }
        Ok(Self { low, high })
    }

    /// Producer resumes once the queue is at or below this.
    #[inline]
    pub fn low(&self) -> usize {
        self.low
    }

    /// Producer stalls once the queue reaches this.
    #[inline]
    pub fn high(&self) -> usize {
        self.high
    }
}

impl Default for ReadAhead {
    fn default() -> Self {
        Self {
            low:  DEFAULT_READ_AHEAD_LOW,
            high: DEFAULT_READ_AHEAD_HIGH,
        }
    }
}

// ── WorkerState ───────────────────────────────────────────────────────────────

/// Lifecycle of the ingestion producer, as published through the channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorkerState {
    NotStarted,
    ReadingHeader,
    Streaming,
    /// Blocked on backpressure, waiting for the consumer to drain.
    Draining,
    Finished,
}

// ── ChannelStats ──────────────────────────────────────────────────────────────

/// Point-in-time counters, taken under the channel lock.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Batches currently queued.
    pub queued:            usize,
    /// Largest `queued` ever observed.  Never exceeds `ReadAhead::high`.
    pub peak_queued:       usize,
    pub batches_sent:      u64,
    pub batches_received:  u64,
    /// Number of times the producer stalled at the high mark.
    pub throttle_episodes: u64,
    /// The producer will send nothing more.
    pub complete:          bool,
}

// ── Shared state ──────────────────────────────────────────────────────────────

struct State {
    queue:     VecDeque<MovementBatch>,
    /// Streaming error awaiting delivery.  Handed out once, after the queue
    /// has drained.
    failure:   Option<TraceError>,
    /// Set once, never cleared.
    complete:  bool,
    producer:  WorkerState,

    peak_queued:       usize,
    batches_sent:      u64,
    batches_received:  u64,
    throttle_episodes: u64,
}

struct Shared {
    state:         Mutex<State>,
    not_empty:     Condvar,
    drained:       Condvar,
    /// Only written while `state` is locked, so waiters that check it under
    /// the lock cannot miss the wake-up.  Read lock-free by the producer
    /// between lines.
    cancelled:     AtomicBool,
    read_ahead:    ReadAhead,
    poll_interval: Duration,
}

impl Shared {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Create a connected sender/receiver pair.
pub fn bounded(read_ahead: ReadAhead, poll_interval: Duration) -> (BatchSender, BatchReceiver) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            queue:     VecDeque::with_capacity(read_ahead.high.min(4_096)),
            failure:   None,
            complete:  false,
            producer:  WorkerState::NotStarted,

            peak_queued:       0,
            batches_sent:      0,
            batches_received:  0,
            throttle_episodes: 0,
        }),
        not_empty: Condvar::new(),
        drained:   Condvar::new(),
        cancelled: AtomicBool::new(false),
        read_ahead,
        poll_interval,
    });

    (
        BatchSender { shared: Arc::clone(&shared) },
        BatchReceiver { shared },
    )
}

// ── BatchSender ───────────────────────────────────────────────────────────────

/// Producer half.  Exactly one exists per channel.
pub struct BatchSender {
    shared: Arc<Shared>,
}

impl BatchSender {
    /// Enqueue `batch`, stalling first if the queue has reached the high mark.
    ///
    /// # Errors
    ///
    /// `InterruptedWait` if the receiver cancelled, either before the call or
    /// while the producer was stalled.  The batch is discarded.
    pub fn send(&self, batch: MovementBatch) -> TraceResult<()> {
        let ReadAhead { low, high } = self.shared.read_ahead;
        let mut state = self.shared.state.lock();

        if !self.shared.is_cancelled() && state.queue.len() >= high {
            state.throttle_episodes += 1;
            state.producer = WorkerState::Draining;
            tracing::debug!(queued = state.queue.len(), low, high, "read-ahead full, producer waiting");

            while state.queue.len() > low && !self.shared.is_cancelled() {
                self.shared.drained.wait(&mut state);
            }

            if !self.shared.is_cancelled() {
                state.producer = WorkerState::Streaming;
                tracing::debug!(queued = state.queue.len(), "read-ahead drained, producer resuming");
            }
        }

        if self.shared.is_cancelled() {
            return Err(TraceError::InterruptedWait);
        }

        state.queue.push_back(batch);
        state.batches_sent += 1;
        state.peak_queued = state.peak_queued.max(state.queue.len());
        drop(state);

        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Publish the producer's lifecycle state.
    pub fn set_state(&self, producer: WorkerState) {
        self.shared.state.lock().producer = producer;
    }

    /// `true` once the receiver has cancelled.  Does not take the lock.
    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// Mark the stream complete.  Queued batches remain receivable.
    pub fn finish(self) {
        self.close(None);
    }

    /// Mark the stream complete with an error that the consumer receives
    /// after the batches queued before it.
    pub fn fail(self, error: TraceError) {
        self.close(Some(error));
    }

    fn close(&self, failure: Option<TraceError>) {
        let mut state = self.shared.state.lock();
        if state.complete {
            return;
        }
        state.complete = true;
        state.failure = failure;
        state.producer = WorkerState::Finished;
        drop(state);

        self.shared.not_empty.notify_all();
    }
}

impl Drop for BatchSender {
    fn drop(&mut self) {
        self.close(None);
    }
}

// ── BatchReceiver ─────────────────────────────────────────────────────────────

/// Consumer half.  Exactly one exists per channel.
pub struct BatchReceiver {
    shared: Arc<Shared>,
}

impl BatchReceiver {
    /// Take the oldest batch, waiting while the queue is empty and the
    /// producer is still running.
    ///
    /// The wait is a series of bounded `poll_interval` sleeps on the
    /// `not_empty` condition, re-checking completion after each one.
    ///
    /// Returns `Ok(None)` once the producer has finished (or the channel was
    /// cancelled) and everything queued has been taken.  A captured streaming
    /// error is returned exactly once, after all batches that preceded it.
    pub fn recv(&self) -> TraceResult<Option<MovementBatch>> {
        let mut state = self.shared.state.lock();
        loop {
            if let Some(batch) = state.queue.pop_front() {
                state.batches_received += 1;
                drop(state);
                self.shared.drained.notify_one();
                return Ok(Some(batch));
            }
            if let Some(error) = state.failure.take() {
                return Err(error);
            }
            if state.complete || self.shared.is_cancelled() {
                return Ok(None);
            }
            self.shared.not_empty.wait_for(&mut state, self.shared.poll_interval);
        }
    }

    /// Like [`recv`](Self::recv) but never waits: `Ok(None)` may simply mean
    /// "nothing yet".  Use [`is_exhausted`](Self::is_exhausted) to tell apart.
    pub fn try_recv(&self) -> TraceResult<Option<MovementBatch>> {
        let mut state = self.shared.state.lock();
        if let Some(batch) = state.queue.pop_front() {
            state.batches_received += 1;
            drop(state);
            self.shared.drained.notify_one();
            return Ok(Some(batch));
        }
        match state.failure.take() {
            Some(error) => Err(error),
            None => Ok(None),
        }
    }

    /// `true` once nothing more will ever be received.
    pub fn is_exhausted(&self) -> bool {
        let state = self.shared.state.lock();
        state.queue.is_empty()
            && state.failure.is_none()
            && (state.complete || self.shared.is_cancelled())
    }

    /// Stop the producer.  A producer stalled on backpressure wakes and its
    /// pending `send` fails with `InterruptedWait`.  Idempotent.
    pub fn cancel(&self) {
        let guard = self.shared.state.lock();
        if self.shared.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        drop(guard);

        tracing::debug!("batch channel cancelled");
        self.shared.drained.notify_all();
        self.shared.not_empty.notify_all();
    }

    pub fn producer_state(&self) -> WorkerState {
        self.shared.state.lock().producer
    }

    pub fn read_ahead(&self) -> ReadAhead {
        self.shared.read_ahead
    }

    pub fn len(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> ChannelStats {
        let state = self.shared.state.lock();
        ChannelStats {
            queued:            state.queue.len(),
            peak_queued:       state.peak_queued,
            batches_sent:      state.batches_sent,
            batches_received:  state.batches_received,
            throttle_episodes: state.throttle_episodes,
            complete:          state.complete,
        }
    }
}

impl Drop for BatchReceiver {
    fn drop(&mut self) {
        self.cancel();
    }
}
