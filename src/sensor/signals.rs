//! Shared delivery/cancellation signals.
//!
//! The one piece of state written from two execution contexts: the step
//! loop (synchronous control thread) and the sensor edge callback
//! (preemptive, platform-dependent). Everything here is a handful of
//! atomics; neither side ever blocks the other.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sentinel for "no edge recorded yet".
const NO_EDGE: u64 = u64::MAX;

#[derive(Debug)]
struct DeliverySignals {
    /// True while a single-treat attempt is in flight. The callback clears
    /// it to confirm delivery; the loop clears it on timeout or rotation
    /// completion. Terminal writes go through `swap`, so exactly one side
    /// claims each attempt.
    dispensing: AtomicBool,

    /// Sticky within one dispense run; polled by the loop every iteration.
    cancelled: AtomicBool,

    /// Milliseconds since `epoch` of the last accepted edge.
    last_edge_ms: AtomicU64,

    /// Reference point for edge timestamps.
    epoch: Instant,

    /// Bounce window: edges within this interval of the last accepted
    /// edge are ignored.
    debounce: Duration,
}

/// What became of an edge reported through [`DeliveryHandle::signal_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// The edge confirmed the in-flight attempt.
    Confirmed,
    /// A genuine edge, but no attempt was in flight; recorded for
    /// debounce purposes only.
    OutsideAttempt,
    /// Within the bounce window of the previous accepted edge; ignored.
    Bounced,
}

/// Cloneable handle onto the shared delivery signals.
///
/// The session holds one, the registered beam callback holds another;
/// both see the same state.
#[derive(Debug, Clone)]
pub struct DeliveryHandle {
    inner: Arc<DeliverySignals>,
}

impl DeliveryHandle {
    /// Create fresh signals with the given bounce window.
    pub(crate) fn new(debounce: Duration) -> Self {
        Self {
            inner: Arc::new(DeliverySignals {
                dispensing: AtomicBool::new(false),
                cancelled: AtomicBool::new(false),
                last_edge_ms: AtomicU64::new(NO_EDGE),
                epoch: Instant::now(),
                debounce,
            }),
        }
    }

    /// Report a falling edge of the break beam.
    ///
    /// The sole asynchronous entry point into dispensation state. Performs
    /// the debounce check, records the edge timestamp, and clears the
    /// dispensing flag; returns what the edge amounted to. Non-blocking.
    pub fn signal_edge(&self) -> EdgeOutcome {
        let now_ms = self.inner.epoch.elapsed().as_millis() as u64;

        let prev = self.inner.last_edge_ms.load(Ordering::Acquire);
        if prev != NO_EDGE && now_ms.saturating_sub(prev) < self.inner.debounce.as_millis() as u64 {
            return EdgeOutcome::Bounced;
        }
        // Two edges can pass the check together only if both fell outside
        // the real bounce window; the confirmation swap below stays
        // single-winner either way.
        self.inner.last_edge_ms.store(now_ms, Ordering::Release);

        if self.inner.dispensing.swap(false, Ordering::AcqRel) {
            EdgeOutcome::Confirmed
        } else {
            EdgeOutcome::OutsideAttempt
        }
    }

    /// Timestamp of the last accepted edge, as an offset from handle
    /// creation.
    pub fn last_edge(&self) -> Option<Duration> {
        match self.inner.last_edge_ms.load(Ordering::Acquire) {
            NO_EDGE => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Whether an attempt is currently in flight.
    #[inline]
    pub fn is_dispensing(&self) -> bool {
        self.inner.dispensing.load(Ordering::Acquire)
    }

    /// Whether the current run has been cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Raise the dispensing flag for a fresh attempt.
    pub(crate) fn arm(&self) {
        self.inner.dispensing.store(true, Ordering::Release);
    }

    /// Claim the terminal transition for the step loop.
    ///
    /// Returns true if the loop won the write; false means the callback
    /// confirmed the attempt first.
    pub(crate) fn claim(&self) -> bool {
        self.inner.dispensing.swap(false, Ordering::AcqRel)
    }

    /// Request cancellation of the current run.
    pub(crate) fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Clear a cancellation left over from a previous run.
    ///
    /// A termination that lands while no dispense is in flight is
    /// superseded by the next dispense request; only session close is
    /// sticky.
    pub(crate) fn clear_cancel(&self) {
        self.inner.cancelled.store(false, Ordering::Release);
    }

    /// The configured bounce window.
    #[inline]
    pub fn debounce(&self) -> Duration {
        self.inner.debounce
    }
}

/// External cancellation handle.
///
/// Cloneable and sendable to another thread; the in-flight step loop
/// honors [`terminate`](TerminateHandle::terminate) within one
/// pulse-width interval.
#[derive(Debug, Clone)]
pub struct TerminateHandle {
    signals: DeliveryHandle,
}

impl TerminateHandle {
    pub(crate) fn new(signals: DeliveryHandle) -> Self {
        Self { signals }
    }

    /// Abort the dispense run currently in flight.
    pub fn terminate(&self) {
        self.signals.cancel();
    }
}
