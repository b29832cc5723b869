//! Dispenser session: inventory, the multi-treat dispense loop, and
//! hardware-handle lifecycle.

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use crate::config::units::Pulses;
use crate::config::ConfirmPolicy;
use crate::error::{DispenseError, Error, Result, SensorError};
use crate::motor::StepMotor;
use crate::sensor::{BeamSensor, DeliveryHandle, TerminateHandle};

use super::builder::DispenserBuilder;
use super::state::{AttemptPhase, Confirmation, DispensationState, Verdict};

/// Why a single-treat attempt did not deliver.
enum AttemptFailure {
    /// Deadline expired without confirmation.
    TimedOut,
    /// External termination request.
    Cancelled,
    /// Pin-level fault.
    Motor(Error),
}

/// A dispenser session.
///
/// Owns the step/direction pins, the delay provider, and the break-beam
/// registration for one physical run. Created through
/// [`builder`](Dispenser::builder), closed with [`close`](Dispenser::close)
/// (or best-effort on drop).
pub struct Dispenser<STEP, DIR, DELAY, BEAM>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    BEAM: BeamSensor,
{
    motor: StepMotor<STEP, DIR, DELAY>,
    beam: BEAM,
    deliveries: DeliveryHandle,
    name: heapless::String<32>,
    remaining: u16,
    timeout: Duration,
    steps_per_treat: Pulses,
    policy: ConfirmPolicy,
    phase: AttemptPhase,
    delivered: u32,
    unconfirmed: u32,
    closed: bool,
}

impl<STEP, DIR, DELAY, BEAM> Dispenser<STEP, DIR, DELAY, BEAM>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    BEAM: BeamSensor,
{
    /// Create a builder for a new session.
    pub fn builder() -> DispenserBuilder<STEP, DIR, DELAY, BEAM> {
        DispenserBuilder::new()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        motor: StepMotor<STEP, DIR, DELAY>,
        beam: BEAM,
        deliveries: DeliveryHandle,
        name: heapless::String<32>,
        capacity: u16,
        timeout: Duration,
        steps_per_treat: Pulses,
        policy: ConfirmPolicy,
    ) -> Self {
        info!(
            "dispenser '{}' ready: {} treats loaded, {} ms timeout",
            name,
            capacity,
            timeout.as_millis()
        );
        Self {
            motor,
            beam,
            deliveries,
            name,
            remaining: capacity,
            timeout,
            steps_per_treat,
            policy,
            phase: AttemptPhase::Idle,
            delivered: 0,
            unconfirmed: 0,
            closed: false,
        }
    }

    /// Get the dispenser name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Treats remaining in the jogger.
    #[inline]
    pub fn remaining_treats(&self) -> u16 {
        self.remaining
    }

    /// Treats delivered over the session's lifetime.
    #[inline]
    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    /// Deliveries counted by the full-rotation fallback rather than a
    /// beam edge. A non-zero value means the sensor missed - or the
    /// mechanism turned without delivering.
    #[inline]
    pub fn unconfirmed_deliveries(&self) -> u32 {
        self.unconfirmed
    }

    /// Phase the most recent attempt ended in.
    #[inline]
    pub fn attempt_phase(&self) -> AttemptPhase {
        self.phase
    }

    /// Per-treat jam timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the session has been closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Handle for terminating an in-flight dispense from another thread.
    pub fn terminate_handle(&self) -> TerminateHandle {
        TerminateHandle::new(self.deliveries.clone())
    }

    /// Dispense `count` treats.
    ///
    /// Validates inventory before touching hardware; dispenses one unit at
    /// a time, decrementing inventory on each confirmed delivery. On a
    /// failed unit the remaining units are aborted and the error carries
    /// the undelivered count - units already dispensed stay decremented.
    ///
    /// Requesting zero treats is a no-op.
    ///
    /// # Errors
    ///
    /// - [`DispenseError::InsufficientInventory`] if `count` exceeds the
    ///   remaining treats (no hardware interaction)
    /// - [`DispenseError::JamDetected`] if a unit times out unconfirmed
    /// - [`DispenseError::Cancelled`] if a terminate request aborted the run
    /// - [`DispenseError::SessionClosed`] after [`close`](Dispenser::close)
    pub fn dispense(&mut self, count: u16) -> Result<()> {
        if self.closed {
            return Err(DispenseError::SessionClosed.into());
        }
        if count > self.remaining {
            debug!(
                "dispenser '{}': refusing request for {} treats ({} loaded)",
                self.name, count, self.remaining
            );
            return Err(DispenseError::InsufficientInventory {
                requested: count,
                remaining: self.remaining,
            }
            .into());
        }

        self.deliveries.clear_cancel();

        for unit in 0..count {
            match self.dispense_one() {
                Ok(confirmation) => {
                    self.remaining -= 1;
                    self.delivered += 1;
                    if confirmation == Confirmation::FullRotation {
                        self.unconfirmed += 1;
                        warn!(
                            "dispenser '{}': full rotation completed without beam confirmation",
                            self.name
                        );
                    }
                    debug!(
                        "dispenser '{}': treat delivered, {} remaining",
                        self.name, self.remaining
                    );
                }
                Err(AttemptFailure::TimedOut) => {
                    let undelivered = count - unit;
                    warn!(
                        "dispenser '{}': jam detected, {} of {} undelivered",
                        self.name, undelivered, count
                    );
                    return Err(DispenseError::JamDetected {
                        undelivered,
                        remaining: self.remaining,
                    }
                    .into());
                }
                Err(AttemptFailure::Cancelled) => {
                    let undelivered = count - unit;
                    info!(
                        "dispenser '{}': run terminated, {} of {} undelivered",
                        self.name, undelivered, count
                    );
                    return Err(DispenseError::Cancelled {
                        undelivered,
                        remaining: self.remaining,
                    }
                    .into());
                }
                Err(AttemptFailure::Motor(e)) => return Err(e),
            }
        }

        Ok(())
    }

    /// Run one single-treat attempt to a terminal phase.
    fn dispense_one(&mut self) -> core::result::Result<Confirmation, AttemptFailure> {
        self.deliveries.arm();
        let mut state = DispensationState::arm(
            self.steps_per_treat,
            self.timeout,
            self.policy,
            Instant::now(),
        );

        let result = loop {
            match state.poll(Instant::now(), &self.deliveries) {
                Verdict::Step => {
                    if let Err(e) = self.motor.step() {
                        state.abort(&self.deliveries);
                        break Err(AttemptFailure::Motor(e));
                    }
                    state.count_step();
                }
                Verdict::Hold => self.motor.hold(),
                Verdict::Confirmed(confirmation) => break Ok(confirmation),
                Verdict::TimedOut => break Err(AttemptFailure::TimedOut),
                Verdict::Cancelled => break Err(AttemptFailure::Cancelled),
            }
        };

        self.phase = state.phase();
        result
    }

    /// Close the session: cancel any in-flight attempt, release the
    /// break-beam registration. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::ReleaseFailed`] if the registration could
    /// not be released; the session stays open so the call can be retried.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        // Force the shared state terminal before releasing the
        // registration; an attempt observing these exits within one
        // pulse-width interval
        self.deliveries.cancel();
        self.deliveries.claim();

        self.beam
            .unwatch()
            .map_err(|_| Error::Sensor(SensorError::ReleaseFailed))?;
        self.closed = true;
        info!(
            "dispenser '{}' closed: {} delivered, {} remaining",
            self.name, self.delivered, self.remaining
        );
        Ok(())
    }
}

impl<STEP, DIR, DELAY, BEAM> Drop for Dispenser<STEP, DIR, DELAY, BEAM>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    BEAM: BeamSensor,
{
    fn drop(&mut self) {
        if !self.closed {
            self.deliveries.cancel();
            let _ = self.beam.unwatch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::Millis;
    use core::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Output pin that counts writes.
    struct CountingPin {
        writes: Arc<AtomicU32>,
    }

    impl CountingPin {
        fn new() -> (Self, Arc<AtomicU32>) {
            let writes = Arc::new(AtomicU32::new(0));
            (Self { writes: writes.clone() }, writes)
        }
    }

    impl embedded_hal::digital::ErrorType for CountingPin {
        type Error = Infallible;
    }

    impl OutputPin for CountingPin {
        fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
            self.writes.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
            self.writes.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    /// Delay provider that returns immediately.
    struct InstantDelay;

    impl DelayNs for InstantDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Beam sensor that registers but never fires.
    struct SilentBeam;

    impl BeamSensor for SilentBeam {
        type Error = Infallible;

        fn watch(&mut self, _deliveries: DeliveryHandle) -> core::result::Result<(), Infallible> {
            Ok(())
        }

        fn unwatch(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }
    }

    fn make_session(
        capacity: u16,
    ) -> (
        Dispenser<CountingPin, CountingPin, InstantDelay, SilentBeam>,
        Arc<AtomicU32>,
    ) {
        let (step, step_writes) = CountingPin::new();
        let (dir, _) = CountingPin::new();
        let session = Dispenser::builder()
            .step_pin(step)
            .dir_pin(dir)
            .delay(InstantDelay)
            .beam(SilentBeam)
            .name("bench")
            .capacity(capacity)
            .timeout(Millis(1_000))
            .steps_per_treat(Pulses(2))
            .debounce(Millis(0))
            .build()
            .unwrap();
        (session, step_writes)
    }

    #[test]
    fn test_insufficient_inventory_touches_no_hardware() {
        let (mut session, step_writes) = make_session(5);

        let result = session.dispense(10);
        assert_eq!(
            result,
            Err(Error::Dispense(DispenseError::InsufficientInventory {
                requested: 10,
                remaining: 5,
            }))
        );
        assert_eq!(session.remaining_treats(), 5);
        assert_eq!(step_writes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_zero_count_is_noop() {
        let (mut session, step_writes) = make_session(5);

        session.dispense(0).unwrap();
        assert_eq!(session.remaining_treats(), 5);
        assert_eq!(step_writes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_full_rotation_fallback_dispenses() {
        let (mut session, step_writes) = make_session(5);

        session.dispense(2).unwrap();
        assert_eq!(session.remaining_treats(), 3);
        assert_eq!(session.delivered(), 2);
        // No beam ever fired, so both deliveries came from the fallback
        assert_eq!(session.unconfirmed_deliveries(), 2);
        assert_eq!(session.attempt_phase(), AttemptPhase::Confirmed);
        // 2 treats x 2 steps x 2 pin writes per pulse
        assert_eq!(step_writes.load(Ordering::Relaxed), 8);
    }

    #[test]
    fn test_close_is_idempotent() {
        let (mut session, _) = make_session(5);

        session.close().unwrap();
        assert!(session.is_closed());
        session.close().unwrap();

        assert_eq!(
            session.dispense(1),
            Err(Error::Dispense(DispenseError::SessionClosed))
        );
    }
}
