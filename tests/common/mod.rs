//! Shared mock hardware for integration tests.
//!
//! Mirrors a real deployment: pins and delay on the control thread, the
//! beam sensor firing edges from its own thread like a GPIO edge detector.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use treat_dispenser::{BeamSensor, DeliveryHandle, EdgeOutcome};

/// Output pin that counts rising edges (issued step pulses).
pub struct CountingPin {
    pulses: Arc<AtomicU32>,
}

impl CountingPin {
    pub fn new() -> (Self, Arc<AtomicU32>) {
        let pulses = Arc::new(AtomicU32::new(0));
        (
            Self {
                pulses: pulses.clone(),
            },
            pulses,
        )
    }
}

impl embedded_hal::digital::ErrorType for CountingPin {
    type Error = Infallible;
}

impl OutputPin for CountingPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pulses.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Delay provider backed by real thread sleeps.
pub struct SleepDelay;

impl DelayNs for SleepDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Delay provider that returns immediately.
pub struct InstantDelay;

impl DelayNs for InstantDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Beam sensor that registers but never fires an edge.
pub struct SilentBeam;

impl BeamSensor for SilentBeam {
    type Error = Infallible;

    fn watch(&mut self, _deliveries: DeliveryHandle) -> Result<(), Self::Error> {
        Ok(())
    }

    fn unwatch(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Beam sensor firing edges from a background thread, like a hardware
/// edge detector. Optionally stops after a fixed number of confirmed
/// deliveries to simulate a jam partway through a run.
pub struct FiringBeam {
    period: Duration,
    confirm_limit: Option<u32>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl FiringBeam {
    /// Fire an edge every `period` for as long as the registration lives.
    pub fn every(period: Duration) -> Self {
        Self {
            period,
            confirm_limit: None,
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Fire edges, but go dark after `limit` confirmed deliveries.
    pub fn with_confirm_limit(period: Duration, limit: u32) -> Self {
        Self {
            confirm_limit: Some(limit),
            ..Self::every(period)
        }
    }
}

impl BeamSensor for FiringBeam {
    type Error = Infallible;

    fn watch(&mut self, deliveries: DeliveryHandle) -> Result<(), Self::Error> {
        let stop = self.stop.clone();
        let period = self.period;
        let confirm_limit = self.confirm_limit;

        self.worker = Some(thread::spawn(move || {
            let mut confirms = 0u32;
            while !stop.load(Ordering::Acquire) {
                if deliveries.signal_edge() == EdgeOutcome::Confirmed {
                    confirms += 1;
                    if confirm_limit.is_some_and(|limit| confirms >= limit) {
                        break;
                    }
                }
                thread::sleep(period);
            }
        }));
        Ok(())
    }

    fn unwatch(&mut self) -> Result<(), Self::Error> {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        Ok(())
    }
}
