//! Break-beam sensor seam.
//!
//! The sensor side of the dispenser is split in two: [`BeamSensor`] is the
//! registration trait a platform implements over its edge-interrupt
//! facility, and [`DeliveryHandle`] is the shared signal state the
//! registered callback drives. Debounce and the loop/callback hand-off
//! live in the handle, so every sensor implementation gets them for free.

mod monitor;
mod signals;

pub use monitor::BeamSensor;
pub use signals::{DeliveryHandle, EdgeOutcome, TerminateHandle};
