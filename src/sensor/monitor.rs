//! Break-beam edge registration trait.

use super::signals::DeliveryHandle;

/// Registration seam for the break-beam input.
///
/// An implementation wires the falling edge of the beam input (an object
/// interrupting the beam) to [`DeliveryHandle::signal_edge`]. The handle
/// does the rest: debounce, timestamp recording, and the hand-off to the
/// step loop. `signal_edge` is a few atomic operations, so it is safe to
/// call from an interrupt service routine or a platform callback thread.
///
/// On a Raspberry Pi this is typically a thin wrapper over the HAL's
/// async-interrupt API; in tests it is a thread firing edges on a schedule.
pub trait BeamSensor {
    /// Platform registration error.
    type Error;

    /// Register the falling-edge callback.
    ///
    /// Called once at session construction. The implementation keeps the
    /// handle (or a clone) for the lifetime of the registration.
    fn watch(&mut self, deliveries: DeliveryHandle) -> Result<(), Self::Error>;

    /// Release the falling-edge callback.
    ///
    /// Called at session close; must be safe to call when no registration
    /// is active.
    fn unwatch(&mut self) -> Result<(), Self::Error>;
}
