//! Dispenser configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::pins::{HardwareRevision, PinMap};
use super::units::{Millis, Pulses};

/// Default treat capacity (a fully loaded jogger).
pub const DEFAULT_CAPACITY: u16 = 59;
/// Default jam timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;
/// Default step budget for one dispensation unit (one wheel compartment).
pub const DEFAULT_STEPS_PER_TREAT: u16 = 53;
/// Default step-pulse half-period in milliseconds.
pub const DEFAULT_PULSE_HALF_PERIOD_MS: u64 = 100;
/// Default break-beam debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Policy for an attempt whose step budget is exhausted without a beam
/// confirmation.
///
/// The device's original firmware counts a completed rotation as a success,
/// tolerating a sensor miss after a full cycle - at the cost of masking
/// genuine non-delivery (empty compartment, stuck treat). `BeamOnly` makes
/// the sensor authoritative instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmPolicy {
    /// A full wheel rotation counts as delivery even without the beam.
    /// Surfaced as [`Confirmation::FullRotation`](crate::Confirmation) and
    /// counted by the session so sensor misses remain auditable.
    #[default]
    FullRotation,
    /// Only a beam edge confirms delivery; an exhausted step budget holds
    /// (no further pulses) until the beam fires or the timeout expires as
    /// a jam.
    BeamOnly,
}

/// Complete dispenser configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct DispenserConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Number of treats loaded for the session (1-59).
    #[serde(default = "default_capacity")]
    pub capacity: u16,

    /// Jam timeout per dispensation unit.
    #[serde(default = "default_timeout", rename = "timeout_ms")]
    pub timeout: Millis,

    /// Step pulses per dispensation unit (one wheel compartment).
    #[serde(default = "default_steps_per_treat")]
    pub steps_per_treat: Pulses,

    /// Half-period of the step pulse (high hold = low hold).
    #[serde(default = "default_pulse_half_period", rename = "pulse_half_period_ms")]
    pub pulse_half_period: Millis,

    /// Break-beam debounce window.
    #[serde(default = "default_debounce", rename = "debounce_ms")]
    pub debounce: Millis,

    /// Policy for a completed rotation without beam confirmation.
    #[serde(default)]
    pub confirm_policy: ConfirmPolicy,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Hardware revision selecting a pin-map preset.
    #[serde(default)]
    pub revision: Option<HardwareRevision>,

    /// Explicit pin map; takes precedence over `revision`.
    #[serde(default)]
    pub pins: Option<PinMap>,
}

fn default_capacity() -> u16 {
    DEFAULT_CAPACITY
}

fn default_timeout() -> Millis {
    Millis(DEFAULT_TIMEOUT_MS)
}

fn default_steps_per_treat() -> Pulses {
    Pulses(DEFAULT_STEPS_PER_TREAT)
}

fn default_pulse_half_period() -> Millis {
    Millis(DEFAULT_PULSE_HALF_PERIOD_MS)
}

fn default_debounce() -> Millis {
    Millis(DEFAULT_DEBOUNCE_MS)
}

impl DispenserConfig {
    /// Resolve the pin map: explicit pins win, then the revision preset,
    /// then the breadboard default.
    pub fn pin_map(&self) -> PinMap {
        match (self.pins, self.revision) {
            (Some(pins), _) => pins,
            (None, Some(rev)) => rev.pin_map(),
            (None, None) => PinMap::breadboard(),
        }
    }

    /// Full step period for one pulse (high hold + low hold).
    pub fn step_period(&self) -> Millis {
        Millis(self.pulse_half_period.0 * 2)
    }
}
