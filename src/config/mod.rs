//! Configuration module for treat-dispenser.
//!
//! Provides types for loading and validating dispenser and pin-map
//! configurations from TOML files or pre-parsed data.

mod dispenser;
mod loader;
mod pins;
mod system;
pub mod units;
mod validation;

pub use dispenser::{
    ConfirmPolicy, DispenserConfig, DEFAULT_CAPACITY, DEFAULT_DEBOUNCE_MS,
    DEFAULT_PULSE_HALF_PERIOD_MS, DEFAULT_STEPS_PER_TREAT, DEFAULT_TIMEOUT_MS,
};
pub use loader::{load_config, parse_config};
pub use pins::{HardwareRevision, PinMap};
pub use system::SystemConfig;
pub use validation::validate_config;

// Re-export unit types at config level
pub use units::{Millis, Pulses};
