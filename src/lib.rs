//! # treat-dispenser
//!
//! Stepper-driven treat dispenser control with break-beam delivery
//! confirmation and embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Configuration-driven**: Define dispensers and pin maps in TOML files
//! - **embedded-hal 1.0**: Uses `OutputPin` for STEP/DIR, `DelayNs` for timing
//! - **Delivery confirmation**: Break-beam edge callback with 100 ms debounce
//! - **Jam detection**: Per-treat watchdog timeout with partial-progress reporting
//! - **Race-free coordination**: Atomic hand-off between the sensor callback
//!   and the step loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use treat_dispenser::{Dispenser, SystemConfig};
//!
//! // Load configuration from TOML
//! let config: SystemConfig = treat_dispenser::load_config("dispenser.toml")?;
//!
//! // Create a session with embedded-hal pins and a beam sensor
//! let mut dispenser = Dispenser::builder()
//!     .from_config(&config, "lab")?
//!     .step_pin(step_pin)
//!     .dir_pin(dir_pin)
//!     .delay(delay)
//!     .beam(beam_sensor)
//!     .build()?;
//!
//! // Dispense three treats, confirming each through the break beam
//! dispenser.dispense(3)?;
//! dispenser.close()?;
//! ```
//!
//! The crate never opens GPIO itself: callers construct pins from a
//! [`PinMap`] with their platform HAL and inject them through the builder.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary with heapless strings in messages
#![allow(clippy::result_large_err)]

// Core modules
pub mod config;
pub mod dispense;
pub mod error;
pub mod motor;
pub mod protocol;
pub mod sensor;

// Re-exports for ergonomic API
pub use config::{
    load_config, parse_config, validate_config, ConfirmPolicy, DispenserConfig, HardwareRevision,
    PinMap, SystemConfig,
};
pub use dispense::{AttemptPhase, Confirmation, Dispenser, DispenserBuilder};
pub use error::{
    ConfigError, DispenseError, Error, MotorError, ProtocolError, Result, SensorError,
};
pub use motor::{Direction, StepMotor};
pub use protocol::{Command, Response};
pub use sensor::{BeamSensor, DeliveryHandle, EdgeOutcome, TerminateHandle};

// Unit types
pub use config::units::{Millis, Pulses};
