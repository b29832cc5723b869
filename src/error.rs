//! Error types for the treat-dispenser library.
//!
//! Provides unified error handling across configuration, motor control,
//! sensor registration, and dispensation.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all dispenser operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor operation error
    Motor(MotorError),
    /// Break-beam sensor registration error
    Sensor(SensorError),
    /// Dispensation error
    Dispense(DispenseError),
    /// Serial command codec error
    Protocol(ProtocolError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Dispenser name not found in configuration
    DispenserNotFound(heapless::String<32>),
    /// Invalid treat capacity (must be 1-59, the jogger's physical maximum)
    InvalidCapacity(u16),
    /// Invalid step budget (must be >= 1 pulse per treat)
    InvalidStepsPerTreat(u16),
    /// Invalid pulse half-period (must be 5-100 ms)
    InvalidPulseHalfPeriod(u64),
    /// Invalid jam timeout (must be >= 1 ms)
    InvalidTimeout(u64),
    /// Invalid debounce window (must be shorter than the jam timeout)
    InvalidDebounce {
        /// Configured debounce window in milliseconds
        debounce: u64,
        /// Configured jam timeout in milliseconds
        timeout: u64,
    },
    /// File I/O error
    IoError(heapless::String<128>),
}

/// Motor operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotorError {
    /// Pin operation failed
    PinError,
}

/// Break-beam sensor errors.
///
/// Either variant during session construction or teardown is fatal to the
/// session; there is no degraded mode without delivery confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// Edge-callback registration failed
    RegistrationFailed,
    /// Edge-callback release failed
    ReleaseFailed,
}

/// Dispensation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispenseError {
    /// Requested more treats than remain loaded; no hardware was touched
    InsufficientInventory {
        /// Number of treats requested
        requested: u16,
        /// Number of treats remaining in the jogger
        remaining: u16,
    },
    /// Step budget and timeout exhausted without delivery confirmation;
    /// the mechanism needs physical inspection before retrying
    JamDetected {
        /// Units of the request still undelivered
        undelivered: u16,
        /// Number of treats remaining in the jogger
        remaining: u16,
    },
    /// An external terminate request aborted the run
    Cancelled {
        /// Units of the request still undelivered
        undelivered: u16,
        /// Number of treats remaining in the jogger
        remaining: u16,
    },
    /// The session was already closed
    SessionClosed,
}

/// Serial command codec errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame is not 4 bytes or lacks the `C`...`E` delimiters
    InvalidFraming,
    /// Opcode byte is not one of `D`, `A`, `B`, `M`, `P`, `F`
    UnknownOpcode(u8),
    /// Value byte is outside the opcode's valid range
    ValueOutOfRange {
        /// Opcode the value was paired with
        opcode: u8,
        /// Offending value byte
        value: u8,
    },
    /// Response byte is neither `0x30` (success) nor `0x31` (failure)
    InvalidResponse(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Sensor(e) => write!(f, "Sensor error: {}", e),
            Error::Dispense(e) => write!(f, "Dispense error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::DispenserNotFound(name) => write!(f, "Dispenser '{}' not found", name),
            ConfigError::InvalidCapacity(v) => {
                write!(f, "Invalid capacity: {}. Must be 1-59", v)
            }
            ConfigError::InvalidStepsPerTreat(v) => {
                write!(f, "Invalid steps per treat: {}. Must be >= 1", v)
            }
            ConfigError::InvalidPulseHalfPeriod(v) => {
                write!(f, "Invalid pulse half-period: {} ms. Must be 5-100", v)
            }
            ConfigError::InvalidTimeout(v) => {
                write!(f, "Invalid timeout: {} ms. Must be >= 1", v)
            }
            ConfigError::InvalidDebounce { debounce, timeout } => {
                write!(
                    f,
                    "Invalid debounce: {} ms must be shorter than the {} ms timeout",
                    debounce, timeout
                )
            }
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::RegistrationFailed => {
                write!(f, "Break-beam edge callback registration failed")
            }
            SensorError::ReleaseFailed => {
                write!(f, "Break-beam edge callback release failed")
            }
        }
    }
}

impl fmt::Display for DispenseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispenseError::InsufficientInventory { requested, remaining } => {
                write!(
                    f,
                    "Not enough treats remaining to dispense {} ({} loaded)",
                    requested, remaining
                )
            }
            DispenseError::JamDetected { undelivered, remaining } => {
                write!(
                    f,
                    "Treat was unable to dispense, {} undelivered with {} in jogger, check for jams",
                    undelivered, remaining
                )
            }
            DispenseError::Cancelled { undelivered, remaining } => {
                write!(
                    f,
                    "Dispense terminated, {} undelivered with {} in jogger",
                    undelivered, remaining
                )
            }
            DispenseError::SessionClosed => write!(f, "Dispenser session is closed"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidFraming => {
                write!(f, "Command frame must be 4 bytes delimited by 'C' and 'E'")
            }
            ProtocolError::UnknownOpcode(op) => write!(f, "Unknown opcode: {:#04x}", op),
            ProtocolError::ValueOutOfRange { opcode, value } => {
                write!(
                    f,
                    "Value {:#04x} out of range for opcode '{}'",
                    value, *opcode as char
                )
            }
            ProtocolError::InvalidResponse(b) => {
                write!(f, "Invalid response byte: {:#04x}. Expected 0x30 or 0x31", b)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Error::Sensor(e)
    }
}

impl From<DispenseError> for Error {
    fn from(e: DispenseError) -> Self {
        Error::Dispense(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl std::error::Error for Error {}

impl std::error::Error for ConfigError {}

impl std::error::Error for MotorError {}

impl std::error::Error for SensorError {}

impl std::error::Error for DispenseError {}

impl std::error::Error for ProtocolError {}
