//! Serial command codec for the firmware-based transport.
//!
//! The retrofitted dispenser variant speaks a line-oriented ASCII protocol
//! over a byte stream: 4-byte command frames of the form `C<op><value>E`,
//! answered by a single status byte. This module is the interface boundary
//! only - framing, validation, and the response byte. Port I/O and device
//! enumeration belong to the external driver.

use crate::error::ProtocolError;

/// Length of a command frame.
pub const FRAME_LEN: usize = 4;

/// Terminator line emitted by the wheel-test routine when it completes.
///
/// Unlike the other commands, wheel test streams newline-terminated status
/// lines until this value.
pub const WHEEL_TEST_DONE: &str = "0";

const FRAME_START: u8 = b'C';
const FRAME_END: u8 = b'E';

/// A device command.
///
/// Value encoding differs per opcode: `D` and `B` carry an ASCII decimal
/// digit, `A` and `M` carry the raw byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `D`: dispense 0-9 treats, decimal-coded.
    Dispense(u8),
    /// `A`: dispense 0-255 treats, raw byte value.
    DispenseRaw(u8),
    /// `B`: set the RF-remote dispensation amount, 0-9.
    RemoteAmount(u8),
    /// `M`: set the motor speed, 0-255.
    MotorSpeed(u8),
    /// `P`: report sensor state for debugging.
    SensorDebug,
    /// `F`: run the wheel-test routine.
    WheelTest,
}

impl Command {
    /// The opcode byte for this command.
    pub const fn opcode(&self) -> u8 {
        match self {
            Command::Dispense(_) => b'D',
            Command::DispenseRaw(_) => b'A',
            Command::RemoteAmount(_) => b'B',
            Command::MotorSpeed(_) => b'M',
            Command::SensorDebug => b'P',
            Command::WheelTest => b'F',
        }
    }

    /// Encode into a 4-byte frame.
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` for a decimal-coded amount above 9.
    pub fn encode(&self) -> Result<[u8; FRAME_LEN], ProtocolError> {
        let value = match *self {
            Command::Dispense(n) | Command::RemoteAmount(n) => {
                if n > 9 {
                    return Err(ProtocolError::ValueOutOfRange {
                        opcode: self.opcode(),
                        value: n,
                    });
                }
                b'0' + n
            }
            Command::DispenseRaw(n) | Command::MotorSpeed(n) => n,
            Command::SensorDebug | Command::WheelTest => b'0',
        };

        Ok([FRAME_START, self.opcode(), value, FRAME_END])
    }

    /// Decode a 4-byte frame.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFraming` if the frame is not 4 bytes delimited by
    /// `C` and `E`, `UnknownOpcode` for an unrecognized opcode, and
    /// `ValueOutOfRange` when the value byte does not fit the opcode.
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        if frame.len() != FRAME_LEN || frame[0] != FRAME_START || frame[3] != FRAME_END {
            return Err(ProtocolError::InvalidFraming);
        }

        let opcode = frame[1];
        let value = frame[2];

        match opcode {
            b'D' => decimal_digit(opcode, value).map(Command::Dispense),
            b'A' => Ok(Command::DispenseRaw(value)),
            b'B' => decimal_digit(opcode, value).map(Command::RemoteAmount),
            b'M' => Ok(Command::MotorSpeed(value)),
            b'P' => fixed_zero(opcode, value).map(|_| Command::SensorDebug),
            b'F' => fixed_zero(opcode, value).map(|_| Command::WheelTest),
            other => Err(ProtocolError::UnknownOpcode(other)),
        }
    }
}

fn decimal_digit(opcode: u8, value: u8) -> Result<u8, ProtocolError> {
    if value.is_ascii_digit() {
        Ok(value - b'0')
    } else {
        Err(ProtocolError::ValueOutOfRange { opcode, value })
    }
}

fn fixed_zero(opcode: u8, value: u8) -> Result<(), ProtocolError> {
    if value == b'0' {
        Ok(())
    } else {
        Err(ProtocolError::ValueOutOfRange { opcode, value })
    }
}

/// The single status byte returned for every acting command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// `0x30`: the command was accepted and executed.
    Success,
    /// `0x31`: the command was rejected or failed.
    Failure,
}

impl Response {
    /// Parse the status byte.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` for any byte other than `0x30`/`0x31`.
    pub const fn from_byte(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            0x30 => Ok(Response::Success),
            0x31 => Ok(Response::Failure),
            other => Err(ProtocolError::InvalidResponse(other)),
        }
    }

    /// The wire byte for this response.
    pub const fn to_byte(self) -> u8 {
        match self {
            Response::Success => 0x30,
            Response::Failure => 0x31,
        }
    }

    /// Whether the command succeeded.
    pub const fn is_success(self) -> bool {
        matches!(self, Response::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispense_is_decimal_coded() {
        assert_eq!(Command::Dispense(3).encode().unwrap(), *b"CD3E");
        assert_eq!(Command::decode(b"CD3E").unwrap(), Command::Dispense(3));
    }

    #[test]
    fn test_dispense_raw_carries_byte_value() {
        assert_eq!(Command::DispenseRaw(200).encode().unwrap(), [b'C', b'A', 200, b'E']);
        assert_eq!(
            Command::decode(&[b'C', b'A', 200, b'E']).unwrap(),
            Command::DispenseRaw(200)
        );
    }

    #[test]
    fn test_decimal_range_enforced() {
        assert_eq!(
            Command::Dispense(12).encode(),
            Err(ProtocolError::ValueOutOfRange { opcode: b'D', value: 12 })
        );
        assert!(matches!(
            Command::decode(&[b'C', b'B', b'x', b'E']),
            Err(ProtocolError::ValueOutOfRange { opcode: b'B', .. })
        ));
    }

    #[test]
    fn test_parameterless_commands() {
        assert_eq!(Command::SensorDebug.encode().unwrap(), *b"CP0E");
        assert_eq!(Command::WheelTest.encode().unwrap(), *b"CF0E");
        assert_eq!(Command::decode(b"CF0E").unwrap(), Command::WheelTest);
    }

    #[test]
    fn test_framing_rejected() {
        assert_eq!(Command::decode(b"D3E"), Err(ProtocolError::InvalidFraming));
        assert_eq!(Command::decode(b"XD3E"), Err(ProtocolError::InvalidFraming));
        assert_eq!(Command::decode(b"CD3X"), Err(ProtocolError::InvalidFraming));
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(
            Command::decode(b"CZ0E"),
            Err(ProtocolError::UnknownOpcode(b'Z'))
        );
    }

    #[test]
    fn test_response_bytes() {
        assert_eq!(Response::from_byte(0x30), Ok(Response::Success));
        assert_eq!(Response::from_byte(0x31), Ok(Response::Failure));
        assert_eq!(Response::from_byte(0x32), Err(ProtocolError::InvalidResponse(0x32)));
        assert!(Response::Success.is_success());
        assert_eq!(Response::Failure.to_byte(), 0x31);
    }
}
