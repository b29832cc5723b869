//! Stepper motor driver.
//!
//! Generic over embedded-hal 1.0 pin types. Stateless beyond the cached
//! direction level; all dispensation logic lives above it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{MotorError, Result};

use super::Direction;

/// Stepper motor driver.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider (must implement `DelayNs`)
pub struct StepMotor<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// STEP pin (pulse to advance the wheel one step).
    step_pin: STEP,

    /// DIR pin (low = forward, high = reverse, or inverted).
    dir_pin: DIR,

    /// Delay provider for pulse timing.
    delay: DELAY,

    /// Half-period of the step pulse in microseconds.
    pulse_half_period_us: u32,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,
}

impl<STEP, DIR, DELAY> StepMotor<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Create a new motor driver.
    pub fn new(
        step_pin: STEP,
        dir_pin: DIR,
        delay: DELAY,
        pulse_half_period_us: u32,
        invert_direction: bool,
    ) -> Self {
        Self {
            step_pin,
            dir_pin,
            delay,
            pulse_half_period_us,
            current_direction: None,
            invert_direction,
        }
    }

    /// Issue one step pulse: drive the step line high, hold one
    /// half-period, drive it low, hold again.
    pub fn step(&mut self) -> Result<()> {
        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(self.pulse_half_period_us);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(self.pulse_half_period_us);
        Ok(())
    }

    /// Idle one half-period without touching the step line.
    ///
    /// Keeps the loop cadence (and with it the cancellation latency) at
    /// pulse rate when the step budget is exhausted but the attempt is
    /// still waiting on the beam.
    pub fn hold(&mut self) {
        self.delay.delay_us(self.pulse_half_period_us);
    }

    /// Set the rotation direction.
    ///
    /// The pin is only written when the direction actually changes.
    pub fn set_direction(&mut self, direction: Direction) -> Result<()> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Forward => self.invert_direction,
            Direction::Reverse => !self.invert_direction,
        };

        if pin_high {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }

        self.current_direction = Some(direction);
        Ok(())
    }

    /// Get the current direction, if one has been set.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.current_direction
    }

    /// Get the pulse half-period in microseconds.
    #[inline]
    pub fn pulse_half_period_us(&self) -> u32 {
        self.pulse_half_period_us
    }

    /// Release the pins and delay provider.
    pub fn into_parts(self) -> (STEP, DIR, DELAY) {
        (self.step_pin, self.dir_pin, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[test]
    fn test_step_pulses_high_then_low() {
        let step = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let dir = PinMock::new(&[]);

        let mut motor = StepMotor::new(step, dir, NoopDelay::new(), 100_000, false);
        motor.step().unwrap();

        let (mut step, mut dir, _) = motor.into_parts();
        step.done();
        dir.done();
    }

    #[test]
    fn test_direction_forward_drives_line_low() {
        let step = PinMock::new(&[]);
        let dir = PinMock::new(&[PinTransaction::set(PinState::Low)]);

        let mut motor = StepMotor::new(step, dir, NoopDelay::new(), 100_000, false);
        motor.set_direction(Direction::Forward).unwrap();
        // Second call is a no-op: direction is cached
        motor.set_direction(Direction::Forward).unwrap();
        assert_eq!(motor.direction(), Some(Direction::Forward));

        let (mut step, mut dir, _) = motor.into_parts();
        step.done();
        dir.done();
    }

    #[test]
    fn test_inverted_direction_flips_levels() {
        let step = PinMock::new(&[]);
        let dir = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);

        let mut motor = StepMotor::new(step, dir, NoopDelay::new(), 100_000, true);
        motor.set_direction(Direction::Forward).unwrap();
        motor.set_direction(Direction::Reverse).unwrap();

        let (mut step, mut dir, _) = motor.into_parts();
        step.done();
        dir.done();
    }
}
