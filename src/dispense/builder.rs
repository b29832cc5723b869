//! Builder pattern for Dispenser sessions.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::{Millis, Pulses};
use crate::config::{
    ConfirmPolicy, DispenserConfig, SystemConfig, DEFAULT_CAPACITY, DEFAULT_DEBOUNCE_MS,
    DEFAULT_PULSE_HALF_PERIOD_MS, DEFAULT_STEPS_PER_TREAT, DEFAULT_TIMEOUT_MS,
};
use crate::error::{ConfigError, Error, Result, SensorError};
use crate::motor::{Direction, StepMotor};
use crate::sensor::{BeamSensor, DeliveryHandle};

use super::session::Dispenser;

/// Builder for creating [`Dispenser`] sessions.
pub struct DispenserBuilder<STEP, DIR, DELAY, BEAM>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    BEAM: BeamSensor,
{
    step_pin: Option<STEP>,
    dir_pin: Option<DIR>,
    delay: Option<DELAY>,
    beam: Option<BEAM>,
    name: Option<heapless::String<32>>,
    capacity: Option<u16>,
    timeout: Option<Millis>,
    steps_per_treat: Option<Pulses>,
    pulse_half_period: Option<Millis>,
    debounce: Option<Millis>,
    confirm_policy: ConfirmPolicy,
    invert_direction: bool,
}

impl<STEP, DIR, DELAY, BEAM> Default for DispenserBuilder<STEP, DIR, DELAY, BEAM>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    BEAM: BeamSensor,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<STEP, DIR, DELAY, BEAM> DispenserBuilder<STEP, DIR, DELAY, BEAM>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    BEAM: BeamSensor,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            delay: None,
            beam: None,
            name: None,
            capacity: None,
            timeout: None,
            steps_per_treat: None,
            pulse_half_period: None,
            debounce: None,
            confirm_policy: ConfirmPolicy::default(),
            invert_direction: false,
        }
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: STEP) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: DELAY) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the break-beam sensor.
    pub fn beam(mut self, beam: BEAM) -> Self {
        self.beam = Some(beam);
        self
    }

    /// Set the dispenser name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Set the number of treats loaded for this session.
    pub fn capacity(mut self, treats: u16) -> Self {
        self.capacity = Some(treats);
        self
    }

    /// Set the per-treat jam timeout.
    pub fn timeout(mut self, timeout: Millis) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the step budget for one dispensation unit.
    pub fn steps_per_treat(mut self, steps: Pulses) -> Self {
        self.steps_per_treat = Some(steps);
        self
    }

    /// Set the step-pulse half-period.
    pub fn pulse_half_period(mut self, half_period: Millis) -> Self {
        self.pulse_half_period = Some(half_period);
        self
    }

    /// Set the break-beam debounce window.
    pub fn debounce(mut self, debounce: Millis) -> Self {
        self.debounce = Some(debounce);
        self
    }

    /// Set the policy for a completed rotation without beam confirmation.
    pub fn confirm_policy(mut self, policy: ConfirmPolicy) -> Self {
        self.confirm_policy = policy;
        self
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Configure from a DispenserConfig.
    pub fn from_dispenser_config(mut self, config: &DispenserConfig) -> Self {
        self.name = Some(config.name.clone());
        self.capacity = Some(config.capacity);
        self.timeout = Some(config.timeout);
        self.steps_per_treat = Some(config.steps_per_treat);
        self.pulse_half_period = Some(config.pulse_half_period);
        self.debounce = Some(config.debounce);
        self.confirm_policy = config.confirm_policy;
        self.invert_direction = config.invert_direction;
        self
    }

    /// Configure from SystemConfig by dispenser name.
    pub fn from_config(self, config: &SystemConfig, dispenser_name: &str) -> Result<Self> {
        let dispenser_config = config.dispenser(dispenser_name).ok_or_else(|| {
            Error::Config(ConfigError::DispenserNotFound(
                heapless::String::try_from(dispenser_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.from_dispenser_config(dispenser_config))
    }

    /// Build the Dispenser session.
    ///
    /// Registers the break-beam callback and drives the direction line
    /// forward. Registration failure is fatal: the session is not created.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing, the sensor
    /// registration fails, or the direction pin cannot be driven.
    pub fn build(self) -> Result<Dispenser<STEP, DIR, DELAY, BEAM>> {
        let step_pin = self.step_pin.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("step_pin is required").unwrap(),
            ))
        })?;

        let dir_pin = self.dir_pin.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("dir_pin is required").unwrap(),
            ))
        })?;

        let delay = self.delay.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("delay is required").unwrap(),
            ))
        })?;

        let mut beam = self.beam.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("beam is required").unwrap(),
            ))
        })?;

        let name = self
            .name
            .unwrap_or_else(|| heapless::String::try_from("dispenser").unwrap());

        let capacity = self.capacity.unwrap_or(DEFAULT_CAPACITY);
        let timeout = self.timeout.unwrap_or(Millis(DEFAULT_TIMEOUT_MS));
        let steps_per_treat = self
            .steps_per_treat
            .unwrap_or(Pulses(DEFAULT_STEPS_PER_TREAT));
        let pulse_half_period = self
            .pulse_half_period
            .unwrap_or(Millis(DEFAULT_PULSE_HALF_PERIOD_MS));
        let debounce = self.debounce.unwrap_or(Millis(DEFAULT_DEBOUNCE_MS));

        let deliveries = DeliveryHandle::new(debounce.as_duration());
        beam.watch(deliveries.clone())
            .map_err(|_| Error::Sensor(SensorError::RegistrationFailed))?;

        let mut motor = StepMotor::new(
            step_pin,
            dir_pin,
            delay,
            pulse_half_period.as_micros_u32(),
            self.invert_direction,
        );
        // The wheel only dispenses forward; the line is held for the
        // session's lifetime
        if let Err(e) = motor.set_direction(Direction::Forward) {
            let _ = beam.unwatch();
            return Err(e);
        }

        Ok(Dispenser::from_parts(
            motor,
            beam,
            deliveries,
            name,
            capacity,
            timeout.as_duration(),
            steps_per_treat,
            self.confirm_policy,
        ))
    }
}
