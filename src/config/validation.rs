//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Valid pulse half-period range in milliseconds (revision-dependent
/// hardware bound).
const PULSE_HALF_PERIOD_MS: core::ops::RangeInclusive<u64> = 5..=100;

/// Maximum treats the jogger physically holds.
const MAX_CAPACITY: u16 = 59;

/// Validate a system configuration.
///
/// Checks:
/// - Capacity is within the jogger's physical range
/// - Step budget is non-zero
/// - Pulse half-period is within the hardware range
/// - Timeout is non-zero
/// - Debounce window is shorter than the timeout (a longer window would
///   swallow the confirmation of every back-to-back dispense)
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (name, dispenser) in config.dispensers.iter() {
        validate_dispenser(name.as_str(), dispenser)?;
    }

    Ok(())
}

fn validate_dispenser(_name: &str, config: &super::DispenserConfig) -> Result<()> {
    if config.capacity == 0 || config.capacity > MAX_CAPACITY {
        return Err(Error::Config(ConfigError::InvalidCapacity(config.capacity)));
    }

    if config.steps_per_treat.value() == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerTreat(
            config.steps_per_treat.value(),
        )));
    }

    if !PULSE_HALF_PERIOD_MS.contains(&config.pulse_half_period.value()) {
        return Err(Error::Config(ConfigError::InvalidPulseHalfPeriod(
            config.pulse_half_period.value(),
        )));
    }

    if config.timeout.value() == 0 {
        return Err(Error::Config(ConfigError::InvalidTimeout(
            config.timeout.value(),
        )));
    }

    if config.debounce.value() >= config.timeout.value() {
        return Err(Error::Config(ConfigError::InvalidDebounce {
            debounce: config.debounce.value(),
            timeout: config.timeout.value(),
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Millis, Pulses};
    use crate::config::{ConfirmPolicy, DispenserConfig};

    fn make_test_config() -> DispenserConfig {
        DispenserConfig {
            name: heapless::String::try_from("test").unwrap(),
            capacity: 59,
            timeout: Millis(3_000),
            steps_per_treat: Pulses(53),
            pulse_half_period: Millis(100),
            debounce: Millis(100),
            confirm_policy: ConfirmPolicy::FullRotation,
            invert_direction: false,
            revision: None,
            pins: None,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let config = make_test_config();
        assert!(validate_dispenser("test", &config).is_ok());
    }

    #[test]
    fn test_invalid_capacity() {
        let mut config = make_test_config();
        config.capacity = 0;
        assert!(matches!(
            validate_dispenser("test", &config),
            Err(Error::Config(ConfigError::InvalidCapacity(0)))
        ));

        config.capacity = 60; // Exceeds the jogger
        assert!(matches!(
            validate_dispenser("test", &config),
            Err(Error::Config(ConfigError::InvalidCapacity(60)))
        ));
    }

    #[test]
    fn test_invalid_steps_per_treat() {
        let mut config = make_test_config();
        config.steps_per_treat = Pulses(0);
        assert!(matches!(
            validate_dispenser("test", &config),
            Err(Error::Config(ConfigError::InvalidStepsPerTreat(0)))
        ));
    }

    #[test]
    fn test_invalid_pulse_half_period() {
        let mut config = make_test_config();
        config.pulse_half_period = Millis(4);
        assert!(matches!(
            validate_dispenser("test", &config),
            Err(Error::Config(ConfigError::InvalidPulseHalfPeriod(4)))
        ));

        config.pulse_half_period = Millis(200);
        assert!(validate_dispenser("test", &config).is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = make_test_config();
        config.timeout = Millis(0);
        assert!(matches!(
            validate_dispenser("test", &config),
            Err(Error::Config(ConfigError::InvalidTimeout(0)))
        ));
    }

    #[test]
    fn test_debounce_must_undercut_timeout() {
        let mut config = make_test_config();
        config.debounce = Millis(3_000);
        assert!(matches!(
            validate_dispenser("test", &config),
            Err(Error::Config(ConfigError::InvalidDebounce { .. }))
        ));
    }
}
