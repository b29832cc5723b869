//! Configuration loading from files.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use treat_dispenser::load_config;
///
/// let config = load_config("dispenser.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    // Validate the configuration
    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfirmPolicy;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[dispensers.lab]
name = "Lab Dispenser"
"#;

        let config = parse_config(toml).unwrap();
        let dispenser = config.dispenser("lab").unwrap();
        assert_eq!(dispenser.name.as_str(), "Lab Dispenser");
        assert_eq!(dispenser.capacity, 59);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[dispensers.lab]
name = "Lab Dispenser"
capacity = 30
timeout_ms = 2000
steps_per_treat = 54
pulse_half_period_ms = 5
debounce_ms = 50
confirm_policy = "beam-only"
revision = "production"
"#;

        let config = parse_config(toml).unwrap();
        let dispenser = config.dispenser("lab").unwrap();
        assert_eq!(dispenser.capacity, 30);
        assert_eq!(dispenser.steps_per_treat.value(), 54);
        assert_eq!(dispenser.confirm_policy, ConfirmPolicy::BeamOnly);
        assert_eq!(dispenser.pin_map().step, 12);
    }

    #[test]
    fn test_parse_rejects_invalid_capacity() {
        let toml = r#"
[dispensers.lab]
name = "Lab Dispenser"
capacity = 0
"#;

        assert!(parse_config(toml).is_err());
    }

    #[test]
    fn test_unknown_dispenser_lookup() {
        let toml = r#"
[dispensers.lab]
name = "Lab Dispenser"
"#;

        let config = parse_config(toml).unwrap();
        assert!(config.dispenser("bench").is_none());
    }
}
