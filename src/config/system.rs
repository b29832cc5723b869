//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::dispenser::DispenserConfig;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Named dispenser configurations.
    pub dispensers: FnvIndexMap<String<32>, DispenserConfig, 4>,
}

impl SystemConfig {
    /// Get a dispenser configuration by name.
    pub fn dispenser(&self, name: &str) -> Option<&DispenserConfig> {
        self.dispensers
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// List all dispenser names.
    pub fn dispenser_names(&self) -> impl Iterator<Item = &str> {
        self.dispensers.keys().map(|s| s.as_str())
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            dispensers: FnvIndexMap::new(),
        }
    }
}
