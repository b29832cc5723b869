//! Pin-map configuration for dispenser hardware revisions.
//!
//! The breadboard and production driver HATs wire the same three logical
//! lines (step, direction, break beam) to different BCM pins; the
//! production board adds driver housekeeping outputs. Revisions are data,
//! not code paths: callers pick a preset (or spell out pins) and construct
//! their platform HAL pins from it.

use serde::Deserialize;

/// Driver HAT revision selecting a pin-map preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareRevision {
    /// Breadboard prototype HAT.
    Breadboard,
    /// Production HAT with driver housekeeping lines.
    Production,
}

impl HardwareRevision {
    /// The preset pin map for this revision.
    pub const fn pin_map(self) -> PinMap {
        match self {
            HardwareRevision::Breadboard => PinMap::breadboard(),
            HardwareRevision::Production => PinMap::production(),
        }
    }
}

/// BCM pin assignments for one dispenser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PinMap {
    /// Step-pulse output.
    pub step: u8,

    /// Direction output (held forward for the device's lifetime).
    pub dir: u8,

    /// Break-beam input with edge-interrupt capability.
    pub beam: u8,

    /// Driver enable output (production HAT only).
    #[serde(default)]
    pub enable: Option<u8>,

    /// Driver reset output (production HAT only).
    #[serde(default)]
    pub reset: Option<u8>,

    /// Driver sleep output (production HAT only).
    #[serde(default)]
    pub sleep: Option<u8>,
}

impl PinMap {
    /// Breadboard prototype wiring.
    pub const fn breadboard() -> Self {
        Self {
            step: 23,
            dir: 22,
            beam: 18,
            enable: None,
            reset: None,
            sleep: None,
        }
    }

    /// Production HAT wiring.
    pub const fn production() -> Self {
        Self {
            step: 12,
            dir: 16,
            beam: 20,
            enable: Some(25),
            reset: Some(8),
            sleep: Some(7),
        }
    }

    /// Whether this map carries driver housekeeping lines.
    pub const fn has_housekeeping(&self) -> bool {
        self.enable.is_some()
    }
}
