//! Unit types for physical quantities.
//!
//! Provides type-safe representations of step-pulse counts and millisecond
//! durations to prevent unit confusion at compile time.

use core::ops::{Add, Sub};
use core::time::Duration;

use serde::Deserialize;

/// A count of step pulses.
///
/// One dispensation unit corresponds to a fixed number of pulses (one wheel
/// compartment, 53-54 pulses depending on hardware revision).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct Pulses(pub u16);

impl Pulses {
    /// Create a new Pulses value.
    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl Add for Pulses {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Pulses {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

/// A duration in whole milliseconds.
///
/// Used for configuration fields (`*_ms` keys in TOML) and converted to
/// [`Duration`] at the hardware boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    /// Create a new Millis value.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Convert to a [`Duration`].
    #[inline]
    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Convert to whole microseconds, saturating at `u32::MAX`.
    ///
    /// Step-pulse delays go through `DelayNs::delay_us`, which takes `u32`.
    #[inline]
    pub fn as_micros_u32(self) -> u32 {
        self.0.saturating_mul(1_000).min(u32::MAX as u64) as u32
    }
}

impl Add for Millis {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Millis {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_as_duration() {
        assert_eq!(Millis(3000).as_duration(), Duration::from_secs(3));
        assert_eq!(Millis(0).as_duration(), Duration::ZERO);
    }

    #[test]
    fn test_millis_as_micros() {
        assert_eq!(Millis(100).as_micros_u32(), 100_000);
        // Saturates instead of overflowing u32
        assert_eq!(Millis(u64::MAX).as_micros_u32(), u32::MAX);
    }

    #[test]
    fn test_pulses_arithmetic() {
        assert_eq!(Pulses(53) + Pulses(1), Pulses(54));
        assert_eq!(Pulses(1) - Pulses(53), Pulses(0));
    }
}
