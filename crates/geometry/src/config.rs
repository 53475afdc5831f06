//! Session tunables

use crate::{GeometryError, GeometryResult};
use std::time::Duration;

/// Overlay configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipConfig {
    /// Floor for the unscaled axis, in pixels
    pub min_size: i32,
    /// Height of the hover chrome strip
    pub chrome_height: i32,
    /// Share of the primary display the initial overlay may cover, per axis
    pub default_size_percentage: f64,
    /// Initial (left, top) of the overlay in screen coordinates
    pub initial_position: (i32, i32),
    /// How long a pointer leave waits before re-sampling the cursor
    pub hover_settle: Duration,
    /// Thumbnail opacity, 0..=255
    pub opacity: u8,
}

impl PipConfig {
    pub const MIN_SIZE: i32 = 100;
    pub const CHROME_HEIGHT: i32 = 30;
    pub const DEFAULT_SIZE_PERCENTAGE: f64 = 0.25;
    pub const INITIAL_POSITION: (i32, i32) = (200, 200);
    pub const HOVER_SETTLE: Duration = Duration::from_millis(50);

    pub fn validate(&self) -> GeometryResult<()> {
        if self.min_size <= 0 {
            return Err(GeometryError::InvalidConfig(format!(
                "min_size must be positive, got {}",
                self.min_size
            )));
        }
        if self.chrome_height < 0 {
            return Err(GeometryError::InvalidConfig(format!(
                "chrome_height must not be negative, got {}",
                self.chrome_height
            )));
        }
        if !(self.default_size_percentage > 0.0 && self.default_size_percentage <= 1.0) {
            return Err(GeometryError::InvalidConfig(format!(
                "default_size_percentage must be in (0, 1], got {}",
                self.default_size_percentage
            )));
        }
        Ok(())
    }
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            min_size: Self::MIN_SIZE,
            chrome_height: Self::CHROME_HEIGHT,
            default_size_percentage: Self::DEFAULT_SIZE_PERCENTAGE,
            initial_position: Self::INITIAL_POSITION,
            hover_settle: Self::HOVER_SETTLE,
            opacity: u8::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(PipConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_percentage() {
        let config = PipConfig {
            default_size_percentage: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(GeometryError::InvalidConfig(_))));

        let config = PipConfig {
            default_size_percentage: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_min_size() {
        let config = PipConfig {
            min_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
