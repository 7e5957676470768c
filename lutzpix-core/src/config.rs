//! Scan configuration.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a one-pass object scan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanConfig {
    /// Pixels with values strictly above this level are significant.
    pub threshold: f64,
    /// Minimum number of pixels for an object to be kept.
    pub min_pixels: usize,
    /// Maximum number of pixels in an object (for filtering large artifacts).
    pub max_pixels: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            min_pixels: 1,
            max_pixels: None,
        }
    }
}

impl ScanConfig {
    /// Creates a new scan configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the significance threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the minimum object size.
    #[must_use]
    pub fn with_min_pixels(mut self, min_pixels: usize) -> Self {
        self.min_pixels = min_pixels;
        self
    }

    /// Sets the maximum object size.
    #[must_use]
    pub fn with_max_pixels(mut self, max_pixels: usize) -> Self {
        self.max_pixels = Some(max_pixels);
        self
    }

    /// Checks the configuration for contradictions.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] for a NaN threshold or a maximum size
    /// below the minimum size.
    pub fn validate(&self) -> Result<()> {
        if self.threshold.is_nan() {
            return Err(Error::ConfigError("threshold is NaN".to_string()));
        }
        if let Some(max) = self.max_pixels {
            if max < self.min_pixels {
                return Err(Error::ConfigError(format!(
                    "max_pixels ({max}) is below min_pixels ({})",
                    self.min_pixels
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_config_builder() {
        let config = ScanConfig::new()
            .with_threshold(2.5)
            .with_min_pixels(3)
            .with_max_pixels(100);

        assert!((config.threshold - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.min_pixels, 3);
        assert_eq!(config.max_pixels, Some(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scan_config_defaults() {
        let config = ScanConfig::default();
        assert!(config.threshold.abs() < f64::EPSILON);
        assert_eq!(config.min_pixels, 1);
        assert_eq!(config.max_pixels, None);
    }

    #[test]
    fn test_validate_rejects_nan_threshold() {
        let config = ScanConfig::new().with_threshold(f64::NAN);
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_size_range() {
        let config = ScanConfig::new().with_min_pixels(10).with_max_pixels(5);
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }
}
