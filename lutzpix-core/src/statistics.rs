//! Scan statistics.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counters collected during one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanStatistics {
    /// Rows scanned.
    pub rows_scanned: usize,
    /// Pixels read from the source.
    pub pixels_scanned: usize,
    /// Pixels that passed the significance test.
    pub significant_pixels: usize,
    /// Objects handed to the store and kept.
    pub objects_found: usize,
    /// Objects rejected by the size filter.
    pub objects_discarded: usize,
    /// Deepest open-object stack reached.
    pub peak_open_objects: usize,
}

impl ScanStatistics {
    /// Fraction of scanned pixels that were significant.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn significant_fraction(&self) -> f64 {
        if self.pixels_scanned == 0 {
            0.0
        } else {
            self.significant_pixels as f64 / self.pixels_scanned as f64
        }
    }
}
