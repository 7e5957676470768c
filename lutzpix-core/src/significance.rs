//! Pixel significance predicates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decides whether a pixel value belongs to an object.
pub trait Significance: Send + Sync {
    /// Returns true if `value` is significant.
    fn is_significant(&self, value: f64) -> bool;
}

/// Strict lower threshold: a value is significant when `value > level`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Threshold {
    /// Threshold level.
    pub level: f64,
}

impl Threshold {
    /// Creates a threshold at `level`.
    #[must_use]
    pub fn new(level: f64) -> Self {
        Self { level }
    }
}

impl Significance for Threshold {
    #[inline]
    fn is_significant(&self, value: f64) -> bool {
        value > self.level
    }
}

impl<F> Significance for F
where
    F: Fn(f64) -> bool + Send + Sync,
{
    #[inline]
    fn is_significant(&self, value: f64) -> bool {
        self(value)
    }
}
