//! Pixel types for scalar images.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pixel coordinate in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelCoord {
    /// X coordinate (column).
    pub x: usize,
    /// Y coordinate (row).
    pub y: usize,
}

impl PixelCoord {
    /// Creates a new pixel coordinate.
    #[inline]
    #[must_use]
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Checks if this coordinate is adjacent to another (8-connectivity).
    #[inline]
    #[must_use]
    pub fn is_adjacent(&self, other: &Self) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx <= 1 && dy <= 1 && (dx != 0 || dy != 0)
    }
}

/// A single image sample together with its position.
///
/// `scale` multiplies the pixel's contribution to a centroid and defaults
/// to 1.0. Two pixels describe the same image location when their
/// coordinates match, regardless of value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pixel {
    /// Pixel coordinate.
    pub coord: PixelCoord,
    /// Sample value.
    pub value: f64,
    /// Centroid weight.
    pub scale: f64,
}

impl Pixel {
    /// Creates a new pixel with unit scale.
    #[inline]
    #[must_use]
    pub fn new(x: usize, y: usize, value: f64) -> Self {
        Self {
            coord: PixelCoord::new(x, y),
            value,
            scale: 1.0,
        }
    }

    /// Returns a copy of this pixel with a different centroid weight.
    #[inline]
    #[must_use]
    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    /// Returns the x coordinate.
    #[inline]
    #[must_use]
    pub fn x(&self) -> usize {
        self.coord.x
    }

    /// Returns the y coordinate.
    #[inline]
    #[must_use]
    pub fn y(&self) -> usize {
        self.coord.y
    }

    /// Returns true if both pixels sit at the same coordinate.
    #[inline]
    #[must_use]
    pub fn same_position(&self, other: &Self) -> bool {
        self.coord == other.coord
    }

    /// Orders two pixels by value.
    #[inline]
    #[must_use]
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}
