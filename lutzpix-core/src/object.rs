//! Pixel objects extracted from an image.
#![allow(clippy::cast_precision_loss)]

use std::collections::HashSet;
use std::ops::Index;

use crate::error::{Error, Result};
use crate::pixel::{Pixel, PixelCoord};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inclusive pixel bounds of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// Smallest x coordinate.
    pub x_min: usize,
    /// Largest x coordinate.
    pub x_max: usize,
    /// Smallest y coordinate.
    pub y_min: usize,
    /// Largest y coordinate.
    pub y_max: usize,
}

impl BoundingBox {
    /// Creates a box covering a single coordinate.
    #[must_use]
    pub fn at(coord: PixelCoord) -> Self {
        Self {
            x_min: coord.x,
            x_max: coord.x,
            y_min: coord.y,
            y_max: coord.y,
        }
    }

    /// Grows the box to include `coord`.
    pub fn include(&mut self, coord: PixelCoord) {
        self.x_min = self.x_min.min(coord.x);
        self.x_max = self.x_max.max(coord.x);
        self.y_min = self.y_min.min(coord.y);
        self.y_max = self.y_max.max(coord.y);
    }

    /// Number of columns spanned.
    #[must_use]
    pub fn width(&self) -> usize {
        self.x_max - self.x_min + 1
    }

    /// Number of rows spanned.
    #[must_use]
    pub fn height(&self) -> usize {
        self.y_max - self.y_min + 1
    }

    /// Returns true if `coord` lies inside the box.
    #[must_use]
    pub fn contains(&self, coord: PixelCoord) -> bool {
        (self.x_min..=self.x_max).contains(&coord.x) && (self.y_min..=self.y_max).contains(&coord.y)
    }
}

/// Sub-pixel position of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Centroid {
    /// Centroid X coordinate.
    pub x: f64,
    /// Centroid Y coordinate.
    pub y: f64,
}

/// A group of pixels belonging to one detected object.
///
/// Pixels are unique by coordinate: pushing a pixel whose coordinate is
/// already present is a no-op. The bounding box, value extrema and value
/// sum are maintained incrementally on every insertion.
///
/// [`PixelObject::remove`] only adjusts the sum; bounds and extrema keep
/// whatever they held before the removal.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelObject {
    pixels: Vec<Pixel>,
    coords: HashSet<PixelCoord>,
    bounds: Option<BoundingBox>,
    min_value: f64,
    max_value: f64,
    sum: f64,
}

impl Default for PixelObject {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelObject {
    /// Creates an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixels: Vec::new(),
            coords: HashSet::new(),
            bounds: None,
            min_value: f64::INFINITY,
            max_value: f64::NEG_INFINITY,
            sum: 0.0,
        }
    }

    /// Creates an object from a pixel buffer, dropping duplicate coordinates.
    #[must_use]
    pub fn from_pixels(pixels: Vec<Pixel>) -> Self {
        let mut object = Self {
            pixels: Vec::with_capacity(pixels.len()),
            coords: HashSet::with_capacity(pixels.len()),
            ..Self::new()
        };
        object.extend(pixels);
        object
    }

    /// Adds a pixel. Returns false if its coordinate was already present.
    pub fn push(&mut self, pixel: Pixel) -> bool {
        if !self.coords.insert(pixel.coord) {
            return false;
        }

        match self.bounds.as_mut() {
            Some(bounds) => bounds.include(pixel.coord),
            None => self.bounds = Some(BoundingBox::at(pixel.coord)),
        }
        self.min_value = self.min_value.min(pixel.value);
        self.max_value = self.max_value.max(pixel.value);
        self.sum += pixel.value;
        self.pixels.push(pixel);
        true
    }

    /// Adds every pixel from `pixels`.
    pub fn extend<I: IntoIterator<Item = Pixel>>(&mut self, pixels: I) {
        for pixel in pixels {
            self.push(pixel);
        }
    }

    /// Adds every pixel of `other` that is not already present.
    pub fn merge(&mut self, other: &PixelObject) {
        self.extend(other.pixels.iter().copied());
    }

    /// Removes the pixel at `index`.
    ///
    /// The sum is updated; bounding box and extrema are not recomputed and
    /// may be stale afterwards.
    pub fn remove(&mut self, index: usize) -> Option<Pixel> {
        if index >= self.pixels.len() {
            return None;
        }
        let pixel = self.pixels.remove(index);
        self.coords.remove(&pixel.coord);
        self.sum -= pixel.value;
        Some(pixel)
    }

    /// Resets to the empty object.
    pub fn clear(&mut self) {
        self.pixels.clear();
        self.coords.clear();
        self.bounds = None;
        self.min_value = f64::INFINITY;
        self.max_value = f64::NEG_INFINITY;
        self.sum = 0.0;
    }

    /// Returns true if a pixel with the same coordinate is present.
    #[must_use]
    pub fn contains(&self, pixel: &Pixel) -> bool {
        self.contains_coord(pixel.coord)
    }

    /// Returns true if `coord` is a member.
    #[must_use]
    pub fn contains_coord(&self, coord: PixelCoord) -> bool {
        self.coords.contains(&coord)
    }

    /// Returns true if any pixel of `other` is also in this object.
    #[must_use]
    pub fn overlaps(&self, other: &PixelObject) -> bool {
        other.pixels.iter().any(|pixel| self.contains(pixel))
    }

    /// Computes the centroid of the object.
    ///
    /// Each pixel contributes with weight `scale * value` when `weighted`
    /// is set, `scale` otherwise. When the weights do not sum to a positive
    /// number the weighted request falls back to the unweighted centroid,
    /// and the unweighted one falls back to the plain coordinate mean.
    ///
    /// # Errors
    /// Returns [`Error::EmptyObject`] if the object has no pixels.
    pub fn centroid(&self, weighted: bool) -> Result<Centroid> {
        if self.pixels.is_empty() {
            return Err(Error::EmptyObject);
        }

        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_weight = 0.0;
        for pixel in &self.pixels {
            let mut weight = pixel.scale;
            if weighted {
                weight *= pixel.value;
            }
            sum_x += weight * pixel.x() as f64;
            sum_y += weight * pixel.y() as f64;
            sum_weight += weight;
        }

        if sum_weight > 0.0 {
            Ok(Centroid {
                x: sum_x / sum_weight,
                y: sum_y / sum_weight,
            })
        } else if weighted {
            self.centroid(false)
        } else {
            let n = self.pixels.len() as f64;
            Ok(Centroid {
                x: self.pixels.iter().map(|p| p.x() as f64).sum::<f64>() / n,
                y: self.pixels.iter().map(|p| p.y() as f64).sum::<f64>() / n,
            })
        }
    }

    /// Sorts pixels by ascending value. Equal values keep no particular order.
    pub fn sort_by_value(&mut self) {
        self.pixels.sort_unstable_by(Pixel::cmp_value);
    }

    /// Returns the number of pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Returns true if the object has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns the pixel at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Pixel> {
        self.pixels.get(index)
    }

    /// Returns an iterator over the pixels.
    pub fn iter(&self) -> std::slice::Iter<'_, Pixel> {
        self.pixels.iter()
    }

    /// Returns the pixels in insertion (or sorted) order.
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Returns the bounding box, or `None` for an empty object.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// Smallest column, or `None` when empty.
    #[must_use]
    pub fn x_min(&self) -> Option<usize> {
        self.bounds.map(|b| b.x_min)
    }

    /// Largest column, or `None` when empty.
    #[must_use]
    pub fn x_max(&self) -> Option<usize> {
        self.bounds.map(|b| b.x_max)
    }

    /// Smallest row, or `None` when empty.
    #[must_use]
    pub fn y_min(&self) -> Option<usize> {
        self.bounds.map(|b| b.y_min)
    }

    /// Largest row, or `None` when empty.
    #[must_use]
    pub fn y_max(&self) -> Option<usize> {
        self.bounds.map(|b| b.y_max)
    }

    /// Smallest pixel value (`+inf` when empty).
    #[must_use]
    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    /// Largest pixel value (`-inf` when empty).
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// Sum of all pixel values.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.sum
    }
}

impl Index<usize> for PixelObject {
    type Output = Pixel;

    fn index(&self, index: usize) -> &Pixel {
        &self.pixels[index]
    }
}

impl FromIterator<Pixel> for PixelObject {
    fn from_iter<I: IntoIterator<Item = Pixel>>(iter: I) -> Self {
        let mut object = Self::new();
        object.extend(iter);
        object
    }
}

impl<'a> IntoIterator for &'a PixelObject {
    type Item = &'a Pixel;
    type IntoIter = std::slice::Iter<'a, Pixel>;

    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_object() {
        let object = PixelObject::new();
        assert!(object.is_empty());
        assert_eq!(object.bounding_box(), None);
        assert_eq!(object.x_min(), None);
        assert_eq!(object.min_value(), f64::INFINITY);
        assert_eq!(object.max_value(), f64::NEG_INFINITY);
        assert_eq!(object.sum(), 0.0);
        assert_eq!(object.centroid(true), Err(Error::EmptyObject));
    }

    #[test]
    fn test_iter_is_reusable() {
        let object = PixelObject::from_pixels(vec![Pixel::new(3, 1, 1.0), Pixel::new(1, 2, 2.0)]);
        let xs = object.iter().map(Pixel::x);
        assert_eq!(xs.clone().min(), object.x_min());
        assert_eq!(xs.max(), object.x_max());
        assert_eq!(object.iter().len(), 2);
    }

    #[test]
    fn test_push_updates_bounds_and_sum() {
        let mut object = PixelObject::new();
        assert!(object.push(Pixel::new(4, 7, 2.0)));
        assert!(object.push(Pixel::new(2, 9, -1.5)));
        assert!(object.push(Pixel::new(6, 8, 10.0)));

        let bounds = object.bounding_box().unwrap();
        assert_eq!(bounds.x_min, 2);
        assert_eq!(bounds.x_max, 6);
        assert_eq!(bounds.y_min, 7);
        assert_eq!(bounds.y_max, 9);
        assert_eq!(bounds.width(), 5);
        assert_eq!(bounds.height(), 3);
        assert_eq!(object.min_value(), -1.5);
        assert_eq!(object.max_value(), 10.0);
        assert_relative_eq!(object.sum(), 10.5);
    }

    #[test]
    fn test_first_push_overrides_sentinels() {
        // Values far beyond any fixed sentinel still register.
        let mut object = PixelObject::new();
        object.push(Pixel::new(usize::MAX, usize::MAX, -1.0e300));
        assert_eq!(object.x_max(), Some(usize::MAX));
        assert_eq!(object.min_value(), -1.0e300);
        assert_eq!(object.max_value(), -1.0e300);
    }

    #[test]
    fn test_duplicate_coordinates_ignored() {
        let mut object = PixelObject::new();
        assert!(object.push(Pixel::new(1, 1, 5.0)));
        assert!(!object.push(Pixel::new(1, 1, 100.0)));
        assert_eq!(object.len(), 1);
        assert_eq!(object.sum(), 5.0);
        assert_eq!(object.max_value(), 5.0);

        let from_vec = PixelObject::from_pixels(vec![
            Pixel::new(0, 0, 1.0),
            Pixel::new(0, 0, 1.0),
            Pixel::new(1, 0, 1.0),
        ]);
        assert_eq!(from_vec.len(), 2);
    }

    #[test]
    fn test_contains_and_overlaps() {
        let a: PixelObject = [Pixel::new(0, 0, 1.0), Pixel::new(1, 0, 1.0)]
            .into_iter()
            .collect();
        let b: PixelObject = [Pixel::new(1, 0, 9.0), Pixel::new(2, 0, 1.0)]
            .into_iter()
            .collect();
        let c: PixelObject = [Pixel::new(5, 5, 1.0)].into_iter().collect();

        assert!(a.contains(&Pixel::new(1, 0, -3.0)));
        assert!(!a.contains_coord(PixelCoord::new(2, 0)));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_merge() {
        let mut a: PixelObject = [Pixel::new(0, 0, 1.0), Pixel::new(1, 0, 2.0)]
            .into_iter()
            .collect();
        let b: PixelObject = [Pixel::new(1, 0, 2.0), Pixel::new(1, 1, 4.0)]
            .into_iter()
            .collect();
        a.merge(&b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.sum(), 7.0);
        assert_eq!(a.y_max(), Some(1));
    }

    #[test]
    fn test_remove_keeps_stale_extrema() {
        let mut object = PixelObject::from_pixels(vec![
            Pixel::new(0, 0, 1.0),
            Pixel::new(5, 3, 8.0),
            Pixel::new(1, 1, 2.0),
        ]);

        let removed = object.remove(1).unwrap();
        assert_eq!(removed.coord, PixelCoord::new(5, 3));
        assert_eq!(object.len(), 2);
        assert_eq!(object.sum(), 3.0);
        assert!(!object.contains(&removed));

        // Bounds and extrema still describe the removed pixel.
        assert_eq!(object.x_max(), Some(5));
        assert_eq!(object.max_value(), 8.0);

        assert_eq!(object.remove(10), None);
    }

    #[test]
    fn test_clear() {
        let mut object = PixelObject::from_pixels(vec![Pixel::new(3, 3, 3.0)]);
        object.clear();
        assert!(object.is_empty());
        assert_eq!(object.bounding_box(), None);
        assert_eq!(object.sum(), 0.0);
        assert!(object.push(Pixel::new(3, 3, 1.0)));
        assert_eq!(object.max_value(), 1.0);
    }

    #[test]
    fn test_weighted_centroid() {
        let object = PixelObject::from_pixels(vec![Pixel::new(0, 0, 1.0), Pixel::new(2, 0, 3.0)]);

        let weighted = object.centroid(true).unwrap();
        assert_relative_eq!(weighted.x, 1.5);
        assert_relative_eq!(weighted.y, 0.0);

        let unweighted = object.centroid(false).unwrap();
        assert_relative_eq!(unweighted.x, 1.0);
        assert_relative_eq!(unweighted.y, 0.0);
    }

    #[test]
    fn test_centroid_respects_scale() {
        let object = PixelObject::from_pixels(vec![
            Pixel::new(0, 0, 1.0).with_scale(3.0),
            Pixel::new(4, 2, 1.0),
        ]);
        let c = object.centroid(false).unwrap();
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 0.5);
    }

    #[test]
    fn test_non_positive_values_fall_back_to_unweighted() {
        let object = PixelObject::from_pixels(vec![
            Pixel::new(10, 20, 0.0),
            Pixel::new(30, 40, -4.0),
        ]);

        let c = object.centroid(true).unwrap();
        assert!(!c.x.is_nan());
        assert!(!c.y.is_nan());
        assert_relative_eq!(c.x, 20.0);
        assert_relative_eq!(c.y, 30.0);
    }

    #[test]
    fn test_zero_scale_falls_back_to_mean() {
        let object = PixelObject::from_pixels(vec![
            Pixel::new(0, 0, 1.0).with_scale(0.0),
            Pixel::new(2, 2, 1.0).with_scale(0.0),
        ]);
        let c = object.centroid(true).unwrap();
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 1.0);
    }

    #[test]
    fn test_sort_by_value() {
        let mut object = PixelObject::from_pixels(vec![
            Pixel::new(0, 0, 3.0),
            Pixel::new(1, 0, -1.0),
            Pixel::new(2, 0, 2.0),
        ]);
        object.sort_by_value();
        let values: Vec<f64> = object.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![-1.0, 2.0, 3.0]);
        assert_eq!(object[0].coord, PixelCoord::new(1, 0));
        assert_eq!(object.get(3), None);
    }

    #[test]
    fn test_bounding_box_contains() {
        let bounds = BoundingBox {
            x_min: 2,
            x_max: 4,
            y_min: 1,
            y_max: 1,
        };
        assert!(bounds.contains(PixelCoord::new(3, 1)));
        assert!(!bounds.contains(PixelCoord::new(3, 2)));
        assert!(!bounds.contains(PixelCoord::new(5, 1)));
    }
}
