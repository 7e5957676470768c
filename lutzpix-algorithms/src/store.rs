//! Storage for completed objects.

use std::ops::Index;

use lutzpix_core::{Pixel, PixelObject, ScanConfig};

/// Size policy applied to every completed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeFilter {
    /// Minimum number of pixels.
    pub min_pixels: usize,
    /// Maximum number of pixels, if any.
    pub max_pixels: Option<usize>,
}

impl Default for SizeFilter {
    fn default() -> Self {
        Self {
            min_pixels: 1,
            max_pixels: None,
        }
    }
}

impl SizeFilter {
    /// Creates a filter.
    #[must_use]
    pub fn new(min_pixels: usize, max_pixels: Option<usize>) -> Self {
        Self {
            min_pixels,
            max_pixels,
        }
    }

    /// Returns true if an object of `n_pixels` should be kept.
    /// Empty objects are never kept.
    #[must_use]
    pub fn accepts(&self, n_pixels: usize) -> bool {
        n_pixels > 0
            && n_pixels >= self.min_pixels
            && self.max_pixels.map_or(true, |max| n_pixels <= max)
    }
}

impl From<&ScanConfig> for SizeFilter {
    fn from(config: &ScanConfig) -> Self {
        Self::new(config.min_pixels, config.max_pixels)
    }
}

/// Completed objects in the order the scanner closed them.
///
/// Objects are offered as raw pixel buffers; buffers rejected by the
/// [`SizeFilter`] are dropped and only counted.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: Vec<PixelObject>,
    filter: SizeFilter,
    discarded: usize,
}

impl ObjectStore {
    /// Creates an empty store with the given size policy.
    #[must_use]
    pub fn new(filter: SizeFilter) -> Self {
        Self {
            objects: Vec::new(),
            filter,
            discarded: 0,
        }
    }

    /// Creates an empty store using the size limits from `config`.
    #[must_use]
    pub fn with_config(config: &ScanConfig) -> Self {
        Self::new(SizeFilter::from(config))
    }

    /// Offers a finished pixel buffer. Returns true if it was kept.
    pub fn offer(&mut self, pixels: Vec<Pixel>) -> bool {
        if self.filter.accepts(pixels.len()) {
            self.objects.push(PixelObject::from_pixels(pixels));
            true
        } else {
            self.discarded += 1;
            false
        }
    }

    /// Appends an object without applying the size filter.
    pub fn push(&mut self, object: PixelObject) {
        self.objects.push(object);
    }

    /// Returns the number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if no object is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns the object at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PixelObject> {
        self.objects.get(index)
    }

    /// Returns an iterator over the objects.
    pub fn iter(&self) -> std::slice::Iter<'_, PixelObject> {
        self.objects.iter()
    }

    /// Returns the objects as a slice.
    #[must_use]
    pub fn objects(&self) -> &[PixelObject] {
        &self.objects
    }

    /// Consumes the store and returns the objects.
    #[must_use]
    pub fn into_vec(self) -> Vec<PixelObject> {
        self.objects
    }

    /// Number of buffers rejected by the size filter.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Returns the size policy.
    #[must_use]
    pub fn filter(&self) -> SizeFilter {
        self.filter
    }

    /// Removes all objects and resets the discard counter.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.discarded = 0;
    }
}

impl Index<usize> for ObjectStore {
    type Output = PixelObject;

    fn index(&self, index: usize) -> &PixelObject {
        &self.objects[index]
    }
}

impl IntoIterator for ObjectStore {
    type Item = PixelObject;
    type IntoIter = std::vec::IntoIter<PixelObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}

impl<'a> IntoIterator for &'a ObjectStore {
    type Item = &'a PixelObject;
    type IntoIter = std::slice::Iter<'a, PixelObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}
