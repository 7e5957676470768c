//! Image sources the scanner reads from.

use crate::error::{Error, Result};

/// Read access to a row-major scalar image.
///
/// Implementors report their dimensions and return the sample at a
/// coordinate, failing with [`Error::OutOfRange`] outside the image.
pub trait PixelSource {
    /// Number of columns.
    fn width(&self) -> usize;

    /// Number of rows.
    fn height(&self) -> usize;

    /// Returns the sample at `(x, y)`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfRange`] if the coordinate is outside the image.
    fn value_at(&self, x: usize, y: usize) -> Result<f64>;

    /// Returns true if the image has no pixels.
    #[inline]
    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Checks that `(x, y)` lies inside the image.
    ///
    /// # Errors
    /// Returns [`Error::OutOfRange`] if it does not.
    #[inline]
    fn check_bounds(&self, x: usize, y: usize) -> Result<()> {
        if x < self.width() && y < self.height() {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                x,
                y,
                width: self.width(),
                height: self.height(),
            })
        }
    }
}

impl<S: PixelSource + ?Sized> PixelSource for &S {
    #[inline]
    fn width(&self) -> usize {
        (**self).width()
    }

    #[inline]
    fn height(&self) -> usize {
        (**self).height()
    }

    #[inline]
    fn value_at(&self, x: usize, y: usize) -> Result<f64> {
        (**self).value_at(x, y)
    }
}

fn pixel_count(width: usize, height: usize) -> usize {
    width
        .checked_mul(height)
        .unwrap_or_else(|| panic!("image size {width}x{height} overflows usize"))
}

/// An owned row-major image of `f64` samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridImage {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl GridImage {
    /// Wraps a row-major sample buffer.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if `data.len() != width * height`.
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(Error::DimensionMismatch {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates an image filled with `value`.
    ///
    /// # Panics
    /// Panics if `width * height` overflows `usize`.
    #[must_use]
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            data: vec![value; pixel_count(width, height)],
        }
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel.
    ///
    /// # Panics
    /// Panics if `width * height` overflows `usize`.
    pub fn from_fn<F: FnMut(usize, usize) -> f64>(width: usize, height: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(pixel_count(width, height));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Overwrites the sample at `(x, y)`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfRange`] if the coordinate is outside the image.
    pub fn set(&mut self, x: usize, y: usize, value: f64) -> Result<()> {
        self.check_bounds(x, y)?;
        self.data[y * self.width + x] = value;
        Ok(())
    }

    /// Returns one row of samples.
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&[f64]> {
        (y < self.height).then(|| &self.data[y * self.width..(y + 1) * self.width])
    }

    /// Returns the raw row-major samples.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl PixelSource for GridImage {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn value_at(&self, x: usize, y: usize) -> Result<f64> {
        self.check_bounds(x, y)?;
        Ok(self.data[y * self.width + x])
    }
}

/// Rows of the array are image rows (`array[[y, x]]`).
#[cfg(feature = "ndarray")]
impl PixelSource for ndarray::Array2<f64> {
    #[inline]
    fn width(&self) -> usize {
        self.ncols()
    }

    #[inline]
    fn height(&self) -> usize {
        self.nrows()
    }

    #[inline]
    fn value_at(&self, x: usize, y: usize) -> Result<f64> {
        self.get((y, x)).copied().ok_or(Error::OutOfRange {
            x,
            y,
            width: self.ncols(),
            height: self.nrows(),
        })
    }
}
