//! Memory-mapped file readers.
//!

use crate::{Error, Result};
use log::{debug, warn};
use lutzpix_core::{GridImage, PixelSource};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to efficiently access file contents without
/// loading the entire file into memory.
pub struct MappedFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Returns the path the file was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Encoding of one sample in a raw image file (little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleType {
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    #[default]
    F64,
}

impl SampleType {
    /// Size of one sample in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Decodes one sample. `bytes` must hold exactly [`size`](Self::size) bytes.
    #[inline]
    fn decode(self, bytes: &[u8]) -> f64 {
        match self {
            Self::U8 => f64::from(bytes[0]),
            Self::U16 => f64::from(u16::from_le_bytes([bytes[0], bytes[1]])),
            Self::F32 => f64::from(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            Self::F64 => f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
        }
    }
}

/// A headerless row-major image file with memory-mapped I/O.
///
/// The file holds exactly `width * height` samples of one [`SampleType`].
pub struct RawImageReader {
    reader: MappedFileReader,
    width: usize,
    height: usize,
    sample: SampleType,
}

impl RawImageReader {
    /// Opens a raw image file and checks its size against the layout.
    ///
    /// # Errors
    /// Returns an error if the file cannot be mapped or its size does not
    /// match `width * height` samples.
    pub fn open<P: AsRef<Path>>(
        path: P,
        width: usize,
        height: usize,
        sample: SampleType,
    ) -> Result<Self> {
        let reader = MappedFileReader::open(path)?;
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(sample.size()))
            .ok_or_else(|| {
                Error::InvalidFormat(format!("image size {width}x{height} overflows"))
            })?;

        if reader.len() != expected {
            return Err(Error::InvalidFormat(format!(
                "file size {} does not match {}x{} {:?} samples ({} bytes) (file: {})",
                reader.len(),
                width,
                height,
                sample,
                expected,
                reader.path().display()
            )));
        }
        if expected == 0 {
            warn!("raw image {} has no pixels", reader.path().display());
        }
        debug!(
            "mapped {} as {}x{} {:?}",
            reader.path().display(),
            width,
            height,
            sample
        );

        Ok(Self {
            reader,
            width,
            height,
            sample,
        })
    }

    /// Returns the sample encoding.
    #[must_use]
    pub fn sample_type(&self) -> SampleType {
        self.sample
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.reader.len()
    }

    /// Returns all samples in row-major order.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        let sample = self.sample;
        self.reader
            .as_bytes()
            .chunks_exact(sample.size())
            .map(move |chunk| sample.decode(chunk))
    }

    /// Returns the smallest and largest sample, ignoring NaN.
    ///
    /// Returns `None` if the image has no non-NaN samples.
    #[must_use]
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut nan_count = 0usize;
        let range = self.samples().fold(None, |range, v| {
            if v.is_nan() {
                nan_count += 1;
                return range;
            }
            Some(match range {
                None => (v, v),
                Some((lo, hi)) => (f64::min(lo, v), f64::max(hi, v)),
            })
        });
        if nan_count > 0 {
            warn!(
                "{} NaN samples in {}",
                nan_count,
                self.reader.path().display()
            );
        }
        range
    }

    /// Copies the image into an owned [`GridImage`].
    ///
    /// # Errors
    /// Returns an error if the sample count does not match the dimensions.
    pub fn to_grid(&self) -> Result<GridImage> {
        Ok(GridImage::new(
            self.width,
            self.height,
            self.samples().collect(),
        )?)
    }
}

impl PixelSource for RawImageReader {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn value_at(&self, x: usize, y: usize) -> lutzpix_core::Result<f64> {
        self.check_bounds(x, y)?;
        let size = self.sample.size();
        let offset = (y * self.width + x) * size;
        Ok(self
            .sample
            .decode(&self.reader.as_bytes()[offset..offset + size]))
    }
}
