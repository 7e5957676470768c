//! High-level helpers that combine scanning and per-object measurement.

use log::debug;
use lutzpix_core::{BoundingBox, Centroid, Error, PixelObject, PixelSource, Result, ScanConfig};
use rayon::prelude::*;

use crate::{LutzScanner, ObjectStore};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Summary measurements of one extracted object.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectSummary {
    /// Position of the object in its store.
    pub id: usize,
    /// Number of pixels.
    pub n_pixels: usize,
    /// Pixel bounds.
    pub bounding_box: BoundingBox,
    /// Smallest pixel value.
    pub min_value: f64,
    /// Largest pixel value.
    pub max_value: f64,
    /// Sum of pixel values.
    pub sum: f64,
    /// Centroid position.
    pub centroid: Centroid,
}

impl ObjectSummary {
    /// Measures `object`.
    ///
    /// # Errors
    /// Returns [`Error::EmptyObject`] if the object has no pixels.
    pub fn from_object(id: usize, object: &PixelObject, weighted: bool) -> Result<Self> {
        let bounding_box = object.bounding_box().ok_or(Error::EmptyObject)?;
        Ok(Self {
            id,
            n_pixels: object.len(),
            bounding_box,
            min_value: object.min_value(),
            max_value: object.max_value(),
            sum: object.sum(),
            centroid: object.centroid(weighted)?,
        })
    }
}

/// Extracts objects from one image with a fresh scanner state.
///
/// # Errors
/// Returns an error if the configuration is invalid or the image cannot
/// be read.
pub fn extract_objects<S>(image: &S, config: &ScanConfig) -> Result<ObjectStore>
where
    S: PixelSource + ?Sized,
{
    let scanner = LutzScanner::new(config.clone());
    let mut state = scanner.create_state();
    let store = scanner.scan(image, &mut state)?;
    let stats = state.statistics();
    debug!(
        "extracted {} objects ({} discarded) from {} significant pixels",
        stats.objects_found, stats.objects_discarded, stats.significant_pixels
    );
    Ok(store)
}

/// Measures every object in `store`, in parallel across objects.
///
/// # Errors
/// Returns [`Error::EmptyObject`] if the store holds an empty object.
pub fn summarize_objects(store: &ObjectStore, weighted: bool) -> Result<Vec<ObjectSummary>> {
    store
        .objects()
        .par_iter()
        .enumerate()
        .map(|(id, object)| ObjectSummary::from_object(id, object, weighted))
        .collect()
}

/// Extracts objects from independent images in parallel.
///
/// Each image is scanned whole by one thread with its own state. The
/// result keeps the order of `images`.
///
/// # Errors
/// Returns the first error encountered by any scan.
pub fn extract_batch<S>(images: &[S], config: &ScanConfig) -> Result<Vec<ObjectStore>>
where
    S: PixelSource + Sync,
{
    config.validate()?;
    images
        .par_iter()
        .map(|image| extract_objects(image, config))
        .collect()
}
