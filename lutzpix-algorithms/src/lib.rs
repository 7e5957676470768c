//! lutzpix-algorithms: One-pass object extraction.
//!
//! This crate provides:
//! - **`LutzScanner`** - Lutz (1980) single raster scan with O(width) state
//! - **`ObjectStore`** - completed objects with size filtering
//! - processing helpers for whole-image extraction, per-object summaries
//!   and batches of independent images
//!
#![warn(missing_docs)]

mod lutz;
mod processing;
mod store;

pub use lutz::{LutzScanner, LutzState};
pub use processing::{extract_batch, extract_objects, summarize_objects, ObjectSummary};
pub use store::{ObjectStore, SizeFilter};

// Re-export core types used in the public API
pub use lutzpix_core::{PixelObject, PixelSource, ScanConfig, ScanStatistics, Significance};
