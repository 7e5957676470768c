//! lutzpix-core: Core types for one-pass object extraction.
//!
//! This crate provides the pixel and object types, the image-source and
//! significance abstractions, and the scan configuration shared by the
//! scanner and the I/O layers.
//!

pub mod config;
pub mod error;
pub mod object;
pub mod pixel;
pub mod significance;
pub mod source;
pub mod statistics;

pub use config::ScanConfig;
pub use error::{Error, Result};
pub use object::{BoundingBox, Centroid, PixelObject};
pub use pixel::{Pixel, PixelCoord};
pub use significance::{Significance, Threshold};
pub use source::{GridImage, PixelSource};
pub use statistics::ScanStatistics;
