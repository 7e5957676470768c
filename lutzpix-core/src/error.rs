//! Error types for lutzpix-core.

use thiserror::Error;

/// Result type alias for lutzpix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for lutzpix operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Pixel coordinate outside the image.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} image")]
    OutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Sample buffer does not match the declared image size.
    #[error("{len} samples cannot fill a {width}x{height} image")]
    DimensionMismatch {
        width: usize,
        height: usize,
        len: usize,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Empty object error.
    #[error("cannot compute centroid of empty object")]
    EmptyObject,
}
