//! lutzpix-io: File input and output for lutzpix.
//!
//! Raw images are read through memory-mapped files via memmap2 and
//! exposed as a [`PixelSource`](lutzpix_core::PixelSource). Extracted
//! objects are written as CSV or JSON tables.
//!

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::{MappedFileReader, RawImageReader, SampleType};
pub use writer::{ObjectWriter, OutputFormat};
