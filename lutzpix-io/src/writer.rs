//! Object table writers.

use crate::{Error, Result};
use lutzpix_algorithms::ObjectSummary;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const CSV_HEADER: &str =
    "id,n_pixels,x_min,x_max,y_min,y_max,min_value,max_value,sum,x_centroid,y_centroid";

/// Table format selected from an output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

impl OutputFormat {
    /// Picks the format from the extension of `path` (case-insensitive).
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] for a missing or unknown extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(Error::InvalidFormat(format!(
                "unsupported output extension (file: {})",
                path.display()
            ))),
        }
    }
}

/// Writer for extracted object tables.
pub struct ObjectWriter<W: Write = File> {
    writer: BufWriter<W>,
}

impl ObjectWriter<File> {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> ObjectWriter<W> {
    /// Wraps any byte sink.
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
        }
    }

    /// Writes summaries in the given format.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write(&mut self, summaries: &[ObjectSummary], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Csv => self.write_csv(summaries),
            OutputFormat::Json => self.write_json(summaries),
        }
    }

    /// Writes summaries as CSV.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_csv(&mut self, summaries: &[ObjectSummary]) -> Result<()> {
        writeln!(self.writer, "{CSV_HEADER}")?;

        for s in summaries {
            let b = &s.bounding_box;
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{},{},{}",
                s.id,
                s.n_pixels,
                b.x_min,
                b.x_max,
                b.y_min,
                b.y_max,
                s.min_value,
                s.max_value,
                s.sum,
                s.centroid.x,
                s.centroid.y
            )?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes summaries as a JSON array.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn write_json(&mut self, summaries: &[ObjectSummary]) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, summaries)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
