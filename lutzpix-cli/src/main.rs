//! lutzpix CLI
//!
//! Extracts connected objects from raw scalar images.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand, ValueEnum};

use log::info;
use lutzpix_algorithms::{summarize_objects, LutzScanner};
use lutzpix_core::{PixelSource, ScanConfig};
use lutzpix_io::{ObjectWriter, OutputFormat, RawImageReader, SampleType};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    LutzpixIo(#[from] lutzpix_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] lutzpix_core::Error),
}

/// Sample encoding of the input file.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Dtype {
    /// Unsigned 8-bit integers
    U8,
    /// Unsigned 16-bit little-endian integers
    U16,
    /// 32-bit little-endian floats
    F32,
    /// 64-bit little-endian floats
    F64,
}

impl From<Dtype> for SampleType {
    fn from(dtype: Dtype) -> Self {
        match dtype {
            Dtype::U8 => SampleType::U8,
            Dtype::U16 => SampleType::U16,
            Dtype::F32 => SampleType::F32,
            Dtype::F64 => SampleType::F64,
        }
    }
}

/// Image layout shared by every subcommand.
#[derive(clap::Args, Debug)]
struct ImageArgs {
    /// Input raw image (headerless, row-major)
    input: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    width: usize,

    /// Image height in pixels
    #[arg(long)]
    height: usize,

    /// Sample type
    #[arg(long, value_enum, default_value = "f64")]
    dtype: Dtype,
}

impl ImageArgs {
    fn open(&self) -> Result<RawImageReader> {
        Ok(RawImageReader::open(
            &self.input,
            self.width,
            self.height,
            self.dtype.into(),
        )?)
    }
}

/// One-pass connected object extraction for scalar images.
#[derive(Parser)]
#[command(name = "lutzpix")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract objects above a threshold
    Extract {
        #[command(flatten)]
        image: ImageArgs,

        /// Pixels strictly above this value are significant
        #[arg(short, long)]
        threshold: f64,

        /// Minimum object size in pixels
        #[arg(long, default_value = "1")]
        min_pixels: usize,

        /// Maximum object size in pixels
        #[arg(long)]
        max_pixels: Option<usize>,

        /// Use unweighted centroids
        #[arg(long)]
        unweighted: bool,

        /// Output table (.csv or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a raw image
    Info {
        #[command(flatten)]
        image: ImageArgs,
    },

    /// Benchmark the scanner on a raw image
    Benchmark {
        #[command(flatten)]
        image: ImageArgs,

        /// Pixels strictly above this value are significant
        #[arg(short, long)]
        threshold: f64,

        /// Number of iterations
        #[arg(
            short,
            long,
            default_value = "3",
            value_parser = RangedU64ValueParser::<usize>::new().range(1..)
        )]
        iterations: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            image,
            threshold,
            min_pixels,
            max_pixels,
            unweighted,
            output,
            verbose,
        } => {
            let mut config = ScanConfig::new()
                .with_threshold(threshold)
                .with_min_pixels(min_pixels);
            if let Some(max) = max_pixels {
                config = config.with_max_pixels(max);
            }

            if verbose {
                eprintln!("Reading: {}", image.input.display());
                eprintln!("Size: {}x{} ({:?})", image.width, image.height, image.dtype);
                eprintln!("Threshold: {}", threshold);
                eprintln!("Min pixels: {}", min_pixels);
                if let Some(max) = max_pixels {
                    eprintln!("Max pixels: {}", max);
                }
            }

            // Validate the output path before scanning.
            let format = output.as_ref().map(OutputFormat::from_path).transpose()?;

            let reader = image.open()?;
            let start = Instant::now();

            let scanner = LutzScanner::new(config);
            let mut state = scanner.create_state();
            let store = scanner.scan(&reader, &mut state)?;
            let summaries = summarize_objects(&store, !unweighted)?;

            let elapsed = start.elapsed();
            let stats = state.statistics();
            info!("scan statistics: {:?}", stats);

            if verbose {
                eprintln!(
                    "  {} significant pixels ({:.2}%)",
                    stats.significant_pixels,
                    stats.significant_fraction() * 100.0
                );
                eprintln!("  {} objects discarded by size", stats.objects_discarded);
                eprintln!("  peak open objects: {}", stats.peak_open_objects);
            }

            match (output, format) {
                (Some(path), Some(format)) => {
                    if verbose {
                        eprintln!("Writing output to: {}", path.display());
                    }
                    ObjectWriter::create(&path)?.write(&summaries, format)?;
                }
                _ => {
                    ObjectWriter::new(std::io::stdout().lock())
                        .write(&summaries, OutputFormat::Csv)?;
                }
            }

            eprintln!(
                "Extracted {} objects in {:.2}s",
                summaries.len(),
                elapsed.as_secs_f64()
            );
        }

        Commands::Info { image } => {
            let reader = image.open()?;
            let file_size = reader.file_size();

            println!("File: {}", image.input.display());
            println!(
                "Size: {} bytes ({:.2} MB)",
                file_size,
                file_size as f64 / 1_000_000.0
            );
            println!(
                "Image: {}x{} {:?} ({} pixels)",
                reader.width(),
                reader.height(),
                reader.sample_type(),
                reader.width() * reader.height()
            );

            match reader.value_range() {
                Some((min, max)) => println!("Value range: {} - {}", min, max),
                None => println!("Value range: n/a"),
            }
        }

        Commands::Benchmark {
            image,
            threshold,
            iterations,
        } => {
            let reader = image.open()?;
            let grid = reader.to_grid()?;
            let scanner = LutzScanner::new(ScanConfig::new().with_threshold(threshold));

            println!(
                "Benchmarking {}x{} image, {} iterations",
                reader.width(),
                reader.height(),
                iterations
            );
            println!(
                "{:<10} | {:<10} | {:<15} | {:<15} | {:<15}",
                "Source", "Objects", "Mean Time (ms)", "Min Time (ms)", "Max Time (ms)"
            );
            println!("{:-<78}", "");

            let sources: [(&str, &dyn PixelSource); 2] = [("mapped", &reader), ("memory", &grid)];
            for (name, source) in sources {
                let mut state = scanner.create_state();

                // Warmup
                let objects = scanner.scan(source, &mut state)?.len();

                let mut times = Vec::with_capacity(iterations);
                for _ in 0..iterations {
                    let start = Instant::now();
                    let _ = scanner.scan(source, &mut state)?;
                    times.push(start.elapsed().as_secs_f64() * 1000.0);
                }

                let min_time = times.iter().fold(f64::INFINITY, |a, &b| a.min(b));
                let max_time = times.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
                let mean_time = times.iter().sum::<f64>() / times.len() as f64;

                println!(
                    "{:<10} | {:<10} | {:<15.2} | {:<15.2} | {:<15.2}",
                    name, objects, mean_time, min_time, max_time
                );
            }
        }
    }

    Ok(())
}
