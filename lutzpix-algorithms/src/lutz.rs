//! Lutz one-pass object extraction.
//!
//! The scanner walks the image once, top to bottom and left to right. It
//! keeps one marker per column describing how segments on the previous row
//! started and ended, a stack of objects that are still open, a stack of
//! suspended parent statuses, and a row store holding the pixels of
//! objects that may continue on the next row. Apart from the pixels of
//! open objects, working memory is proportional to the image width.
//!
//! Pixels are grouped with 8-connectivity: segments touching only through
//! a corner end up in the same object.
#![allow(clippy::missing_panics_doc)]

use std::mem;

use log::{debug, trace};
use lutzpix_core::{
    Pixel, PixelObject, PixelSource, Result, ScanConfig, ScanStatistics, Significance, Threshold,
};

use crate::store::{ObjectStore, SizeFilter};

/// Per-column record of a segment boundary on the previous row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    /// First segment of an object on its row.
    Start,
    /// Further segment of an object already started on its row.
    Secondary,
    /// Segment end; the object may continue.
    End,
    /// Segment end; the object closed on that row.
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Complete,
    Incomplete,
    Object,
    NonObject,
}

/// One slot of the open-object stack.
#[derive(Debug, Default)]
struct OpenObject {
    /// First column of the object on the current row.
    start: Option<usize>,
    /// Last segment end of the object on the current row.
    end: Option<usize>,
    info: Vec<Pixel>,
}

impl OpenObject {
    fn reset(&mut self) {
        self.start = None;
        self.end = None;
        self.info.clear();
    }
}

/// Working buffers of the Lutz scanner.
///
/// A state is reinitialized at the start of every scan and may be reused
/// across scans to keep its allocations.
#[derive(Debug)]
pub struct LutzState {
    markers: Vec<Option<Marker>>,
    open: Vec<OpenObject>,
    co: usize,
    ps_stack: Vec<Status>,
    row_store: Vec<Vec<Pixel>>,
    ps: Status,
    cs: Status,
    stats: ScanStatistics,
}

impl Default for LutzState {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
            open: Vec::new(),
            co: 0,
            ps_stack: Vec::new(),
            row_store: Vec::new(),
            ps: Status::Complete,
            cs: Status::NonObject,
            stats: ScanStatistics::default(),
        }
    }
}

impl LutzState {
    /// Statistics of the most recent scan.
    #[must_use]
    pub fn statistics(&self) -> ScanStatistics {
        self.stats
    }

    fn reset(&mut self, width: usize) {
        self.markers.clear();
        self.markers.resize(width + 1, None);

        for slot in &mut self.open {
            slot.reset();
        }
        if self.open.is_empty() {
            // Slot 0 is the base below every real object.
            self.open.push(OpenObject::default());
        }
        self.co = 0;
        self.ps_stack.clear();

        for buffer in &mut self.row_store {
            buffer.clear();
        }
        self.row_store.resize_with(width + 1, Vec::new);

        self.ps = Status::Complete;
        self.cs = Status::NonObject;
        self.stats = ScanStatistics::default();
    }

    fn begin_row(&mut self) {
        self.ps = Status::Complete;
        self.cs = Status::NonObject;
    }

    fn push_pixel(&mut self, pixel: Pixel) {
        debug_assert!(self.co > 0, "pixel pushed onto the base slot");
        self.open[self.co].info.push(pixel);
    }

    fn push_status(&mut self) {
        self.ps_stack.push(self.ps);
        self.ps = Status::Complete;
    }

    fn pop_status(&mut self) -> Status {
        self.ps_stack
            .pop()
            .expect("pending-status stack underflow")
    }

    /// Moves `co` to a fresh slot and returns it.
    fn open_slot(&mut self) -> &mut OpenObject {
        self.co += 1;
        if self.co == self.open.len() {
            self.open.push(OpenObject::default());
        }
        self.stats.peak_open_objects = self.stats.peak_open_objects.max(self.co);
        &mut self.open[self.co]
    }

    fn close_slot(&mut self) {
        self.co = self
            .co
            .checked_sub(1)
            .expect("open-object stack underflow");
    }

    fn push_object(&mut self, x: usize) {
        self.push_status();
        let slot = self.open_slot();
        slot.reset();
        slot.start = Some(x);
    }

    /// Closes the current object for this row and parks its pixels in the
    /// row store at its start column.
    fn pop_object(&mut self) {
        self.ps = self.pop_status();
        let slot = &mut self.open[self.co];
        let start = slot.start.expect("open object without a start column");
        self.row_store[start].append(&mut slot.info);
        slot.reset();
        self.close_slot();
    }

    fn start_segment(&mut self, x: usize) {
        self.cs = Status::Object;
        if self.ps == Status::Object {
            let slot = &mut self.open[self.co];
            if slot.start.is_none() {
                slot.start = Some(x);
                self.markers[x] = Some(Marker::Start);
            } else {
                self.markers[x] = Some(Marker::Secondary);
            }
        } else {
            self.push_object(x);
            self.markers[x] = Some(Marker::Start);
        }
    }

    fn end_segment(&mut self, x: usize) {
        self.cs = Status::NonObject;
        if self.ps == Status::Complete {
            self.pop_object();
            self.markers[x] = Some(Marker::Closed);
        } else {
            self.open[self.co].end = Some(x);
            self.markers[x] = Some(Marker::End);
        }
    }

    /// Reconciles the current row with a marker left by the previous row.
    fn process_marker<F>(&mut self, marker: Marker, x: usize, emit: &mut F)
    where
        F: FnMut(Vec<Pixel>),
    {
        match marker {
            Marker::Start => {
                self.push_status();
                let mut cached = mem::take(&mut self.row_store[x]);
                if self.cs == Status::NonObject {
                    // First contact with this object on the current row.
                    self.ps_stack.push(Status::Complete);
                    let slot = self.open_slot();
                    slot.reset();
                    mem::swap(&mut slot.info, &mut cached);
                } else {
                    self.open[self.co].info.append(&mut cached);
                }
                // Hand the emptied buffer back to keep its capacity.
                self.row_store[x] = cached;
                self.ps = Status::Object;
            }
            Marker::Secondary => {
                if self.cs == Status::Object && self.ps == Status::Complete {
                    // The current run links two objects of the previous row:
                    // fold the current slot into the one below it.
                    self.pop_status();
                    let joined = &mut self.open[self.co];
                    let k = joined.start.expect("joined object without a start column");
                    let mut pixels = mem::take(&mut joined.info);
                    joined.reset();
                    self.close_slot();

                    let slot = &mut self.open[self.co];
                    slot.info.append(&mut pixels);
                    if slot.start.is_none() {
                        slot.start = Some(k);
                    } else {
                        self.markers[k] = Some(Marker::Secondary);
                    }
                    self.open[self.co + 1].info = pixels;
                }
                self.ps = Status::Object;
            }
            Marker::End => {
                self.ps = Status::Incomplete;
            }
            Marker::Closed => {
                self.ps = self.pop_status();
                if self.cs == Status::NonObject && self.ps == Status::Complete {
                    let slot = &mut self.open[self.co];
                    match slot.start {
                        // Nothing of the object on this row: it is finished.
                        None => emit(mem::take(&mut slot.info)),
                        Some(start) => {
                            let end = slot.end.expect("continuing object without an end column");
                            self.markers[end] = Some(Marker::Closed);
                            self.row_store[start].append(&mut slot.info);
                        }
                    }
                    slot.reset();
                    self.close_slot();
                    self.ps = self.pop_status();
                }
            }
        }
    }

    /// Handles a column whose pixel is not significant (or the sentinel
    /// column past the right edge).
    fn flush_column<F>(&mut self, prev: Option<Marker>, x: usize, emit: &mut F)
    where
        F: FnMut(Vec<Pixel>),
    {
        if let Some(marker) = prev {
            self.process_marker(marker, x, emit);
        }
        if self.cs == Status::Object {
            self.end_segment(x);
        }
    }

    /// Emits every object still parked in the row store, in column order.
    fn clear_store<F>(&mut self, emit: &mut F)
    where
        F: FnMut(Vec<Pixel>),
    {
        for buffer in &mut self.row_store {
            if !buffer.is_empty() {
                emit(mem::take(buffer));
            }
        }
    }
}

/// Lutz one-pass connected-component extraction.
///
/// Significant pixels are found with a [`Significance`] predicate (by
/// default [`Threshold`] at `config.threshold`) and grouped into
/// 8-connected objects. Objects are produced in the order they close,
/// which is roughly top-to-bottom but not a strict position order.
#[derive(Clone, Debug)]
pub struct LutzScanner<T = Threshold> {
    config: ScanConfig,
    test: T,
}

impl LutzScanner<Threshold> {
    /// Creates a scanner thresholding at `config.threshold`.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        let test = Threshold::new(config.threshold);
        Self { config, test }
    }
}

impl Default for LutzScanner<Threshold> {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

impl<T: Significance> LutzScanner<T> {
    /// Creates a scanner with a custom significance predicate.
    ///
    /// `config.threshold` is ignored; the size limits still apply.
    pub fn with_significance(config: ScanConfig, test: T) -> Self {
        Self { config, test }
    }

    /// Returns the algorithm name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        "Lutz"
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Creates an empty working state.
    #[must_use]
    pub fn create_state(&self) -> LutzState {
        LutzState::default()
    }

    /// Scans `image` and returns the objects that pass the size filter.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the source
    /// fails to deliver a pixel.
    pub fn scan<S>(&self, image: &S, state: &mut LutzState) -> Result<ObjectStore>
    where
        S: PixelSource + ?Sized,
    {
        let mut store = ObjectStore::with_config(&self.config);
        self.scan_into(image, state, &mut store)?;
        Ok(store)
    }

    /// Scans `image`, offering every finished object to `store`.
    ///
    /// The store's own size filter decides what is kept.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the source
    /// fails to deliver a pixel.
    pub fn scan_into<S>(
        &self,
        image: &S,
        state: &mut LutzState,
        store: &mut ObjectStore,
    ) -> Result<()>
    where
        S: PixelSource + ?Sized,
    {
        let mut found = 0;
        let mut discarded = 0;
        self.run(image, state, |pixels| {
            let n_pixels = pixels.len();
            if store.offer(pixels) {
                found += 1;
            } else {
                trace!("discarded object of {n_pixels} pixels");
                discarded += 1;
            }
        })?;
        state.stats.objects_found = found;
        state.stats.objects_discarded = discarded;
        Ok(())
    }

    /// Scans `image`, calling `on_object` for every object that passes the
    /// size filter, in completion order.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the source
    /// fails to deliver a pixel.
    pub fn scan_each<S, F>(&self, image: &S, state: &mut LutzState, mut on_object: F) -> Result<()>
    where
        S: PixelSource + ?Sized,
        F: FnMut(PixelObject),
    {
        let filter = SizeFilter::from(&self.config);
        let mut found = 0;
        let mut discarded = 0;
        self.run(image, state, |pixels| {
            if filter.accepts(pixels.len()) {
                found += 1;
                on_object(PixelObject::from_pixels(pixels));
            } else {
                trace!("discarded object of {} pixels", pixels.len());
                discarded += 1;
            }
        })?;
        state.stats.objects_found = found;
        state.stats.objects_discarded = discarded;
        Ok(())
    }

    fn run<S, F>(&self, image: &S, state: &mut LutzState, mut emit: F) -> Result<()>
    where
        S: PixelSource + ?Sized,
        F: FnMut(Vec<Pixel>),
    {
        self.config.validate()?;

        let width = image.width();
        let height = image.height();
        state.reset(width);
        if image.is_empty() {
            return Ok(());
        }

        for y in 0..height {
            state.begin_row();

            for x in 0..width {
                let value = image.value_at(x, y)?;
                // Read the previous row's marker before this row writes it.
                let prev = state.markers[x].take();
                state.stats.pixels_scanned += 1;

                if self.test.is_significant(value) {
                    state.stats.significant_pixels += 1;
                    if state.cs == Status::NonObject {
                        state.start_segment(x);
                    }
                    if let Some(marker) = prev {
                        state.process_marker(marker, x, &mut emit);
                    }
                    state.push_pixel(Pixel::new(x, y, value));
                } else {
                    state.flush_column(prev, x, &mut emit);
                }
            }

            // Sentinel column closes any run touching the right edge.
            let prev = state.markers[width].take();
            state.flush_column(prev, width, &mut emit);
            state.stats.rows_scanned += 1;
        }

        state.clear_store(&mut emit);

        debug!(
            "{}: scanned {}x{} image, {} significant pixels, peak {} open objects",
            self.name(),
            width,
            height,
            state.stats.significant_pixels,
            state.stats.peak_open_objects
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use approx::assert_relative_eq;
    use lutzpix_core::{Error, GridImage, PixelCoord};

    /// Builds an image from rows of `#` (value 1.0) and `.` (value 0.0).
    fn image(rows: &[&str]) -> GridImage {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        GridImage::from_fn(width, height, |x, y| {
            if rows[y].as_bytes()[x] == b'#' {
                1.0
            } else {
                0.0
            }
        })
    }

    fn scan(rows: &[&str], min_pixels: usize) -> ObjectStore {
        let scanner = LutzScanner::new(
            ScanConfig::new()
                .with_threshold(0.5)
                .with_min_pixels(min_pixels),
        );
        let mut state = scanner.create_state();
        scanner.scan(&image(rows), &mut state).unwrap()
    }

    fn sizes(store: &ObjectStore) -> Vec<usize> {
        let mut sizes: Vec<usize> = store.iter().map(PixelObject::len).collect();
        sizes.sort_unstable();
        sizes
    }

    #[test]
    fn test_single_pixel_min_size() {
        assert_eq!(scan(&["#"], 1).len(), 1);
        assert_eq!(scan(&["#"], 2).len(), 0);

        let store = scan(&["...", ".#.", "..."], 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store[0].len(), 1);
        assert_eq!(store[0][0].coord, PixelCoord::new(1, 1));
    }

    #[test]
    fn test_diagonal_pixels_merge() {
        let store = scan(&["#.", ".#"], 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store[0].len(), 2);

        let store = scan(&[".#", "#."], 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store[0].len(), 2);
    }

    #[test]
    fn test_gap_separates_objects() {
        let store = scan(&["#.#"], 1);
        assert_eq!(store.len(), 2);
        assert_eq!(sizes(&store), vec![1, 1]);
        assert!(!store[0].overlaps(&store[1]));
    }

    #[test]
    fn test_u_shape_is_one_object() {
        let store = scan(&["#.#", "###"], 1);
        assert_eq!(sizes(&store), vec![5]);
    }

    #[test]
    fn test_arch_is_one_object() {
        let store = scan(&["###", "#.#", "..."], 1);
        assert_eq!(sizes(&store), vec![5]);
    }

    #[test]
    fn test_run_joining_two_branches_keeps_all_pixels() {
        let store = scan(&["#####", "#..#.", "..##."], 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store[0].len(), 9);
        assert!(store[0].contains_coord(PixelCoord::new(2, 2)));
    }

    #[test]
    fn test_separate_objects_and_completion_order() {
        let store = scan(&["##...", "##...", ".....", "...##"], 1);
        assert_eq!(store.len(), 2);
        // The upper block closes first.
        assert_eq!(store[0].y_min(), Some(0));
        assert_eq!(store[1].y_min(), Some(3));
    }

    #[test]
    fn test_object_touching_every_edge() {
        let store = scan(&["###", "###", "###"], 1);
        assert_eq!(store.len(), 1);
        let object = &store[0];
        assert_eq!(object.len(), 9);
        let bounds = object.bounding_box().unwrap();
        assert_eq!((bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max), (0, 2, 0, 2));
        assert_eq!(object.sum(), 9.0);
    }

    #[test]
    fn test_zero_size_images() {
        let scanner = LutzScanner::default();
        let mut state = scanner.create_state();
        assert!(scanner
            .scan(&GridImage::filled(0, 4, 1.0), &mut state)
            .unwrap()
            .is_empty());
        assert!(scanner
            .scan(&GridImage::filled(4, 0, 1.0), &mut state)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        let grid = GridImage::new(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
        let scanner = LutzScanner::new(ScanConfig::new().with_threshold(2.0));
        let mut state = scanner.create_state();
        let store = scanner.scan(&grid, &mut state).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store[0].len(), 1);
        assert_eq!(store[0].max_value(), 3.0);
    }

    #[test]
    fn test_custom_significance() {
        let grid = GridImage::new(4, 1, vec![-5.0, 0.0, -3.0, -4.0]).unwrap();
        let scanner = LutzScanner::with_significance(ScanConfig::new(), |v: f64| v < -2.0);
        let mut state = scanner.create_state();
        let store = scanner.scan(&grid, &mut state).unwrap();
        assert_eq!(sizes(&store), vec![1, 2]);
    }

    #[test]
    fn test_max_pixels_filter() {
        let scanner = LutzScanner::new(
            ScanConfig::new()
                .with_threshold(0.5)
                .with_max_pixels(2),
        );
        let mut state = scanner.create_state();
        let store = scanner
            .scan(&image(&["###.#", ".....", "##..."]), &mut state)
            .unwrap();
        assert_eq!(sizes(&store), vec![1, 2]);
        assert_eq!(store.discarded(), 1);

        let stats = state.statistics();
        assert_eq!(stats.objects_found, 2);
        assert_eq!(stats.objects_discarded, 1);
        assert_eq!(stats.significant_pixels, 6);
        assert_eq!(stats.pixels_scanned, 15);
        assert_eq!(stats.rows_scanned, 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let scanner = LutzScanner::new(ScanConfig::new().with_threshold(f64::NAN));
        let mut state = scanner.create_state();
        let result = scanner.scan(&GridImage::filled(2, 2, 1.0), &mut state);
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_source_errors_propagate() {
        struct Truncated;

        impl PixelSource for Truncated {
            fn width(&self) -> usize {
                2
            }

            fn height(&self) -> usize {
                2
            }

            fn value_at(&self, x: usize, y: usize) -> Result<f64> {
                if y == 1 {
                    Err(Error::OutOfRange {
                        x,
                        y,
                        width: 2,
                        height: 1,
                    })
                } else {
                    Ok(1.0)
                }
            }
        }

        let scanner = LutzScanner::default();
        let mut state = scanner.create_state();
        let result = scanner.scan(&Truncated, &mut state);
        assert!(matches!(result, Err(Error::OutOfRange { y: 1, .. })));
    }

    #[test]
    fn test_scan_each_matches_scan() {
        let rows = ["#.#..#", ".#...#", "....##", "#....."];
        let scanner = LutzScanner::new(ScanConfig::new().with_threshold(0.5));
        let mut state = scanner.create_state();

        let store = scanner.scan(&image(&rows), &mut state).unwrap();
        let mut collected = Vec::new();
        scanner
            .scan_each(&image(&rows), &mut state, |object| collected.push(object))
            .unwrap();

        assert_eq!(collected.len(), store.len());
        for (a, b) in collected.iter().zip(store.iter()) {
            assert_eq!(a.pixels(), b.pixels());
        }
    }

    #[test]
    fn test_state_reuse_across_widths() {
        let scanner = LutzScanner::new(ScanConfig::new().with_threshold(0.5));
        let mut state = scanner.create_state();

        let wide = scanner
            .scan(&image(&["#.#.#.#.#", "#.#.#.#.#"]), &mut state)
            .unwrap();
        assert_eq!(wide.len(), 5);

        let narrow = scanner.scan(&image(&["##", ".#"]), &mut state).unwrap();
        assert_eq!(sizes(&narrow), vec![3]);

        let wide_again = scanner
            .scan(&image(&["#.#.#.#.#", "#.#.#.#.#"]), &mut state)
            .unwrap();
        assert_eq!(sizes(&wide_again), vec![2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_object_values_and_centroid() {
        let grid = GridImage::new(3, 1, vec![1.0, 0.0, 3.0]).unwrap();
        let scanner = LutzScanner::new(ScanConfig::new().with_threshold(-0.5));
        let mut state = scanner.create_state();
        let store = scanner.scan(&grid, &mut state).unwrap();
        assert_eq!(store.len(), 1);

        let centroid = store[0].centroid(true).unwrap();
        assert_relative_eq!(centroid.x, 1.5);
        let centroid = store[0].centroid(false).unwrap();
        assert_relative_eq!(centroid.x, 1.0);
        assert_eq!(store[0].sum(), 4.0);
    }
}
