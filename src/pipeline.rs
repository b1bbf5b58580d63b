//! Import pipeline: rectify, preprocess, segment, recognize.

use std::time::{Duration, Instant};

use image::RgbaImage;
use log::{debug, info};

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::models::{Cell, Grid, Quad};
use crate::recognition::{CancelToken, RecognitionEngine, recognize_cells};
use crate::rectify::{rectify_quad, segment};
use crate::utils::binarization::{Binarization, binarize_in_place};
use crate::utils::grayscale::grayscale_in_place;

/// Stage-level counters and timings for one import
#[derive(Debug, Clone, Default)]
pub struct ImportTelemetry {
    /// Time spent warping and preprocessing
    pub rectify_time: Duration,
    /// Time spent cropping and upscaling cells
    pub segment_time: Duration,
    /// Time spent in the recognition session, startup included
    pub recognize_time: Duration,
    /// Cells with an accepted digit
    pub accepted: usize,
    /// Cells whose reading failed the acceptance policy
    pub rejected: usize,
    /// Cells the engine failed on
    pub cell_errors: usize,
}

/// Everything an import produces
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Recognized grid (81 entries)
    pub grid: Grid,
    /// Cell images with their outcomes, row-major
    pub cells: Vec<Cell>,
    /// Stage counters
    pub telemetry: ImportTelemetry,
}

/// Rewrite `image` in place: R, G and B become BT.709 luminance, then
/// `binarization` may snap them to 0 or 255. Alpha is left untouched.
pub fn preprocess(image: &mut RgbaImage, binarization: Binarization) {
    grayscale_in_place(image);
    binarize_in_place(image, binarization);
}

/// Warp the region inside `quad` to the configured square and preprocess it
pub fn rectify_grid(
    source: &RgbaImage,
    quad: &Quad,
    config: &ImportConfig,
) -> Result<RgbaImage, ImportError> {
    config.validate()?;
    if source.width() == 0 || source.height() == 0 {
        return Err(ImportError::invalid_input("source image is empty"));
    }
    let mut square = rectify_quad(
        source,
        quad,
        config.output_size,
        config.output_size,
        config.background,
    )?;
    preprocess(&mut square, config.binarization);
    Ok(square)
}

/// Split a rectified square into 81 cells using the configured padding and upscale
pub fn segment_grid(rectified: &RgbaImage, config: &ImportConfig) -> Vec<Cell> {
    segment(rectified, config.cell_padding, config.cell_upscale)
}

/// Run a full import of the grid inside `quad`.
///
/// Geometry failures surface before any recognition session is started.
/// The result is discarded (as [`ImportError::Cancelled`]) if `cancel`
/// fires at any point.
pub fn import_grid<E: RecognitionEngine>(
    engine: &E,
    source: &RgbaImage,
    quad: &Quad,
    config: &ImportConfig,
    cancel: &CancelToken,
) -> Result<ImportReport, ImportError> {
    let mut telemetry = ImportTelemetry::default();

    let start = Instant::now();
    let rectified = rectify_grid(source, quad, config)?;
    telemetry.rectify_time = start.elapsed();

    let start = Instant::now();
    let mut cells = segment_grid(&rectified, config);
    telemetry.segment_time = start.elapsed();
    debug!(
        "rectified in {:?}, segmented {} cells in {:?}",
        telemetry.rectify_time,
        cells.len(),
        telemetry.segment_time
    );

    let summary = recognize_cells(engine, &mut cells, config.confidence_threshold, cancel)?;
    telemetry.recognize_time = summary.elapsed;
    telemetry.accepted = summary.accepted;
    telemetry.rejected = summary.rejected;
    telemetry.cell_errors = summary.cell_errors;

    if cancel.is_cancelled() {
        return Err(ImportError::Cancelled {
            attempt: cancel.attempt(),
        });
    }
    info!(
        "import attempt {} finished: {} givens",
        cancel.attempt(),
        summary.grid.filled_count()
    );

    Ok(ImportReport {
        grid: summary.grid,
        cells,
        telemetry,
    })
}
