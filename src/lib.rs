//! sudoku_scan - Sudoku grid import from photographs
//!
//! Takes a photo and four user-confirmed corners, rectifies the grid to an
//! axis-aligned square, slices it into 81 cells and reads each cell with an
//! external digit recognizer. Whatever the recognizer cannot read with
//! confidence is left empty for the player to fill in.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Import settings and environment overrides
pub mod config;
/// Error taxonomy
pub mod error;
/// Core data structures (Point, Quad, Cell, Grid)
pub mod models;
/// Stage composition and telemetry
pub mod pipeline;
/// Recognition session lifecycle, acceptance policy and cancellation
pub mod recognition;
/// Perspective warp and cell segmentation
pub mod rectify;
/// Corner editing with explicit confirmation
pub mod selection;
/// Loading, decoding and formatting helpers
pub mod tools;
/// Utility functions (linear solve, homography, grayscale, binarization)
pub mod utils;
/// Conflict checks and solver hand-off for imported grids
pub mod validate;

use image::RgbaImage;

pub use config::ImportConfig;
pub use error::{GeometryError, ImportError, RecognitionError, SingularMatrixError};
pub use models::{Cell, CellOutcome, Corner, Grid, Point, Quad, RasterImage};
pub use pipeline::{ImportReport, ImportTelemetry, import_grid, rectify_grid, segment_grid};
pub use recognition::{
    CancelToken, ConcurrencyPolicy, ImportCoordinator, Recognition, RecognitionEngine,
    RecognitionSession,
};
pub use selection::CornerSelection;
pub use tools::decode_image;
pub use validate::{SudokuSolver, ValidationError, validate_import};

/// Grid importer with configuration and single-flight attempt tracking
///
/// Cloning shares the attempt coordinator, so a clone held by a UI thread
/// can cancel an import running elsewhere.
#[derive(Debug, Clone, Default)]
pub struct Importer {
    config: ImportConfig,
    coordinator: ImportCoordinator,
}

impl Importer {
    /// Create an importer with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an importer with the given settings
    pub fn with_config(config: ImportConfig) -> Self {
        Self {
            config,
            coordinator: ImportCoordinator::default(),
        }
    }

    /// Create an importer with settings and a concurrency policy
    pub fn with_policy(config: ImportConfig, policy: ConcurrencyPolicy) -> Self {
        Self {
            config,
            coordinator: ImportCoordinator::new(policy),
        }
    }

    /// Current settings
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import the grid inside `quad` as a new attempt.
    ///
    /// Starting an import supersedes (or, under [`ConcurrencyPolicy::Reject`],
    /// is refused by) any attempt already in flight. A superseded or
    /// cancelled attempt never returns a grid.
    pub fn import<E: RecognitionEngine>(
        &self,
        engine: &E,
        source: &RgbaImage,
        quad: &Quad,
    ) -> Result<ImportReport, ImportError> {
        let ticket = self.coordinator.begin()?;
        let report = import_grid(engine, source, quad, &self.config, ticket.token())?;
        ticket.deliver(report)
    }

    /// Decode `bytes` and import the grid inside `quad`, given in the encoded
    /// image's pixel coordinates
    pub fn import_bytes<E: RecognitionEngine>(
        &self,
        engine: &E,
        bytes: &[u8],
        quad: &Quad,
    ) -> Result<ImportReport, ImportError> {
        let source = decode_image(bytes)?;
        self.import(engine, &source, quad)
    }

    /// Cancel the attempt in flight, if any (retake, dialog closed)
    pub fn cancel(&self) -> Option<u64> {
        self.coordinator.cancel_current()
    }

    /// Id of the attempt in flight, if any
    pub fn in_flight(&self) -> Option<u64> {
        self.coordinator.in_flight()
    }
}
