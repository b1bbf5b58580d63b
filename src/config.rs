//! Import configuration with environment overrides.
//!
//! Every knob has a default; `ImportConfig::from_env` overlays `SUDOKU_*`
//! variables and silently ignores values that fail to parse.

use image::Rgba;

use crate::error::ImportError;
use crate::utils::binarization::Binarization;

/// Side of the rectified square in pixels
pub const DEFAULT_OUTPUT_SIZE: u32 = 600;
/// Minimum engine confidence (0..100) for a digit to be accepted
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 50.0;
/// Fraction of each cell trimmed from every side to drop grid lines
pub const DEFAULT_CELL_PADDING: f32 = 0.1;
/// Integer upscale applied to each cell before recognition
pub const DEFAULT_CELL_UPSCALE: u32 = 2;
/// Largest accepted cell upscale factor
pub const MAX_CELL_UPSCALE: u32 = 8;
/// Rectifier fill for samples that land outside the source
pub const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn parse_env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

fn parse_env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn parse_env_binarization(name: &str, default: Binarization) -> Binarization {
    std::env::var(name)
        .ok()
        .and_then(|v| Binarization::parse(&v))
        .unwrap_or(default)
}

/// Settings for one grid import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Side of the rectified square; the grid is assumed square and axis-aligned
    pub output_size: u32,
    /// Digits are accepted only when confidence is strictly above this
    pub confidence_threshold: f32,
    /// Inward padding per side as a fraction of the cell size
    pub cell_padding: f32,
    /// Nearest-neighbor upscale factor for each cell (1 = none)
    pub cell_upscale: u32,
    /// Post-grayscale binarization policy
    pub binarization: Binarization,
    /// Fill for destination pixels that map outside the source
    pub background: Rgba<u8>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            cell_padding: DEFAULT_CELL_PADDING,
            cell_upscale: DEFAULT_CELL_UPSCALE,
            binarization: Binarization::None,
            background: DEFAULT_BACKGROUND,
        }
    }
}

impl ImportConfig {
    /// Defaults overlaid with `SUDOKU_OUTPUT_SIZE`, `SUDOKU_CONFIDENCE_THRESHOLD`,
    /// `SUDOKU_CELL_PADDING`, `SUDOKU_CELL_UPSCALE` and `SUDOKU_BINARIZE`
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            output_size: parse_env_u32("SUDOKU_OUTPUT_SIZE", d.output_size),
            confidence_threshold: parse_env_f32(
                "SUDOKU_CONFIDENCE_THRESHOLD",
                d.confidence_threshold,
            ),
            cell_padding: parse_env_f32("SUDOKU_CELL_PADDING", d.cell_padding),
            cell_upscale: parse_env_u32("SUDOKU_CELL_UPSCALE", d.cell_upscale),
            binarization: parse_env_binarization("SUDOKU_BINARIZE", d.binarization),
            background: d.background,
        }
    }

    /// Set the rectified square size
    pub fn with_output_size(mut self, size: u32) -> Self {
        self.output_size = size;
        self
    }

    /// Set the confidence threshold
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the per-side cell padding fraction
    pub fn with_cell_padding(mut self, padding: f32) -> Self {
        self.cell_padding = padding;
        self
    }

    /// Set the cell upscale factor
    pub fn with_cell_upscale(mut self, upscale: u32) -> Self {
        self.cell_upscale = upscale;
        self
    }

    /// Set the binarization policy
    pub fn with_binarization(mut self, binarization: Binarization) -> Self {
        self.binarization = binarization;
        self
    }

    /// Set the out-of-bounds fill
    pub fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self
    }

    /// Check that every value is in range
    pub fn validate(&self) -> Result<(), ImportError> {
        if self.output_size < crate::models::GRID_SIZE as u32 {
            return Err(ImportError::invalid_config(format!(
                "output size {} is smaller than the 9x9 grid",
                self.output_size
            )));
        }
        if !(0.0..=100.0).contains(&self.confidence_threshold) {
            return Err(ImportError::invalid_config(format!(
                "confidence threshold {} outside 0..=100",
                self.confidence_threshold
            )));
        }
        if !(0.0..0.5).contains(&self.cell_padding) {
            return Err(ImportError::invalid_config(format!(
                "cell padding {} outside [0, 0.5)",
                self.cell_padding
            )));
        }
        if !(1..=MAX_CELL_UPSCALE).contains(&self.cell_upscale) {
            return Err(ImportError::invalid_config(format!(
                "cell upscale {} outside 1..={}",
                self.cell_upscale, MAX_CELL_UPSCALE
            )));
        }
        Ok(())
    }
}
