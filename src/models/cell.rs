use image::RgbaImage;

/// Outcome of recognizing a single cell
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CellOutcome {
    /// Accepted digit with the engine's confidence (0..100)
    Digit {
        /// Digit value, `1..=9`
        value: u8,
        /// Engine-reported confidence
        confidence: f32,
    },
    /// No digit, or one that failed the acceptance policy
    #[default]
    Empty,
}

impl CellOutcome {
    /// Accepted digit, if any
    pub fn digit(&self) -> Option<u8> {
        match self {
            CellOutcome::Digit { value, .. } => Some(*value),
            CellOutcome::Empty => None,
        }
    }
}

/// One of the 81 padded sub-images of a rectified grid
#[derive(Debug, Clone)]
pub struct Cell {
    /// Row in `0..9`
    pub row: usize,
    /// Column in `0..9`
    pub col: usize,
    /// Padded (and possibly upscaled) cell raster
    pub image: RgbaImage,
    /// Recognition outcome; `Empty` until recognized
    pub outcome: CellOutcome,
}

impl Cell {
    /// Create an unrecognized cell
    pub fn new(row: usize, col: usize, image: RgbaImage) -> Self {
        Self {
            row,
            col,
            image,
            outcome: CellOutcome::Empty,
        }
    }

    /// Row-major index `row * 9 + col`
    pub fn index(&self) -> usize {
        self.row * super::GRID_SIZE + self.col
    }
}
