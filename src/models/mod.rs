pub mod cell;
pub mod grid;
pub mod point;

pub use cell::{Cell, CellOutcome};
pub use grid::{CELL_COUNT, Conflict, GRID_SIZE, Grid, ParseGridError};
pub use point::{Corner, Point, Quad};

/// Source and rectified raster type (8-bit RGBA)
pub type RasterImage = image::RgbaImage;
