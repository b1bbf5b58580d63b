//! Rectification stages: perspective warp and cell segmentation

pub mod segment;
pub mod warp;

pub use segment::{CellRect, cell_rect, extract_cell, segment};
pub use warp::{rectify, rectify_into, rectify_quad};
