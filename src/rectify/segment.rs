//! Slice a rectified grid into 81 padded cell images
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::models::{CELL_COUNT, Cell, GRID_SIZE};

/// Pixel bounds of one padded cell inside the rectified raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width, at least 1
    pub width: u32,
    /// Height, at least 1
    pub height: u32,
}

/// Bounds of cell `(row, col)` after trimming `padding` of the cell size from every side
pub fn cell_rect(width: u32, height: u32, row: usize, col: usize, padding: f32) -> CellRect {
    let cell_w = width as f64 / GRID_SIZE as f64;
    let cell_h = height as f64 / GRID_SIZE as f64;
    let pad_x = cell_w * padding as f64;
    let pad_y = cell_h * padding as f64;

    let (x, w) = span(col as f64 * cell_w + pad_x, (col + 1) as f64 * cell_w - pad_x, width);
    let (y, h) = span(row as f64 * cell_h + pad_y, (row + 1) as f64 * cell_h - pad_y, height);

    CellRect {
        x,
        y,
        width: w,
        height: h,
    }
}

/// Round `[start, end)` to whole pixels inside `[0, limit)`, never empty
fn span(start: f64, end: f64, limit: u32) -> (u32, u32) {
    let last = limit.saturating_sub(1);
    let lo = (start.round().max(0.0) as u32).min(last);
    let hi = (end.round().max(0.0) as u32).min(limit);
    (lo, hi.saturating_sub(lo).max(1))
}

/// Composite onto opaque white so transparent rectifier fill reads as paper
fn flatten_on_white(image: &mut RgbaImage) {
    for px in image.pixels_mut() {
        let a = px[3] as u32;
        if a == 255 {
            continue;
        }
        for c in 0..3 {
            px[c] = ((px[c] as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        }
        px[3] = 255;
    }
}

/// Crop, flatten and upscale a single cell
pub fn extract_cell(
    image: &RgbaImage,
    row: usize,
    col: usize,
    padding: f32,
    upscale: u32,
) -> RgbaImage {
    let rect = cell_rect(image.width(), image.height(), row, col, padding);
    let mut cell = imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image();
    flatten_on_white(&mut cell);
    if upscale > 1 {
        match (rect.width.checked_mul(upscale), rect.height.checked_mul(upscale)) {
            (Some(width), Some(height)) => {
                cell = imageops::resize(&cell, width, height, FilterType::Nearest);
            }
            _ => log::warn!(
                "cell ({}, {}) upscale x{} overflows {}x{}, keeping native size",
                row,
                col,
                upscale,
                rect.width,
                rect.height
            ),
        }
    }
    cell
}

/// Split `image` into 81 cells in row-major order.
///
/// The raster is assumed to be an axis-aligned 9x9 grid. Each cell is
/// trimmed by `padding` (fraction of the cell size, per side) to keep grid
/// lines out, then upscaled by `upscale` with nearest-neighbor sampling.
pub fn segment(image: &RgbaImage, padding: f32, upscale: u32) -> Vec<Cell> {
    if image.width() == 0 || image.height() == 0 {
        return (0..CELL_COUNT)
            .map(|i| {
                Cell::new(
                    i / GRID_SIZE,
                    i % GRID_SIZE,
                    RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])),
                )
            })
            .collect();
    }
    (0..CELL_COUNT)
        .into_par_iter()
        .map(|i| {
            let (row, col) = (i / GRID_SIZE, i % GRID_SIZE);
            Cell::new(row, col, extract_cell(image, row, col, padding, upscale))
        })
        .collect()
}
