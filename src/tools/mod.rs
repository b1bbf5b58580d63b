//! Helpers shared by the CLI, integration tests, and benches.

use std::env;
use std::path::Path;

use image::{GenericImageView, RgbaImage};

use crate::error::ImportError;
use crate::models::{Point, Quad};
use crate::utils::grayscale::rgba_to_luma;

fn max_dim_from_env() -> Option<u32> {
    match env::var("SUDOKU_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Shrink `img` so its longest side is at most `max_dim`.
///
/// Returns the raster and the factor from original to returned pixel
/// coordinates (1.0 when untouched).
fn fit_max_dim(img: image::DynamicImage, max_dim: Option<u32>) -> (RgbaImage, f64) {
    if let Some(max_dim) = max_dim {
        let (w, h) = img.dimensions();
        if w.max(h) > max_dim {
            let resized = img
                .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
                .to_rgba8();
            let scale = resized.width() as f64 / w as f64;
            return (resized, scale);
        }
    }
    (img.to_rgba8(), 1.0)
}

/// Decode an uploaded or captured image into an RGBA raster.
///
/// The raster keeps the encoded pixel dimensions, so corner points picked on
/// the original image apply to it unchanged.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, ImportError> {
    let img = image::load_from_memory(bytes).map_err(ImportError::ImageDecode)?;
    Ok(img.to_rgba8())
}

/// Load an image file as an RGBA raster, capped by `SUDOKU_MAX_DIM`.
///
/// Also returns the scale from original to loaded pixel coordinates; corner
/// points given on the original file must be scaled by it (see [`Quad::scaled`]).
pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<(RgbaImage, f64), ImportError> {
    let img = image::open(path).map_err(ImportError::ImageDecode)?;
    Ok(fit_max_dim(img, max_dim_from_env()))
}

/// Parse `x,y x,y x,y x,y` (TL, TR, BR, BL). Separators may be spaces or `;`.
pub fn parse_quad(text: &str) -> Option<Quad> {
    let mut points = [Point::default(); 4];
    let mut count = 0;
    for pair in text.split(|c: char| c == ';' || c.is_whitespace()).filter(|s| !s.is_empty()) {
        let (x, y) = pair.split_once(',')?;
        let point = Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?);
        if count == 4 {
            return None;
        }
        points[count] = point;
        count += 1;
    }
    (count == 4).then(|| Quad::new(points))
}

/// Format a quad the way [`parse_quad`] reads it
pub fn format_quad(quad: &Quad) -> String {
    quad.points()
        .iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum luminance.
    pub min: u8,
    /// Maximum luminance.
    pub max: u8,
    /// Average luminance.
    pub avg: u8,
}

/// Compute luminance statistics of a raster.
pub fn gray_stats(image: &RgbaImage) -> GrayStats {
    let luma = rgba_to_luma(image);
    if luma.is_empty() {
        return GrayStats { min: 0, max: 0, avg: 0 };
    }
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum = 0u64;
    for &v in &luma {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    GrayStats {
        min,
        max,
        avg: (sum / luma.len() as u64) as u8,
    }
}
