//! Inverse-warp a source raster into an axis-aligned square
use image::{Rgba, RgbaImage};
use log::debug;
use rayon::prelude::*;

use crate::error::GeometryError;
use crate::models::Quad;
use crate::utils::geometry::Homography;

/// Round half up, matching how screen-space pixel centers are usually snapped
#[inline]
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Rectify the region inside `quad` into a new `width x height` raster.
pub fn rectify_quad(
    source: &RgbaImage,
    quad: &Quad,
    width: u32,
    height: u32,
    background: Rgba<u8>,
) -> Result<RgbaImage, GeometryError> {
    let homography = Homography::to_square(quad, width, height)?;
    debug!(
        "rectify: {}x{} source -> {}x{} square, h = {:?}",
        source.width(),
        source.height(),
        width,
        height,
        homography.coefficients()
    );
    Ok(rectify(source, &homography, width, height, background))
}

/// Sample `source` through `homography` into a new `width x height` raster.
///
/// `homography` maps destination pixel coordinates to source coordinates.
/// Sampling is nearest-neighbor; destinations that land outside the source
/// keep `background`.
pub fn rectify(
    source: &RgbaImage,
    homography: &Homography,
    width: u32,
    height: u32,
    background: Rgba<u8>,
) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(width, height, background);
    rectify_into(source, homography, &mut out, background);
    out
}

/// Like [`rectify`] but writes into a caller-owned raster (no allocation)
pub fn rectify_into(
    source: &RgbaImage,
    homography: &Homography,
    out: &mut RgbaImage,
    background: Rgba<u8>,
) {
    let out_width = out.width() as usize;
    if out_width == 0 || out.height() == 0 {
        return;
    }
    let src_width = source.width() as usize;
    let src_height = source.height() as usize;
    let src: &[u8] = source.as_raw();
    let stride = out_width * 4;
    let dst: &mut [u8] = &mut **out;

    dst.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(v, row)| {
            let v = v as f64;
            for (u, px) in row.chunks_exact_mut(4).enumerate() {
                let sample = homography.apply(u as f64, v).and_then(|(x, y)| {
                    let sx = round_half_up(x);
                    let sy = round_half_up(y);
                    if sx >= 0.0 && sy >= 0.0 && sx < src_width as f64 && sy < src_height as f64 {
                        Some((sy as usize * src_width + sx as usize) * 4)
                    } else {
                        None
                    }
                });
                match sample {
                    Some(idx) => {
                        px[0] = src[idx];
                        px[1] = src[idx + 1];
                        px[2] = src[idx + 2];
                        px[3] = 255;
                    }
                    None => px.copy_from_slice(&background.0),
                }
            }
        });
}
