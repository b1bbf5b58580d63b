//! Optional binarization of grayscale rasters
use image::RgbaImage;
use rayon::prelude::*;

use super::grayscale::luminance;

/// Threshold used by [`Binarization::Fixed`] unless configured otherwise
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Binarization policy applied after grayscale conversion
///
/// `None` is the default: a fixed cut destroys faint digits under uneven
/// lighting, and recognition engines binarize internally anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binarization {
    /// Grayscale only
    #[default]
    None,
    /// `255` if `L > threshold`, else `0`
    Fixed(u8),
    /// Global Otsu threshold computed from the raster itself
    Otsu,
}

impl Binarization {
    /// Parse `none`, `fixed`, `fixed:<t>` or `otsu`
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "" | "none" | "off" | "0" => Some(Binarization::None),
            "otsu" => Some(Binarization::Otsu),
            "fixed" | "on" | "1" => Some(Binarization::Fixed(DEFAULT_THRESHOLD)),
            other => other
                .strip_prefix("fixed:")
                .and_then(|t| t.parse::<u8>().ok())
                .map(Binarization::Fixed),
        }
    }
}

/// Apply `policy` in place. Expects a grayscale raster (R == G == B).
pub fn binarize_in_place(image: &mut RgbaImage, policy: Binarization) {
    let threshold = match policy {
        Binarization::None => return,
        Binarization::Fixed(t) => t,
        // Otsu splits at `< t` vs `>= t`; shift so both policies use `L > threshold`
        Binarization::Otsu => otsu_threshold(image).saturating_sub(1),
    };
    threshold_in_place(image, threshold);
}

/// `255` if `L > threshold` else `0`, written to R, G and B
pub fn threshold_in_place(image: &mut RgbaImage, threshold: u8) {
    let stride = image.width() as usize * 4;
    if stride == 0 {
        return;
    }
    let raw: &mut [u8] = &mut **image;
    raw.par_chunks_mut(stride).for_each(|row| {
        for px in row.chunks_exact_mut(4) {
            let v = if px[0] > threshold { 255 } else { 0 };
            px[0] = v;
            px[1] = v;
            px[2] = v;
        }
    });
}

/// Otsu's optimal threshold over the raster's luminance.
///
/// Pixels `< t` form the dark class.
pub fn otsu_threshold(image: &RgbaImage) -> u8 {
    let mut histogram = [0u64; 256];
    for px in image.pixels() {
        histogram[luminance(px[0], px[1], px[2]) as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return DEFAULT_THRESHOLD;
    }
    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut dark_count = 0u64;
    let mut dark_sum = 0.0f64;
    let mut max_variance = 0.0f64;
    let mut optimal = DEFAULT_THRESHOLD;

    for threshold in 1..=255usize {
        let count = histogram[threshold - 1];
        dark_count += count;
        dark_sum += (threshold - 1) as f64 * count as f64;

        let light_count = total - dark_count;
        if dark_count == 0 || light_count == 0 {
            continue;
        }

        let dark_mean = dark_sum / dark_count as f64;
        let light_mean = (sum_all - dark_sum) / light_count as f64;
        let w_dark = dark_count as f64 / total as f64;
        let w_light = light_count as f64 / total as f64;
        let variance = w_dark * w_light * (dark_mean - light_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal = threshold as u8;
        }
    }

    optimal
}
