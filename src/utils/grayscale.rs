//! Convert RGBA rasters to luminance using ITU-R BT.709 weights
//! L = 0.2126*R + 0.7152*G + 0.0722*B
//! Uses 16-bit fixed point: L = (13933*R + 46871*G + 4732*B + 2^15) >> 16
use image::RgbaImage;
use rayon::prelude::*;

/// Coefficients for BT.709 luminance, scaled by 2^16 (they sum to 65536)
const COEF_R: u32 = 13933;
const COEF_G: u32 = 46871;
const COEF_B: u32 = 4732;

/// Luminance of a single RGB triple, rounded to nearest
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32 + (1 << 15)) >> 16;
    lum.min(255) as u8
}

/// Single-channel luminance plane of an RGBA raster
pub fn rgba_to_luma(image: &RgbaImage) -> Vec<u8> {
    let width = image.width() as usize;
    let mut gray = vec![0u8; width * image.height() as usize];
    if width == 0 {
        return gray;
    }
    let raw: &[u8] = image.as_raw();

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 4;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 4;
            *out = luminance(raw[idx], raw[idx + 1], raw[idx + 2]);
        }
    });

    gray
}

/// Grayscale copy of an RGBA raster: R, G and B replaced by luminance, alpha kept.
///
/// The input is not modified.
pub fn to_grayscale(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    grayscale_in_place(&mut out);
    out
}

/// Replace R, G and B with luminance in place, rows in parallel
pub fn grayscale_in_place(image: &mut RgbaImage) {
    let stride = image.width() as usize * 4;
    if stride == 0 {
        return;
    }
    let raw: &mut [u8] = &mut **image;
    raw.par_chunks_mut(stride).for_each(|row| {
        for px in row.chunks_exact_mut(4) {
            let lum = luminance(px[0], px[1], px[2]);
            px[0] = lum;
            px[1] = lum;
            px[2] = lum;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_luminance() {
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(0, 0, 0), 0);
        // 0.2126 * 255 = 54.2
        assert_eq!(luminance(255, 0, 0), 54);
        // 0.7152 * 255 = 182.4
        assert_eq!(luminance(0, 255, 0), 182);
        // 0.0722 * 255 = 18.4
        assert_eq!(luminance(0, 0, 255), 18);
    }

    #[test]
    fn test_to_grayscale_keeps_alpha_and_input() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 0]));
        let gray = to_grayscale(&img);

        assert_eq!(gray.get_pixel(0, 0), &Rgba([54, 54, 54, 255]));
        let p = gray.get_pixel(1, 0);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
        assert_eq!(p[3], 0);
        // Source untouched
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_rgba_to_luma() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([0, 255, 0, 255]));
        let luma = rgba_to_luma(&img);
        assert_eq!(luma.len(), 6);
        assert!(luma.iter().all(|&v| v == 182));
    }
}
