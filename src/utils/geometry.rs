//! Homography estimation from four point correspondences
use crate::error::GeometryError;
use crate::models::{Point, Quad};
use crate::utils::linear::solve;

/// Sine-of-angle tolerance below which three corners count as collinear
pub const COLLINEAR_TOLERANCE: f64 = 1e-6;

/// Homogeneous `w` magnitudes at or below this are treated as zero
const W_EPSILON: f64 = 1e-12;

/// Projective transform, row-major `h0..h8` with `h8 == 1`
///
/// Maps a destination point `(u, v)` to the source point
/// `((h0*u + h1*v + h2) / w, (h3*u + h4*v + h5) / w)` where
/// `w = h6*u + h7*v + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    h: [f64; 9],
}

impl Homography {
    /// Identity transform
    pub fn identity() -> Self {
        Self {
            h: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Estimate the transform taking each `dest` corner onto the matching `src` corner.
    ///
    /// Both quads are in (TL, TR, BR, BL) order. Four correspondences give an
    /// exactly determined 8x8 system in `h0..h7`, one pair of rows per corner:
    ///
    /// ```text
    /// h0*x + h1*y + h2 - h6*x*u - h7*y*u = u
    /// h3*x + h4*y + h5 - h6*x*v - h7*y*v = v
    /// ```
    ///
    /// with `(x, y)` the destination point and `(u, v)` the source point.
    pub fn from_quads(dest: &Quad, src: &Quad) -> Result<Self, GeometryError> {
        if dest.is_degenerate(COLLINEAR_TOLERANCE) || src.is_degenerate(COLLINEAR_TOLERANCE) {
            return Err(GeometryError::DegenerateQuad);
        }

        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];

        for (i, (d, s)) in dest.points().iter().zip(src.points().iter()).enumerate() {
            let (x, y) = (d.x, d.y);
            let (u, v) = (s.x, s.y);

            let row = i * 2;
            a[row] = [x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u];
            b[row] = u;
            a[row + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v];
            b[row + 1] = v;
        }

        let h = solve(&a, &b)?;
        let homography = Self {
            h: [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0],
        };

        if homography.h.iter().any(|c| !c.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        Ok(homography)
    }

    /// Transform mapping the `width x height` output square onto `src`
    pub fn to_square(src: &Quad, width: u32, height: u32) -> Result<Self, GeometryError> {
        let dest = Quad::rect(width as f64, height as f64);
        let homography = Self::from_quads(&dest, src)?;
        // w must not cross zero inside the output, otherwise the quad folds over itself
        let ws = dest.points().map(|p| homography.w(p.x, p.y));
        if ws.iter().any(|w| w.abs() <= W_EPSILON)
            || !(ws.iter().all(|w| *w > 0.0) || ws.iter().all(|w| *w < 0.0))
        {
            return Err(GeometryError::NonFinite);
        }
        Ok(homography)
    }

    /// Coefficients `h0..h8`
    pub fn coefficients(&self) -> &[f64; 9] {
        &self.h
    }

    #[inline]
    fn w(&self, u: f64, v: f64) -> f64 {
        self.h[6] * u + self.h[7] * v + self.h[8]
    }

    /// Map a destination point to source coordinates; `None` when `w` vanishes
    #[inline]
    pub fn apply(&self, u: f64, v: f64) -> Option<(f64, f64)> {
        let w = self.w(u, v);
        if w.abs() <= W_EPSILON {
            return None;
        }
        let x = (self.h[0] * u + self.h[1] * v + self.h[2]) / w;
        let y = (self.h[3] * u + self.h[4] * v + self.h[5]) / w;
        Some((x, y))
    }

    /// Map a destination [`Point`] to a source [`Point`]
    pub fn transform(&self, p: &Point) -> Option<Point> {
        self.apply(p.x, p.y).map(|(x, y)| Point::new(x, y))
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}
