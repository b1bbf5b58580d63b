//! Interactive corner selection with an explicit confirm step.

use log::debug;

use crate::models::{Corner, Point, Quad};

/// Inset used for the initial handles, as a fraction of each image dimension
pub const DEFAULT_INSET: f64 = 0.1;

/// Corner quad being edited over a source image.
///
/// Updates are clamped to the image bounds and may arrive at any rate. Only
/// [`CornerSelection::confirm`] hands a quad to the pipeline, so nothing is
/// rectified while the user is still dragging.
#[derive(Debug, Clone)]
pub struct CornerSelection {
    width: f64,
    height: f64,
    quad: Quad,
}

impl CornerSelection {
    /// Start with handles inset by [`DEFAULT_INSET`] from the image border
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_quad(width, height, Quad::inset(width as f64, height as f64, DEFAULT_INSET))
    }

    /// Start from a known quad (e.g. from a detector), clamped to the image
    pub fn with_quad(width: u32, height: u32, quad: Quad) -> Self {
        let (w, h) = (width as f64, height as f64);
        let points = quad.points().map(|p| p.clamp_to(w, h));
        Self {
            width: w,
            height: h,
            quad: Quad::new(points),
        }
    }

    /// Move one corner; the point is clamped to `[0, width] x [0, height]`
    pub fn update(&mut self, corner: Corner, point: Point) {
        let clamped = point.clamp_to(self.width, self.height);
        self.quad = self.quad.with_corner(corner, clamped);
    }

    /// Current quad, for drawing handles
    pub fn current(&self) -> &Quad {
        &self.quad
    }

    /// Finish editing and release the quad
    pub fn confirm(self) -> Quad {
        debug!("corners confirmed: {:?}", self.quad.points());
        self.quad
    }
}
