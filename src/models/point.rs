/// 2D point in source-image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp the point into `[0, width] x [0, height]`
    pub fn clamp_to(&self, width: f64, height: f64) -> Self {
        Self {
            x: self.x.clamp(0.0, width.max(0.0)),
            y: self.y.clamp(0.0, height.max(0.0)),
        }
    }

    /// Whether both coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Corner slot of a [`Quad`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// Top-left
    TopLeft = 0,
    /// Top-right
    TopRight = 1,
    /// Bottom-right
    BottomRight = 2,
    /// Bottom-left
    BottomLeft = 3,
}

impl Corner {
    /// All corners in quad order
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];
}

/// Four ordered points: top-left, top-right, bottom-right, bottom-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    points: [Point; 4],
}

impl Quad {
    /// Create a quad from points in (TL, TR, BR, BL) order
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle `(0,0),(w,0),(w,h),(0,h)`
    pub fn rect(width: f64, height: f64) -> Self {
        Self::new([
            Point::new(0.0, 0.0),
            Point::new(width, 0.0),
            Point::new(width, height),
            Point::new(0.0, height),
        ])
    }

    /// Rectangle inset by `fraction` of each dimension from the image border.
    ///
    /// This is where the corner editor places its handles before the user
    /// drags anything.
    pub fn inset(width: f64, height: f64, fraction: f64) -> Self {
        let ix = width * fraction;
        let iy = height * fraction;
        Self::new([
            Point::new(ix, iy),
            Point::new(width - ix, iy),
            Point::new(width - ix, height - iy),
            Point::new(ix, height - iy),
        ])
    }

    /// Points in (TL, TR, BR, BL) order
    pub fn points(&self) -> &[Point; 4] {
        &self.points
    }

    /// Point at a given corner
    pub fn corner(&self, corner: Corner) -> Point {
        self.points[corner as usize]
    }

    /// Replace a single corner
    pub fn with_corner(mut self, corner: Corner, point: Point) -> Self {
        self.points[corner as usize] = point;
        self
    }

    /// Multiply every coordinate by `factor`, e.g. after resizing the source
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.points.map(|p| Point::new(p.x * factor, p.y * factor)))
    }

    /// Whether any three of the four points are collinear or coincident.
    ///
    /// `tolerance` bounds the sine of the angle spanned at the shared vertex.
    pub fn is_degenerate(&self, tolerance: f64) -> bool {
        const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
        if self.points.iter().any(|p| !p.is_finite()) {
            return true;
        }
        TRIPLES.iter().any(|&[a, b, c]| {
            collinear(&self.points[a], &self.points[b], &self.points[c], tolerance)
        })
    }
}

fn collinear(a: &Point, b: &Point, c: &Point, tolerance: f64) -> bool {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let (acx, acy) = (c.x - a.x, c.y - a.y);
    let ab = (abx * abx + aby * aby).sqrt();
    let ac = (acx * acx + acy * acy).sqrt();
    // Coincident points collapse a side entirely
    if ab < 1e-9 || ac < 1e-9 || b.distance(c) < 1e-9 {
        return true;
    }
    let cross = abx * acy - aby * acx;
    (cross / (ab * ac)).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inset_quad() {
        let q = Quad::inset(1000.0, 500.0, 0.1);
        assert_eq!(q.corner(Corner::TopLeft), Point::new(100.0, 50.0));
        assert_eq!(q.corner(Corner::BottomRight), Point::new(900.0, 450.0));
        assert!(!q.is_degenerate(1e-6));
    }

    #[test]
    fn test_collinear_quad_is_degenerate() {
        let q = Quad::new([
            Point::new(10.0, 10.0),
            Point::new(10.0, 50.0),
            Point::new(10.0, 90.0),
            Point::new(10.0, 10.0),
        ]);
        assert!(q.is_degenerate(1e-6));
    }

    #[test]
    fn test_three_collinear_points() {
        // TL, TR and BR on one line; BL off it
        let q = Quad::new([
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
        ]);
        assert!(q.is_degenerate(1e-6));
    }

    #[test]
    fn test_scaled_quad() {
        let q = Quad::rect(900.0, 600.0).scaled(0.5);
        assert_eq!(q.corner(Corner::TopLeft), Point::new(0.0, 0.0));
        assert_eq!(q.corner(Corner::BottomRight), Point::new(450.0, 300.0));
    }

    #[test]
    fn test_clamp() {
        let p = Point::new(-5.0, 120.0).clamp_to(100.0, 100.0);
        assert_eq!(p, Point::new(0.0, 100.0));
    }
}
