#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgba, RgbaImage};
use sudoku_scan::recognition::{PageSegmentation, SessionParams};
use sudoku_scan::utils::geometry::Homography;
use sudoku_scan::{Grid, Quad, Recognition, RecognitionEngine, RecognitionError, RecognitionSession};

/// Classic puzzle with 30 givens
pub const PUZZLE: &str =
    "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79";

/// Side of the canonical rendered grid
pub const CANONICAL: u32 = 900;

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TABLE: Rgba<u8> = Rgba([120, 110, 100, 255]);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn puzzle() -> Grid {
    PUZZLE.parse().expect("reference puzzle parses")
}

/// Whether canonical point `(x, y)` is ink for `grid`.
///
/// Cells are 100 px. Grid lines are 2 px wide on each side of every
/// multiple of 100. Digit `n` is drawn as `n` vertical bars, 4 px wide with
/// 4 px gaps, centered in the cell and covering rows 30..70.
fn canonical_ink(grid: &Grid, x: f64, y: f64) -> bool {
    if x < 0.0 || y < 0.0 || x >= CANONICAL as f64 || y >= CANONICAL as f64 {
        return false;
    }
    let (xi, yi) = (x as u32, y as u32);
    if xi % 100 < 2 || xi % 100 >= 98 || yi % 100 < 2 || yi % 100 >= 98 {
        return true;
    }
    let (row, col) = ((yi / 100) as usize, (xi / 100) as usize);
    let Some(n) = grid.get(row, col) else {
        return false;
    };
    let (lx, ly) = (xi % 100, yi % 100);
    if !(30..70).contains(&ly) {
        return false;
    }
    let n = n as u32;
    let start = 52 - 4 * n;
    let end = start + 8 * n - 4;
    (start..end).contains(&lx) && (lx - start) % 8 < 4
}

/// Render `grid` as a flat 900x900 scan
pub fn render_grid(grid: &Grid) -> RgbaImage {
    RgbaImage::from_fn(CANONICAL, CANONICAL, |x, y| {
        if canonical_ink(grid, x as f64, y as f64) {
            INK
        } else {
            PAPER
        }
    })
}

/// Render `grid` as a photo where the grid's corners land on `quad`
pub fn render_photo(grid: &Grid, width: u32, height: u32, quad: &Quad) -> RgbaImage {
    let to_canonical = Homography::from_quads(quad, &Quad::rect(CANONICAL as f64, CANONICAL as f64))
        .expect("photo quad is well formed");
    RgbaImage::from_fn(width, height, |x, y| {
        match to_canonical.apply(x as f64 + 0.5, y as f64 + 0.5) {
            Some((cx, cy))
                if cx >= 0.0 && cy >= 0.0 && cx < CANONICAL as f64 && cy < CANONICAL as f64 =>
            {
                if canonical_ink(grid, cx, cy) { INK } else { PAPER }
            }
            _ => TABLE,
        }
    })
}

/// Number of dark runs along the middle row of a cell image
pub fn count_bars(image: &RgbaImage) -> usize {
    if image.width() == 0 || image.height() == 0 {
        return 0;
    }
    let y = image.height() / 2;
    let mut runs = 0;
    let mut in_run = false;
    for x in 0..image.width() {
        let dark = image.get_pixel(x, y)[0] < 128;
        if dark && !in_run {
            runs += 1;
        }
        in_run = dark;
    }
    runs
}

/// Session and call counters shared with the test body
#[derive(Debug, Default)]
pub struct Counters {
    pub sessions: AtomicUsize,
    pub calls: AtomicUsize,
    pub terminated: AtomicUsize,
}

impl Counters {
    pub fn sessions(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

type Hook = Arc<dyn Fn(usize) + Send + Sync>;
type Confidence = Arc<dyn Fn(usize) -> f32 + Send + Sync>;

/// Recognizer for [`render_grid`] output: reads a digit as its bar count
#[derive(Clone)]
pub struct BarReader {
    pub counters: Arc<Counters>,
    confidence: Confidence,
    hook: Option<Hook>,
    fail_start: bool,
}

impl BarReader {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            confidence: Arc::new(|_| 90.0),
            hook: None,
            fail_start: false,
        }
    }

    /// Confidence reported for the `n`th call (0-based, row-major)
    pub fn with_confidence(mut self, f: impl Fn(usize) -> f32 + Send + Sync + 'static) -> Self {
        self.confidence = Arc::new(f);
        self
    }

    /// Run `f(n)` inside the `n`th call (1-based) before answering
    pub fn with_hook(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(f));
        self
    }

    /// Refuse to start a session
    pub fn unavailable(mut self) -> Self {
        self.fail_start = true;
        self
    }
}

pub struct BarSession {
    reader: BarReader,
}

impl RecognitionEngine for BarReader {
    type Session = BarSession;

    fn start_session(&self, params: &SessionParams) -> Result<BarSession, RecognitionError> {
        if self.fail_start {
            return Err(RecognitionError::Unavailable("language data missing".into()));
        }
        assert_eq!(params.whitelist, "123456789");
        assert_eq!(params.segmentation, PageSegmentation::SingleChar);
        self.counters.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(BarSession {
            reader: self.clone(),
        })
    }
}

impl RecognitionSession for BarSession {
    fn recognize(&mut self, image: &RgbaImage) -> Result<Recognition, RecognitionError> {
        let index = self.reader.counters.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.reader.hook {
            hook(index + 1);
        }
        let bars = count_bars(image);
        if (1..=9).contains(&bars) {
            Ok(Recognition::new(
                format!("{}\n", bars),
                (self.reader.confidence)(index),
            ))
        } else {
            Ok(Recognition::new("", 0.0))
        }
    }

    fn terminate(&mut self) {
        self.reader.counters.terminated.fetch_add(1, Ordering::SeqCst);
    }
}

/// Recognizer that fails every request in a chosen way
pub struct FailingReader {
    pub counters: Arc<Counters>,
    lose_session_at: Option<usize>,
}

impl FailingReader {
    /// Every cell fails on its own; the session stays usable
    pub fn per_cell() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            lose_session_at: None,
        }
    }

    /// The session dies on the `n`th call (1-based)
    pub fn lost_at(n: usize) -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            lose_session_at: Some(n),
        }
    }
}

pub struct FailingSession {
    counters: Arc<Counters>,
    lose_session_at: Option<usize>,
}

impl RecognitionEngine for FailingReader {
    type Session = FailingSession;

    fn start_session(&self, _params: &SessionParams) -> Result<FailingSession, RecognitionError> {
        self.counters.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(FailingSession {
            counters: self.counters.clone(),
            lose_session_at: self.lose_session_at,
        })
    }
}

impl RecognitionSession for FailingSession {
    fn recognize(&mut self, _image: &RgbaImage) -> Result<Recognition, RecognitionError> {
        let n = self.counters.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.lose_session_at {
            Some(at) if n >= at => Err(RecognitionError::SessionLost("worker exited".into())),
            Some(_) => Ok(Recognition::new("4", 95.0)),
            None => Err(RecognitionError::Cell("page segmentation failed".into())),
        }
    }

    fn terminate(&mut self) {
        self.counters.terminated.fetch_add(1, Ordering::SeqCst);
    }
}
