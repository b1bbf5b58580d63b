//! Error types for the grid import pipeline.
//!
//! Geometry and decode failures abort an attempt before recognition starts.
//! Recognition failures are split by scope: a failed cell folds into an empty
//! reading, a failed session aborts the attempt.

use thiserror::Error;

/// No usable pivot was found while eliminating a linear system
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("singular matrix: no pivot above {epsilon:e} in column {column}")]
pub struct SingularMatrixError {
    /// Elimination column where the pivot search failed
    pub column: usize,
    /// Pivot magnitude threshold
    pub epsilon: f64,
}

/// The corner quad cannot be mapped onto a square
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Three or more corners are collinear or coincident
    #[error("degenerate quad: corners are collinear or coincident")]
    DegenerateQuad,
    /// The 8x8 homography system has no unique solution
    #[error("homography solve failed")]
    Singular(#[from] SingularMatrixError),
    /// The solved transform maps part of the target square to infinity
    #[error("homography is not finite over the output square")]
    NonFinite,
}

/// Failures reported by a recognition engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// The engine could not start a session
    #[error("recognition engine unavailable: {0}")]
    Unavailable(String),
    /// A single cell could not be recognized; the session is still usable
    #[error("cell recognition failed: {0}")]
    Cell(String),
    /// The session broke and cannot serve further requests
    #[error("recognition session lost: {0}")]
    SessionLost(String),
}

/// Errors that abort a grid import attempt
#[derive(Debug, Error)]
pub enum ImportError {
    /// Corner quad is unusable
    #[error("cannot rectify: {0}")]
    Geometry(#[from] GeometryError),

    /// Source bytes could not be decoded into a raster
    #[error("image decode")]
    ImageDecode(#[source] image::ImageError),

    /// The recognition engine failed to initialize
    #[error("recognition unavailable: {0}")]
    RecognitionUnavailable(String),

    /// The recognition session became unusable mid-batch
    #[error("recognition failed after {cells_done} cells: {message}")]
    RecognitionFailed {
        /// Cells completed before the session broke
        cells_done: usize,
        /// Engine-provided detail
        message: String,
    },

    /// The attempt was cancelled before it finished
    #[error("import attempt {attempt} cancelled")]
    Cancelled {
        /// Identity of the cancelled attempt
        attempt: u64,
    },

    /// A newer attempt replaced this one; its result was discarded
    #[error("import attempt {attempt} superseded by attempt {current}")]
    Superseded {
        /// Identity of the discarded attempt
        attempt: u64,
        /// Identity of the attempt now in flight
        current: u64,
    },

    /// Another attempt is still in flight
    #[error("import attempt {in_flight} still in flight")]
    Busy {
        /// Identity of the in-flight attempt
        in_flight: u64,
    },

    /// Configuration values out of range
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong
        message: String,
    },

    /// Caller-supplied data is unusable
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What is wrong
        message: String,
    },
}

impl ImportError {
    /// Short message suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            ImportError::Geometry(_) => "Cannot rectify the grid. Re-select the corners.",
            ImportError::RecognitionUnavailable(_) | ImportError::RecognitionFailed { .. } => {
                "Recognition unavailable. Enter the puzzle manually."
            }
            ImportError::Cancelled { .. } | ImportError::Superseded { .. } => "Import cancelled.",
            ImportError::Busy { .. } => "An import is already in progress.",
            ImportError::ImageDecode(_)
            | ImportError::InvalidConfig { .. }
            | ImportError::InvalidInput { .. } => "Failed to process image. Please try again.",
        }
    }

    /// Whether the caller should offer manual entry instead of retrying
    pub fn suggests_manual_entry(&self) -> bool {
        matches!(
            self,
            ImportError::RecognitionUnavailable(_) | ImportError::RecognitionFailed { .. }
        )
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        ImportError::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        ImportError::InvalidInput {
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for ImportError {
    fn from(err: image::ImageError) -> Self {
        ImportError::ImageDecode(err)
    }
}
