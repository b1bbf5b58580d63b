//! Digit recognition against an external engine.
//!
//! The engine itself is a collaborator: something that can open a session,
//! read one character from a small raster, and shut the session down. This
//! module owns the lifecycle around it (one session per batch, released on
//! every exit path), the acceptance policy, and attempt cancellation.

pub mod cancel;
pub mod orchestrator;
pub mod session;

pub use cancel::{AttemptTicket, CancelToken, ConcurrencyPolicy, ImportCoordinator};
pub use orchestrator::{RecognitionSummary, accept, recognize_cells};
pub use session::SessionGuard;

use image::RgbaImage;

use crate::error::RecognitionError;

/// Characters the engine is allowed to emit for grid cells
pub const DIGIT_WHITELIST: &str = "123456789";

/// How the engine should segment its input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSegmentation {
    /// Treat the whole image as one character
    #[default]
    SingleChar,
}

/// Parameters applied once when a session starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Allowed output characters
    pub whitelist: String,
    /// Segmentation mode
    pub segmentation: PageSegmentation,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            whitelist: DIGIT_WHITELIST.to_string(),
            segmentation: PageSegmentation::SingleChar,
        }
    }
}

/// Engine's best guess for one image
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// Raw text, possibly with whitespace
    pub text: String,
    /// Self-reported confidence, 0..100
    pub confidence: f32,
}

impl Recognition {
    /// Create a recognition result
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// An initialized, stateful recognition session.
///
/// Sessions are used from one thread at a time; calls are issued strictly
/// one after another.
pub trait RecognitionSession {
    /// Recognize a single character in `image`.
    ///
    /// Return [`RecognitionError::Cell`] for failures confined to this image
    /// and [`RecognitionError::SessionLost`] when the session can no longer
    /// serve requests.
    fn recognize(&mut self, image: &RgbaImage) -> Result<Recognition, RecognitionError>;

    /// Release engine resources. Called exactly once by [`SessionGuard`].
    fn terminate(&mut self);
}

/// Factory for recognition sessions
pub trait RecognitionEngine {
    /// Session type produced by this engine
    type Session: RecognitionSession;

    /// Start a session; startup cost is expected to dominate per-call cost
    fn start_session(&self, params: &SessionParams) -> Result<Self::Session, RecognitionError>;
}
