use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::cancel::CancelToken;
use super::session::SessionGuard;
use super::{Recognition, RecognitionEngine, RecognitionSession, SessionParams};
use crate::error::{ImportError, RecognitionError};
use crate::models::{CELL_COUNT, Cell, CellOutcome, Grid};

/// Apply the acceptance policy to one engine result.
///
/// A digit is accepted only if the trimmed text parses as an integer in
/// `1..=9` and `confidence > threshold`. Anything ambiguous is `Empty`: a
/// missed digit is cheap to fix by hand, a wrong one corrupts the puzzle.
pub fn accept(recognition: &Recognition, threshold: f32) -> CellOutcome {
    let Ok(value) = recognition.text.trim().parse::<u8>() else {
        return CellOutcome::Empty;
    };
    if (1..=9).contains(&value) && recognition.confidence > threshold {
        CellOutcome::Digit {
            value,
            confidence: recognition.confidence,
        }
    } else {
        CellOutcome::Empty
    }
}

/// Result of a recognition batch
#[derive(Debug, Clone)]
pub struct RecognitionSummary {
    /// Assembled grid, always 81 entries
    pub grid: Grid,
    /// Cells that produced an accepted digit
    pub accepted: usize,
    /// Cells whose result failed the acceptance policy
    pub rejected: usize,
    /// Cells the engine failed on (recorded as empty)
    pub cell_errors: usize,
    /// Wall time spent in the batch, session startup included
    pub elapsed: Duration,
}

/// Recognize all 81 cells sequentially with a single engine session.
///
/// `cells` must hold the 81 segmenter outputs; each cell's `outcome` is
/// overwritten. `cancel` is checked before each request and after each
/// response, so a cancelled attempt never yields a grid. The session is
/// terminated exactly once whatever the outcome.
pub fn recognize_cells<E: RecognitionEngine>(
    engine: &E,
    cells: &mut [Cell],
    threshold: f32,
    cancel: &CancelToken,
) -> Result<RecognitionSummary, ImportError> {
    if cells.len() != CELL_COUNT {
        return Err(ImportError::invalid_input(format!(
            "expected {} cells, got {}",
            CELL_COUNT,
            cells.len()
        )));
    }
    let start = Instant::now();
    let cancelled = || ImportError::Cancelled {
        attempt: cancel.attempt(),
    };

    if cancel.is_cancelled() {
        return Err(cancelled());
    }

    let session = engine
        .start_session(&SessionParams::default())
        .map_err(|err| ImportError::RecognitionUnavailable(err.to_string()))?;
    let mut session = SessionGuard::new(session);
    debug!("recognition session started in {:?}", start.elapsed());

    let mut summary = RecognitionSummary {
        grid: Grid::empty(),
        accepted: 0,
        rejected: 0,
        cell_errors: 0,
        elapsed: Duration::ZERO,
    };

    for (done, cell) in cells.iter_mut().enumerate() {
        if cancel.is_cancelled() {
            info!(
                "attempt {} cancelled after {} of {} cells",
                cancel.attempt(),
                done,
                CELL_COUNT
            );
            return Err(cancelled());
        }

        let result = session.recognize(&cell.image);

        // Whatever came back belongs to an abandoned attempt
        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        cell.outcome = match result {
            Ok(recognition) => {
                let outcome = accept(&recognition, threshold);
                match outcome {
                    CellOutcome::Digit { .. } => summary.accepted += 1,
                    CellOutcome::Empty if !recognition.text.trim().is_empty() => {
                        summary.rejected += 1;
                        debug!(
                            "cell ({}, {}) rejected: {:?} at {:.1}",
                            cell.row, cell.col, recognition.text, recognition.confidence
                        );
                    }
                    CellOutcome::Empty => {}
                }
                outcome
            }
            Err(RecognitionError::Cell(message)) => {
                warn!("cell ({}, {}) recognition failed: {}", cell.row, cell.col, message);
                summary.cell_errors += 1;
                CellOutcome::Empty
            }
            Err(RecognitionError::SessionLost(message))
            | Err(RecognitionError::Unavailable(message)) => {
                return Err(ImportError::RecognitionFailed {
                    cells_done: done,
                    message,
                });
            }
        };
    }

    drop(session);

    for cell in cells.iter() {
        summary.grid.set(cell.row, cell.col, cell.outcome.digit());
    }
    summary.elapsed = start.elapsed();
    info!(
        "recognized {} digits ({} rejected, {} errors) in {:?}",
        summary.accepted, summary.rejected, summary.cell_errors, summary.elapsed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::PageSegmentation;
    use image::RgbaImage;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    fn blank_cells() -> Vec<Cell> {
        (0..CELL_COUNT)
            .map(|i| Cell::new(i / 9, i % 9, RgbaImage::new(2, 2)))
            .collect()
    }

    #[derive(Default)]
    struct Log {
        started: usize,
        terminated: usize,
        calls: usize,
    }

    struct Scripted {
        script: RefCell<VecDeque<Result<Recognition, RecognitionError>>>,
        log: Rc<RefCell<Log>>,
    }

    struct ScriptedSession {
        script: VecDeque<Result<Recognition, RecognitionError>>,
        log: Rc<RefCell<Log>>,
    }

    impl RecognitionEngine for Scripted {
        type Session = ScriptedSession;

        fn start_session(&self, params: &SessionParams) -> Result<ScriptedSession, RecognitionError> {
            assert_eq!(params.whitelist, "123456789");
            assert_eq!(params.segmentation, PageSegmentation::SingleChar);
            self.log.borrow_mut().started += 1;
            Ok(ScriptedSession {
                script: self.script.take(),
                log: self.log.clone(),
            })
        }
    }

    impl RecognitionSession for ScriptedSession {
        fn recognize(&mut self, _image: &RgbaImage) -> Result<Recognition, RecognitionError> {
            self.log.borrow_mut().calls += 1;
            self.script
                .pop_front()
                .unwrap_or_else(|| Ok(Recognition::new("", 0.0)))
        }

        fn terminate(&mut self) {
            self.log.borrow_mut().terminated += 1;
        }
    }

    fn scripted(
        script: Vec<Result<Recognition, RecognitionError>>,
    ) -> (Scripted, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        (
            Scripted {
                script: RefCell::new(script.into()),
                log: log.clone(),
            },
            log,
        )
    }

    #[test]
    fn test_accept_policy() {
        assert_eq!(
            accept(&Recognition::new("7\n", 91.0), 50.0),
            CellOutcome::Digit {
                value: 7,
                confidence: 91.0
            }
        );
        // Exactly at the threshold is rejected
        assert_eq!(accept(&Recognition::new("7", 50.0), 50.0), CellOutcome::Empty);
        assert_eq!(accept(&Recognition::new("0", 99.0), 50.0), CellOutcome::Empty);
        assert_eq!(accept(&Recognition::new("12", 99.0), 50.0), CellOutcome::Empty);
        assert_eq!(accept(&Recognition::new("x", 99.0), 50.0), CellOutcome::Empty);
        assert_eq!(accept(&Recognition::new("", 99.0), 50.0), CellOutcome::Empty);
        assert_eq!(accept(&Recognition::new("3", f32::NAN), 50.0), CellOutcome::Empty);
    }

    #[test]
    fn test_threshold_monotonic() {
        let results: Vec<Recognition> = (0..=100)
            .map(|c| Recognition::new(((c % 9) + 1).to_string(), c as f32))
            .collect();
        let mut previous: Option<Vec<CellOutcome>> = None;
        for threshold in (0..=100).step_by(5) {
            let outcomes: Vec<CellOutcome> =
                results.iter().map(|r| accept(r, threshold as f32)).collect();
            if let Some(prev) = &previous {
                for (before, after) in prev.iter().zip(outcomes.iter()) {
                    // Raising the threshold never turns Empty into a digit
                    if before.digit().is_none() {
                        assert!(after.digit().is_none());
                    }
                }
            }
            previous = Some(outcomes);
        }
    }

    #[test]
    fn test_batch_assembles_grid() {
        let mut script = vec![Ok(Recognition::new("5", 88.0)), Ok(Recognition::new("3", 40.0))];
        script.push(Err(RecognitionError::Cell("blurry".into())));
        let (engine, log) = scripted(script);
        let mut cells = blank_cells();

        let summary = recognize_cells(&engine, &mut cells, 50.0, &CancelToken::new()).unwrap();
        assert_eq!(summary.grid.len(), 81);
        assert_eq!(summary.grid.get(0, 0), Some(5));
        assert_eq!(summary.grid.get(0, 1), None);
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.cell_errors, 1);

        let log = log.borrow();
        assert_eq!(log.started, 1);
        assert_eq!(log.calls, 81);
        assert_eq!(log.terminated, 1);
    }

    #[test]
    fn test_session_lost_is_fatal() {
        let mut script: Vec<_> = (0..10).map(|_| Ok(Recognition::new("1", 90.0))).collect();
        script.push(Err(RecognitionError::SessionLost("engine crashed".into())));
        let (engine, log) = scripted(script);

        let err = recognize_cells(&engine, &mut blank_cells(), 50.0, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, ImportError::RecognitionFailed { cells_done: 10, .. }));
        assert_eq!(log.borrow().terminated, 1);
    }

    #[test]
    fn test_unavailable_engine() {
        struct Broken;
        impl RecognitionEngine for Broken {
            type Session = ScriptedSession;
            fn start_session(&self, _: &SessionParams) -> Result<ScriptedSession, RecognitionError> {
                Err(RecognitionError::Unavailable("no language data".into()))
            }
        }
        let err = recognize_cells(&Broken, &mut blank_cells(), 50.0, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, ImportError::RecognitionUnavailable(_)));
        assert!(err.suggests_manual_entry());
    }

    #[test]
    fn test_wrong_cell_count() {
        let (engine, log) = scripted(Vec::new());
        let mut cells = blank_cells();
        cells.truncate(80);
        assert!(recognize_cells(&engine, &mut cells, 50.0, &CancelToken::new()).is_err());
        assert_eq!(log.borrow().started, 0);
    }

    #[test]
    fn test_pre_cancelled_never_starts_session() {
        let (engine, log) = scripted(Vec::new());
        let token = CancelToken::new();
        token.cancel();
        let err = recognize_cells(&engine, &mut blank_cells(), 50.0, &token).unwrap_err();
        assert!(matches!(err, ImportError::Cancelled { .. }));
        assert_eq!(log.borrow().started, 0);
    }
}
