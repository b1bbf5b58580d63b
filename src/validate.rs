//! Post-import checks on a recognized grid.
//!
//! Recognition can misread a digit with high confidence, so an imported grid
//! is checked for duplicate givens and then handed to a solver before it is
//! offered to the player.

use log::debug;
use thiserror::Error;

use crate::models::{Conflict, Grid};

/// External solver contract: complete `grid`, or `None` if it has no solution
pub trait SudokuSolver {
    /// Solve the puzzle
    fn solve(&self, grid: &Grid) -> Option<Grid>;
}

impl<F> SudokuSolver for F
where
    F: Fn(&Grid) -> Option<Grid>,
{
    fn solve(&self, grid: &Grid) -> Option<Grid> {
        self(grid)
    }
}

/// Why an imported grid cannot be played as-is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two givens share a row, column, or box
    #[error("{} conflicting givens", .0.len())]
    Conflicts(Vec<Conflict>),
    /// The givens are consistent but admit no solution
    #[error("puzzle has no solution")]
    Unsolvable,
    /// The solver returned a grid that does not extend the givens
    #[error("solver result disagrees with {0} givens")]
    SolverMismatch(usize),
}

/// Check `grid` for conflicts, then solve it.
///
/// Returns the solver's completed grid. A solution that overwrites any
/// recognized given is rejected.
pub fn validate_import<S: SudokuSolver + ?Sized>(
    grid: &Grid,
    solver: &S,
) -> Result<Grid, ValidationError> {
    let conflicts = grid.conflicts();
    if !conflicts.is_empty() {
        debug!("imported grid has {} conflicts", conflicts.len());
        return Err(ValidationError::Conflicts(conflicts));
    }

    let solution = solver.solve(grid).ok_or(ValidationError::Unsolvable)?;
    let changed = grid
        .iter()
        .zip(solution.iter())
        .filter(|(given, solved)| given.is_some() && given != solved)
        .count();
    if changed > 0 {
        return Err(ValidationError::SolverMismatch(changed));
    }
    Ok(solution)
}
