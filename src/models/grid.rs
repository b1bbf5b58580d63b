use std::fmt;
use std::str::FromStr;

/// Number of rows (and columns) in a Sudoku grid
pub const GRID_SIZE: usize = 9;
/// Number of cells in a Sudoku grid
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Recognized 9x9 grid, row-major: index `row * 9 + col`
///
/// Always holds exactly 81 entries; `None` marks an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    cells: [Option<u8>; CELL_COUNT],
}

/// Two givens that violate the row/column/box rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    /// Index of the first cell
    pub first: usize,
    /// Index of the second cell
    pub second: usize,
    /// The duplicated digit
    pub digit: u8,
}

impl Grid {
    /// Grid with every cell empty
    pub fn empty() -> Self {
        Self {
            cells: [None; CELL_COUNT],
        }
    }

    /// Build a grid from 81 optional digits. Values outside `1..=9` become empty.
    pub fn from_cells(cells: [Option<u8>; CELL_COUNT]) -> Self {
        let mut grid = Self::empty();
        for (i, value) in cells.into_iter().enumerate() {
            grid.cells[i] = value.filter(|d| (1..=9).contains(d));
        }
        grid
    }

    /// Always 81
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A grid is never empty in the container sense; see [`Grid::filled_count`]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Digit at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return None;
        }
        self.cells[row * GRID_SIZE + col]
    }

    /// Set the digit at `(row, col)`. Out-of-range digits clear the cell.
    pub fn set(&mut self, row: usize, col: usize, value: Option<u8>) {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return;
        }
        self.cells[row * GRID_SIZE + col] = value.filter(|d| (1..=9).contains(d));
    }

    /// Row-major cells
    pub fn as_slice(&self) -> &[Option<u8>] {
        &self.cells
    }

    /// Iterate over row-major cells
    pub fn iter(&self) -> impl Iterator<Item = Option<u8>> + '_ {
        self.cells.iter().copied()
    }

    /// Number of non-empty cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Number of positions where two grids differ
    pub fn mismatches(&self, other: &Grid) -> usize {
        self.cells
            .iter()
            .zip(other.cells.iter())
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Duplicate givens in any row, column, or 3x3 box
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for i in 0..CELL_COUNT {
            let Some(digit) = self.cells[i] else {
                continue;
            };
            for j in (i + 1)..CELL_COUNT {
                if self.cells[j] == Some(digit) && shares_unit(i, j) {
                    conflicts.push(Conflict {
                        first: i,
                        second: j,
                        digit,
                    });
                }
            }
        }
        conflicts
    }
}

fn shares_unit(a: usize, b: usize) -> bool {
    let (ra, ca) = (a / GRID_SIZE, a % GRID_SIZE);
    let (rb, cb) = (b / GRID_SIZE, b % GRID_SIZE);
    ra == rb || ca == cb || (ra / 3 == rb / 3 && ca / 3 == cb / 3)
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                match self.get(row, col) {
                    Some(d) => write!(f, "{}", d)?,
                    None => write!(f, ".")?,
                }
            }
            if row + 1 < GRID_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Error returned when parsing a [`Grid`] from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseGridError {
    /// Wrong number of cell characters
    #[error("expected 81 cells, found {0}")]
    WrongLength(usize),
    /// Character that is neither a digit nor an empty marker
    #[error("invalid cell character {0:?}")]
    InvalidChar(char),
}

impl FromStr for Grid {
    type Err = ParseGridError;

    /// Parses 81 cells of `1-9`, with `.`, `0` or `_` for empty; whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = [None; CELL_COUNT];
        let mut count = 0usize;
        for ch in s.chars().filter(|c| !c.is_whitespace()) {
            let value = match ch {
                '1'..='9' => Some(ch as u8 - b'0'),
                '.' | '0' | '_' => None,
                other => return Err(ParseGridError::InvalidChar(other)),
            };
            if count < CELL_COUNT {
                cells[count] = value;
            }
            count += 1;
        }
        if count != CELL_COUNT {
            return Err(ParseGridError::WrongLength(count));
        }
        Ok(Self { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUZZLE: &str = "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79";

    #[test]
    fn test_parse_and_display() {
        let grid: Grid = PUZZLE.parse().unwrap();
        assert_eq!(grid.len(), 81);
        assert_eq!(grid.get(0, 0), Some(5));
        assert_eq!(grid.get(0, 2), None);
        assert_eq!(grid.filled_count(), 30);
        let text = grid.to_string().replace('\n', "");
        assert_eq!(text, PUZZLE);
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(
            "123".parse::<Grid>(),
            Err(ParseGridError::WrongLength(3))
        );
    }

    #[test]
    fn test_conflicts() {
        let mut grid: Grid = PUZZLE.parse().unwrap();
        assert!(grid.conflicts().is_empty());
        // Second 3 in row 0 and box 0; reported once
        grid.set(0, 2, Some(3));
        let conflicts = grid.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].digit, 3);
        assert_eq!(conflicts[0].first, 1);
        assert_eq!(conflicts[0].second, 2);
    }

    #[test]
    fn test_from_cells_drops_out_of_range() {
        let mut cells = [None; CELL_COUNT];
        cells[0] = Some(0);
        cells[1] = Some(10);
        cells[2] = Some(9);
        let grid = Grid::from_cells(cells);
        assert_eq!(grid.filled_count(), 1);
        assert_eq!(grid.get(0, 2), Some(9));
    }
}
