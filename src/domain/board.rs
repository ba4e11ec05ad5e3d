/// The 8×8 grid of tile values.
///
/// Cells are `u32`, `0` = empty, otherwise a power of two >= 2.
/// Writes from outside the resolver go through `set()`, which rejects
/// values that could never appear in play.
/// Coordinates are `(x, y)`: x = column (left to right), y = row (top to bottom).

use std::fmt;

use rand::Rng;

use super::tile;

pub const GRID_SIZE: usize = 8;

/// Weighted spawn pool: 4 comes up one time in four.
const SPAWN_VALUES: [u32; 4] = [2, 2, 2, 4];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardError {
    /// Spawn asked for more tiles than there are empty cells.
    BoardFull { requested: usize, available: usize },
    InvalidValue { x: usize, y: usize, value: u32 },
    OutOfBounds { x: usize, y: usize },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::BoardFull { requested, available } => write!(
                f,
                "cannot spawn {requested} tiles: only {available} empty cells"
            ),
            BoardError::InvalidValue { x, y, value } => {
                write!(f, "invalid tile value {value} at ({x}, {y})")
            }
            BoardError::OutOfBounds { x, y } => write!(f, "cell ({x}, {y}) is off the grid"),
        }
    }
}

impl std::error::Error for BoardError {}

/// A tile placed by the spawner.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Spawned {
    pub x: usize,
    pub y: usize,
    pub value: u32,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Board {
    /// Row-major: `cells[y][x]`.
    cells: [[u32; GRID_SIZE]; GRID_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from row literals, validating every value.
    #[cfg(test)]
    pub fn from_rows(rows: [[u32; GRID_SIZE]; GRID_SIZE]) -> Result<Self, BoardError> {
        for (y, row) in rows.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if !tile::is_valid_cell(value) {
                    return Err(BoardError::InvalidValue { x, y, value });
                }
            }
        }
        Ok(Board { cells: rows })
    }

    pub fn rows(&self) -> &[[u32; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    /// Value at (x, y), or `None` off-grid.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn set(&mut self, x: usize, y: usize, value: u32) -> Result<(), BoardError> {
        if x >= GRID_SIZE || y >= GRID_SIZE {
            return Err(BoardError::OutOfBounds { x, y });
        }
        if !tile::is_valid_cell(value) {
            return Err(BoardError::InvalidValue { x, y, value });
        }
        self.cells[y][x] = value;
        Ok(())
    }

    /// Unchecked in-grid access for the resolver. Callers guarantee bounds.
    #[inline]
    pub(crate) fn at(&self, x: usize, y: usize) -> u32 {
        self.cells[y][x]
    }

    #[inline]
    pub(crate) fn put(&mut self, x: usize, y: usize, value: u32) {
        self.cells[y][x] = value;
    }

    pub fn clear(&mut self) {
        self.cells = [[0; GRID_SIZE]; GRID_SIZE];
    }

    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
        for (y, row) in self.cells.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if v == 0 {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[cfg(test)]
    pub fn empty_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v == 0).count()
    }

    /// Sum of all tile values. Slides and merges conserve it.
    #[cfg(test)]
    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().flatten().map(|&v| v as u64).sum()
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Place `count` new tiles (2 or 4) on distinct empty cells.
    ///
    /// Cells are drawn uniformly from the current empty set without
    /// replacement, so a batch never lands on one of its own tiles.
    /// Fails without touching the board if there isn't room for all of them.
    pub fn spawn_random_tiles<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<Spawned>, BoardError> {
        let mut free = self.empty_cells();
        if free.len() < count {
            return Err(BoardError::BoardFull { requested: count, available: free.len() });
        }

        let mut placed = Vec::with_capacity(count);
        for _ in 0..count {
            let idx = rng.random_range(0..free.len());
            let (x, y) = free.swap_remove(idx);
            let value = SPAWN_VALUES[rng.random_range(0..SPAWN_VALUES.len())];
            self.set(x, y, value)?;
            placed.push(Spawned { x, y, value });
        }
        Ok(placed)
    }

    /// Is any move possible? True if a cell is empty or two orthogonal
    /// neighbours hold equal values that can still be doubled.
    pub fn can_move(&self) -> bool {
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let v = self.cells[y][x];
                if v == 0 {
                    return true;
                }
                let mergeable = |n: Option<u32>| n == Some(v) && v.checked_mul(2).is_some();
                if mergeable(self.get(x + 1, y)) || mergeable(self.get(x, y + 1)) {
                    return true;
                }
            }
        }
        false
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row
                .iter()
                .map(|&v| if v == 0 { ".".to_string() } else { v.to_string() })
                .collect();
            writeln!(f, "{}", line.join("\t"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn full_board() -> Board {
        // Checkerboard of 2/4: full and no equal neighbours.
        let mut rows = [[0u32; GRID_SIZE]; GRID_SIZE];
        for (y, row) in rows.iter_mut().enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                *v = if (x + y) % 2 == 0 { 2 } else { 4 };
            }
        }
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn new_board_is_empty() {
        let b = Board::new();
        assert_eq!(b.empty_count(), 64);
        assert_eq!(b.tile_sum(), 0);
        assert_eq!(b.max_tile(), 0);
    }

    #[test]
    fn set_rejects_bad_values_and_coordinates() {
        let mut b = Board::new();
        assert_eq!(b.set(0, 0, 3), Err(BoardError::InvalidValue { x: 0, y: 0, value: 3 }));
        assert_eq!(b.set(8, 0, 2), Err(BoardError::OutOfBounds { x: 8, y: 0 }));
        assert!(b.set(7, 7, 1024).is_ok());
        assert_eq!(b.get(7, 7), Some(1024));
        assert_eq!(b.get(8, 7), None);
    }

    #[test]
    fn from_rows_validates() {
        let mut rows = [[0u32; GRID_SIZE]; GRID_SIZE];
        rows[2][5] = 7;
        assert_eq!(
            Board::from_rows(rows),
            Err(BoardError::InvalidValue { x: 5, y: 2, value: 7 })
        );
    }

    #[test]
    fn spawn_places_two_tiles_on_empty_cells() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut b = Board::new();
        b.set(3, 3, 8).unwrap();
        let placed = b.spawn_random_tiles(&mut rng, 2).unwrap();
        assert_eq!(placed.len(), 2);
        assert_ne!((placed[0].x, placed[0].y), (placed[1].x, placed[1].y));
        for s in &placed {
            assert_ne!((s.x, s.y), (3, 3));
            assert!(s.value == 2 || s.value == 4);
            assert_eq!(b.get(s.x, s.y), Some(s.value));
        }
        assert_eq!(b.empty_count(), 64 - 3);
    }

    #[test]
    fn spawn_fills_last_two_cells() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut b = full_board();
        b.set(0, 0, 0).unwrap();
        b.set(7, 7, 0).unwrap();
        let placed = b.spawn_random_tiles(&mut rng, 2).unwrap();
        assert_eq!(placed.len(), 2);
        assert_eq!(b.empty_count(), 0);
    }

    #[test]
    fn spawn_on_crowded_board_fails_without_mutation() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut b = full_board();
        b.set(4, 4, 0).unwrap();
        let before = b.clone();
        assert_eq!(
            b.spawn_random_tiles(&mut rng, 2),
            Err(BoardError::BoardFull { requested: 2, available: 1 })
        );
        assert_eq!(b, before);
    }

    #[test]
    fn spawn_value_distribution_is_one_in_four() {
        let mut rng = StdRng::seed_from_u64(2048);
        let mut fours = 0usize;
        let trials = 20_000;
        for _ in 0..trials / 2 {
            let mut b = Board::new();
            for s in b.spawn_random_tiles(&mut rng, 2).unwrap() {
                if s.value == 4 {
                    fours += 1;
                }
            }
        }
        let ratio = fours as f64 / trials as f64;
        assert!((ratio - 0.25).abs() < 0.02, "ratio = {ratio}");
    }

    #[test]
    fn spawn_reaches_every_cell() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut seen = [[false; GRID_SIZE]; GRID_SIZE];
        for _ in 0..2000 {
            let mut b = Board::new();
            for s in b.spawn_random_tiles(&mut rng, 2).unwrap() {
                seen[s.y][s.x] = true;
            }
        }
        assert!(seen.iter().flatten().all(|&s| s));
    }

    #[test]
    fn can_move_detects_stuck_board() {
        assert!(Board::new().can_move());
        let stuck = full_board();
        assert!(!stuck.can_move());

        let mut pair = stuck.clone();
        pair.set(1, 0, 2).unwrap(); // (0,0) and (1,0) are both 2
        assert!(pair.can_move());
    }

    #[test]
    fn can_move_sees_pairs_on_the_far_edges() {
        // Right column: (7,6) over (7,7).
        let mut right_edge = full_board();
        right_edge.set(7, 6, 8).unwrap();
        right_edge.set(7, 7, 8).unwrap();
        assert!(right_edge.can_move());

        // Bottom row: (6,7) beside (7,7).
        let mut bottom_edge = full_board();
        bottom_edge.set(6, 7, 8).unwrap();
        bottom_edge.set(7, 7, 8).unwrap();
        assert!(bottom_edge.can_move());
    }

    #[test]
    fn display_marks_empty_cells() {
        let mut b = Board::new();
        b.set(0, 0, 16).unwrap();
        let text = b.to_string();
        assert!(text.starts_with("16\t."));
        assert_eq!(text.lines().count(), 8);
    }
}
