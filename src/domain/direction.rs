/// Move directions and the sweep parameters derived from them.
///
/// A sweep visits the grid destination-edge first so that once a cell has
/// absorbed a merge, tiles processed later in the same sweep are blocked by
/// it instead of merging into it again.

use super::board::GRID_SIZE;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit step (dx, dy) tiles travel in. y grows downward.
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn params(self) -> SweepParams {
        let (dx, dy) = self.step();
        SweepParams {
            dx,
            dy,
            xs: AxisOrder::toward(dx),
            ys: AxisOrder::toward(dy),
        }
    }
}

/// Scan order along one axis.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AxisOrder {
    /// Every index, low to high. Used for the axis tiles don't travel along.
    Full,
    /// 1..SIZE ascending: the low edge is the destination.
    FromLow,
    /// SIZE-2..=0 descending: the high edge is the destination.
    FromHigh,
}

impl AxisOrder {
    fn toward(step: i32) -> AxisOrder {
        match step.signum() {
            -1 => AxisOrder::FromLow,
            1 => AxisOrder::FromHigh,
            _ => AxisOrder::Full,
        }
    }

    /// Indices in visiting order. The destination edge itself is skipped:
    /// a tile already there cannot move.
    pub fn indices(self) -> Vec<usize> {
        match self {
            AxisOrder::Full => (0..GRID_SIZE).collect(),
            AxisOrder::FromLow => (1..GRID_SIZE).collect(),
            AxisOrder::FromHigh => (0..GRID_SIZE - 1).rev().collect(),
        }
    }
}

/// Everything the resolver needs to sweep one direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SweepParams {
    pub dx: i32,
    pub dy: i32,
    pub xs: AxisOrder,
    pub ys: AxisOrder,
}

impl SweepParams {
    /// Source cells in visiting order: rows outer, columns inner.
    pub fn cells(&self) -> Vec<(usize, usize)> {
        let xs = self.xs.indices();
        self.ys
            .indices()
            .into_iter()
            .flat_map(|y| xs.iter().map(move |&x| (x, y)))
            .collect()
    }
}
