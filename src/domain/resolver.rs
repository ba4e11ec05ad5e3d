/// Move resolution: slide and merge every tile one direction.
///
/// Each non-empty source cell, visited destination-edge first, is pushed one
/// step at a time:
///   - off-grid or a different tile ahead: it settles
///   - equal tile ahead that hasn't absorbed a merge this move: merge, settle
///   - empty cell ahead: slide and keep going
///
/// A per-move `merged` mask enforces "each destination merges at most once".
/// Slides never mark the mask, so a tile that slid into place can still be
/// merged into by a later tile in the same sweep.

use super::board::{Board, GRID_SIZE};
use super::direction::Direction;
use super::tile;

/// One merge produced by a move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Merge {
    pub x: usize,
    pub y: usize,
    pub value: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Some cell changed value. Only then may new tiles spawn.
    pub moved: bool,
    /// A merge produced a rank past the metadata table.
    pub won: bool,
    pub merges: Vec<Merge>,
}

type MergedMask = [[bool; GRID_SIZE]; GRID_SIZE];

/// Resolve raw input. Unrecognized input (`None`) is a no-op.
pub fn resolve_input(board: &mut Board, input: Option<Direction>) -> MoveOutcome {
    match input {
        Some(dir) => resolve_move(board, dir),
        None => MoveOutcome::default(),
    }
}

pub fn resolve_move(board: &mut Board, dir: Direction) -> MoveOutcome {
    let params = dir.params();
    let mut merged: MergedMask = [[false; GRID_SIZE]; GRID_SIZE];
    let mut outcome = MoveOutcome::default();

    for (x, y) in params.cells() {
        if board.at(x, y) != 0 {
            advance_tile(board, &mut merged, &mut outcome, x, y, params.dx, params.dy);
        }
    }
    outcome
}

/// Neighbour one step away, or `None` off-grid.
#[inline]
fn neighbour(x: usize, y: usize, dx: i32, dy: i32) -> Option<(usize, usize)> {
    let nx = x as i32 + dx;
    let ny = y as i32 + dy;
    let in_grid = |v: i32| (0..GRID_SIZE as i32).contains(&v);
    if in_grid(nx) && in_grid(ny) {
        Some((nx as usize, ny as usize))
    } else {
        None
    }
}

fn advance_tile(
    board: &mut Board,
    merged: &mut MergedMask,
    outcome: &mut MoveOutcome,
    mut x: usize,
    mut y: usize,
    dx: i32,
    dy: i32,
) {
    let value = board.at(x, y);

    while let Some((nx, ny)) = neighbour(x, y, dx, dy) {
        let target = board.at(nx, ny);

        if target == 0 {
            board.put(nx, ny, value);
            board.put(x, y, 0);
            outcome.moved = true;
            x = nx;
            y = ny;
            continue;
        }

        if target == value && !merged[ny][nx] {
            // Sums past u32 can't be stored; such tiles block each other.
            if let Some(sum) = value.checked_mul(2) {
                board.put(nx, ny, sum);
                board.put(x, y, 0);
                merged[ny][nx] = true;
                outcome.moved = true;
                outcome.merges.push(Merge { x: nx, y: ny, value: sum });
                if tile::is_win_rank(sum) {
                    outcome.won = true;
                }
            }
        }
        break;
    }
}
