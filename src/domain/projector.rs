/// Render projection: board + blink phase -> grid of color indices.
/// Pure derived view; nothing here feeds back into game logic.

use super::board::{Board, GRID_SIZE};
use super::tile::{self, ColorIndex};

pub type ColorGrid = [[ColorIndex; GRID_SIZE]; GRID_SIZE];

const BLINK_PERIOD: u8 = 10;

/// Render-only flicker counter: 0..=9, wraps after 9.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BlinkPhase(u8);

impl BlinkPhase {
    pub fn get(self) -> u8 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = if self.0 + 1 >= BLINK_PERIOD { 0 } else { self.0 + 1 };
    }
}

/// Color of one cell at this phase.
pub fn cell_color(value: u32, phase: BlinkPhase) -> ColorIndex {
    if value == 0 {
        return ColorIndex::Off;
    }
    match tile::metadata_for(value) {
        Ok(meta) if meta.blink.visible(phase.get()) => meta.color,
        Ok(_) => ColorIndex::Off,
        // Unreachable through Board's validated setters.
        Err(_) => ColorIndex::Off,
    }
}

pub fn project(board: &Board, phase: BlinkPhase) -> ColorGrid {
    let mut out = [[ColorIndex::Off; GRID_SIZE]; GRID_SIZE];
    for (y, row) in board.rows().iter().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            out[y][x] = cell_color(value, phase);
        }
    }
    out
}
