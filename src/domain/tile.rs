/// Tile ranks and their render metadata.
/// Blink policy and color are looked up here, not stored per cell,
/// so rank semantics are centralized in one table.

use std::fmt;

/// Highest rank with render metadata. Anything above it is a win.
pub const MAX_DEFINED_RANK: u32 = 512;

/// Rendering-only color of a pixel. Discriminants match the display palette.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ColorIndex {
    #[default]
    Off = 0,
    Green = 1,
    Red = 2,
    Yellow = 3,
}

/// Per-tick rule deciding whether a tile is drawn or suppressed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlinkPolicy {
    /// Off on every odd phase.
    Rare,
    /// Off one phase in five (phases 0 and 5).
    Often,
    /// Never off.
    None,
}

impl BlinkPolicy {
    /// Is the tile drawn in color at this phase?
    pub fn visible(self, phase: u8) -> bool {
        match self {
            BlinkPolicy::Rare => phase % 2 == 0,
            BlinkPolicy::Often => phase % 5 != 0,
            BlinkPolicy::None => true,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RenderMeta {
    pub blink: BlinkPolicy,
    pub color: ColorIndex,
}

const fn meta(blink: BlinkPolicy, color: ColorIndex) -> RenderMeta {
    RenderMeta { blink, color }
}

/// Indexed by log2(rank) - 1: 2, 4, 8, ... 512.
const RANK_TABLE: [RenderMeta; 9] = [
    meta(BlinkPolicy::Rare, ColorIndex::Red),
    meta(BlinkPolicy::Often, ColorIndex::Red),
    meta(BlinkPolicy::None, ColorIndex::Red),
    meta(BlinkPolicy::Rare, ColorIndex::Yellow),
    meta(BlinkPolicy::Often, ColorIndex::Yellow),
    meta(BlinkPolicy::None, ColorIndex::Yellow),
    meta(BlinkPolicy::Rare, ColorIndex::Green),
    meta(BlinkPolicy::Often, ColorIndex::Green),
    meta(BlinkPolicy::None, ColorIndex::Green),
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TileError {
    UndefinedMetadata(u32),
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileError::UndefinedMetadata(rank) => {
                write!(f, "no render metadata for tile value {rank}")
            }
        }
    }
}

impl std::error::Error for TileError {}

/// Can this value occupy a cell? (0 or a power of two >= 2)
pub fn is_valid_cell(value: u32) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

/// Is this a rank past the end of the table?
pub fn is_win_rank(value: u32) -> bool {
    value > MAX_DEFINED_RANK
}

/// Render metadata for a non-zero rank.
/// Ranks above the table are clamped to its last entry.
pub fn metadata_for(rank: u32) -> Result<RenderMeta, TileError> {
    if is_win_rank(rank) && rank.is_power_of_two() {
        return Ok(RANK_TABLE[RANK_TABLE.len() - 1]);
    }
    if rank < 2 || !rank.is_power_of_two() {
        return Err(TileError::UndefinedMetadata(rank));
    }
    let idx = rank.trailing_zeros() as usize - 1;
    RANK_TABLE
        .get(idx)
        .copied()
        .ok_or(TileError::UndefinedMetadata(rank))
}
