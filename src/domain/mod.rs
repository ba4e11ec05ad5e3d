/// Game rules: board, move resolution, rank table, render projection.
/// No I/O and no clocks; everything here is driven by `sim`.

pub mod board;
pub mod direction;
pub mod projector;
pub mod resolver;
pub mod tile;
