/// Events emitted during a simulation step.
/// The presentation layer consumes these for banners and sound.

use crate::domain::direction::Direction;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    TileSpawned { x: usize, y: usize, value: u32 },
    TilesMoved { direction: Direction },
    TilesMerged { x: usize, y: usize, value: u32 },
    /// A merge produced a rank past the metadata table. One per such merge.
    Won { value: u32 },
    GameOver,
}
