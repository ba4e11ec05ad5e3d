/// Game session: the per-tick state machine around the board.

pub mod event;
pub mod step;
pub mod world;
