/// The step function: advances the game by one tick.
///
/// Processing order:
///   1. Spawn countdown (new tiles land when it reaches zero)
///   2. Blink phase + banner timer
///   3. Move resolution (only when no spawn is pending)
///
/// The driver renders `game.frame()` after this returns.

use log::{debug, info, warn};

use crate::domain::board::BoardError;
use crate::domain::direction::Direction;
use crate::domain::resolver;
use crate::domain::tile;
use super::event::GameEvent;
use super::world::{Banner, Game};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(game: &mut Game, input: Option<Direction>) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    game.tick += 1;

    resolve_spawn(game, &mut events);
    game.blink.advance();
    resolve_banner(game);
    resolve_move(game, input, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Spawning
// ══════════════════════════════════════════════════════════════

fn resolve_spawn(game: &mut Game, events: &mut Vec<GameEvent>) {
    match game.pending_spawn {
        Some(0) => {
            game.pending_spawn = None;
            spawn_tiles(game, events);
            resolve_game_over(game, events);
        }
        Some(n) => game.pending_spawn = Some(n - 1),
        None => {}
    }
}

fn spawn_tiles(game: &mut Game, events: &mut Vec<GameEvent>) {
    let count = game.rules.spawn_count;
    let placed = match game.board.spawn_random_tiles(&mut game.rng, count) {
        Ok(placed) => placed,
        Err(e @ BoardError::BoardFull { available, .. }) => {
            warn!("[Spawn] {e}; filling the {available} remaining");
            game.board
                .spawn_random_tiles(&mut game.rng, available)
                .unwrap_or_default()
        }
        Err(e) => {
            warn!("[Spawn] {e}");
            Vec::new()
        }
    };

    for s in placed {
        debug!("[Spawn] {} at ({}, {})", s.value, s.x, s.y);
        events.push(GameEvent::TileSpawned { x: s.x, y: s.y, value: s.value });
    }
}

fn resolve_game_over(game: &mut Game, events: &mut Vec<GameEvent>) {
    if game.over || game.board.can_move() {
        return;
    }
    info!("[Game] No moves left after {} ticks, max tile {}", game.tick, game.board.max_tile());
    game.over = true;
    game.show_banner(Banner::GameOver);
    events.push(GameEvent::GameOver);
}

// ══════════════════════════════════════════════════════════════
// Banner timer
// ══════════════════════════════════════════════════════════════

fn resolve_banner(game: &mut Game) {
    let Some(active) = game.banner.as_mut() else { return };
    let expired = match active.ticks_left {
        Some(n) if n > 1 => {
            active.ticks_left = Some(n - 1);
            false
        }
        Some(_) => true,
        None => false,
    };
    if expired {
        game.banner = None;
    }
}

// ══════════════════════════════════════════════════════════════
// Moves
// ══════════════════════════════════════════════════════════════

fn resolve_move(game: &mut Game, input: Option<Direction>, events: &mut Vec<GameEvent>) {
    if input.is_some() && !game.accepts_input() {
        debug!("[Move] {input:?} ignored (spawn pending or game over)");
        return;
    }

    // No input resolves to an empty outcome.
    let outcome = resolver::resolve_input(&mut game.board, input);
    if !outcome.moved {
        if let Some(direction) = input {
            debug!("[Move] {direction:?} blocked");
        }
        return;
    }

    game.pending_spawn = Some(game.rules.spawn_delay_ticks);
    if let Some(direction) = input {
        events.push(GameEvent::TilesMoved { direction });
    }

    for m in &outcome.merges {
        events.push(GameEvent::TilesMerged { x: m.x, y: m.y, value: m.value });
        if tile::is_win_rank(m.value) {
            info!("[Game] Won with a {} tile at ({}, {})", m.value, m.x, m.y);
            events.push(GameEvent::Won { value: m.value });
        }
    }

    if outcome.won {
        game.won = true;
        game.show_banner(Banner::Won);
    }
    debug!("[Move] {input:?}\n{}", game.board);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::domain::board::{Board, GRID_SIZE};
    use crate::domain::tile::ColorIndex;

    fn rules() -> RulesConfig {
        RulesConfig { spawn_count: 2, spawn_delay_ticks: 10, banner_ticks: 5 }
    }

    /// Game past its opening spawn, holding exactly `rows`.
    fn game_with(rows: [[u32; GRID_SIZE]; GRID_SIZE]) -> Game {
        let mut g = Game::new(rules(), Some(2048));
        g.board = Board::from_rows(rows).unwrap();
        g.pending_spawn = None;
        g
    }

    fn spawned(events: &[GameEvent]) -> usize {
        events.iter().filter(|e| matches!(e, GameEvent::TileSpawned { .. })).count()
    }

    /// 8/16 checkerboard: full and stuck.
    fn stuck_rows() -> [[u32; GRID_SIZE]; GRID_SIZE] {
        let mut rows = [[0u32; GRID_SIZE]; GRID_SIZE];
        for (y, row) in rows.iter_mut().enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                *v = if (x + y) % 2 == 0 { 8 } else { 16 };
            }
        }
        rows
    }

    #[test]
    fn first_tick_places_two_starting_tiles() {
        let mut g = Game::new(rules(), Some(5));
        let events = step(&mut g, None);
        assert_eq!(spawned(&events), 2);
        assert_eq!(g.board.empty_count(), 62);
        assert!(g.accepts_input());
    }

    #[test]
    fn blink_advances_every_tick() {
        let mut g = Game::new(rules(), Some(5));
        for expected in [1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 1] {
            step(&mut g, None);
            assert_eq!(g.blink.get(), expected);
        }
    }

    #[test]
    fn successful_move_spawns_after_delay() {
        let mut rows = [[0u32; GRID_SIZE]; GRID_SIZE];
        rows[0][5] = 2;
        let mut g = game_with(rows);

        let events = step(&mut g, Some(Direction::Left));
        assert_eq!(events, vec![GameEvent::TilesMoved { direction: Direction::Left }]);
        assert_eq!(g.board.get(0, 0), Some(2));
        assert_eq!(g.pending_spawn, Some(10));

        for _ in 0..10 {
            assert_eq!(spawned(&step(&mut g, None)), 0);
        }
        let events = step(&mut g, None);
        assert_eq!(spawned(&events), 2);
        assert_eq!(g.board.empty_count(), 61);

        let grown = g.board.tile_sum() - 2;
        assert!(grown == 4 || grown == 6 || grown == 8, "spawned sum {grown}");
    }

    #[test]
    fn blocked_move_never_spawns() {
        let mut rows = [[0u32; GRID_SIZE]; GRID_SIZE];
        rows[0][0] = 2;
        rows[0][1] = 4;
        let mut g = game_with(rows);

        let events = step(&mut g, Some(Direction::Left));
        assert!(events.is_empty());
        assert_eq!(g.pending_spawn, None);
        for _ in 0..20 {
            step(&mut g, None);
        }
        assert_eq!(g.board.empty_count(), 62);
    }

    #[test]
    fn input_is_ignored_while_spawn_pending() {
        let mut rows = [[0u32; GRID_SIZE]; GRID_SIZE];
        rows[3][3] = 2;
        let mut g = game_with(rows);

        step(&mut g, Some(Direction::Right));
        let before = g.board.clone();
        let events = step(&mut g, Some(Direction::Left));
        assert!(events.is_empty());
        assert_eq!(g.board, before);
    }

    #[test]
    fn unmapped_input_does_nothing() {
        let mut rows = [[0u32; GRID_SIZE]; GRID_SIZE];
        rows[3][3] = 2;
        let mut g = game_with(rows);
        let before = g.board.clone();
        assert!(step(&mut g, None).is_empty());
        assert_eq!(g.board, before);
        assert!(g.accepts_input());
    }

    #[test]
    fn idle_ticks_never_arm_a_spawn() {
        let mut g = Game::new(rules(), Some(9));
        step(&mut g, None);
        for _ in 0..50 {
            assert!(step(&mut g, None).is_empty());
        }
        assert_eq!(g.pending_spawn, None);
        assert_eq!(g.board.empty_count(), 62);
    }

    #[test]
    fn merge_events_are_reported() {
        let mut rows = [[0u32; GRID_SIZE]; GRID_SIZE];
        rows[0][0] = 4;
        rows[0][7] = 4;
        let mut g = game_with(rows);
        let events = step(&mut g, Some(Direction::Left));
        assert!(events.contains(&GameEvent::TilesMerged { x: 0, y: 0, value: 8 }));
        assert!(!g.won);
    }

    #[test]
    fn winning_merge_signals_once_and_shows_banner() {
        let mut rows = [[0u32; GRID_SIZE]; GRID_SIZE];
        rows[4][0] = 512;
        rows[4][1] = 512;
        let mut g = game_with(rows);

        let events = step(&mut g, Some(Direction::Left));
        let wins = events.iter().filter(|e| matches!(e, GameEvent::Won { .. })).count();
        assert_eq!(wins, 1);
        assert!(events.contains(&GameEvent::Won { value: 1024 }));
        assert!(g.won);
        assert_eq!(g.banner_message(), Some("YOU WON!"));

        // Render path copes with a rank past the table.
        assert_eq!(g.frame()[4][0], ColorIndex::Green);

        for _ in 0..5 {
            step(&mut g, None);
        }
        assert!(g.banner.is_none());
        assert!(!g.over);
    }

    #[test]
    fn stuck_board_after_spawn_is_game_over() {
        let mut rows = stuck_rows();
        rows[0][0] = 0;
        let mut g = game_with(rows);
        g.pending_spawn = Some(0);

        // Only one cell free: the spawner falls back to filling it.
        let events = step(&mut g, None);
        assert_eq!(spawned(&events), 1);
        assert!(events.contains(&GameEvent::GameOver));
        assert!(g.over);
        assert_eq!(g.banner_message(), Some("GAME OVER!"));

        // No further input accepted, banner persists.
        for dir in Direction::ALL {
            assert!(step(&mut g, Some(dir)).is_empty());
        }
        assert_eq!(g.banner_message(), Some("GAME OVER!"));
    }

    #[test]
    fn restart_after_game_over_starts_fresh() {
        let mut g = game_with(stuck_rows());
        g.pending_spawn = Some(0);
        step(&mut g, None);
        assert!(g.over);

        g.restart();
        let events = step(&mut g, None);
        assert_eq!(spawned(&events), 2);
        assert!(!g.over);
        assert!(g.accepts_input());
    }

    #[test]
    fn seeded_games_are_reproducible() {
        let play = || {
            let mut g = Game::new(rules(), Some(77));
            let dirs = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];
            for i in 0..400 {
                let input = if i % 3 == 0 { Some(dirs[(i / 3) % 4]) } else { None };
                step(&mut g, input);
            }
            g.board.clone()
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn tile_sum_only_grows_by_spawns() {
        let mut g = Game::new(rules(), Some(31));
        let dirs = [Direction::Down, Direction::Left, Direction::Up, Direction::Right];
        let mut sum = 0u64;
        for i in 0..2000 {
            let input = if i % 2 == 0 { Some(dirs[(i / 2) % 4]) } else { None };
            let events = step(&mut g, input);
            let added: u64 = events
                .iter()
                .filter_map(|e| match e {
                    GameEvent::TileSpawned { value, .. } => Some(*value as u64),
                    _ => None,
                })
                .sum();
            assert_eq!(g.board.tile_sum(), sum + added);
            sum = g.board.tile_sum();
            if g.over {
                break;
            }
        }
    }
}
