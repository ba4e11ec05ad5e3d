/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::time::{Duration, Instant};

use env_logger::{Env, Target};
use log::info;

use config::{GameConfig, GeneralConfig};
use domain::direction::Direction;
use sim::event::GameEvent;
use sim::step;
use sim::world::Game;
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_QUIT, KEYS_RESTART};
use ui::renderer::{Frame, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(2);

fn main() {
    let config = GameConfig::load();
    init_logging(&config.general);
    info!(
        "[Config] tick {}ms, spawn {} after {} ticks, seed {:?}",
        config.speed.tick_rate_ms,
        config.rules.spawn_count,
        config.rules.spawn_delay_ticks,
        config.general.seed,
    );

    let mut game = Game::new(config.rules.clone(), config.general.seed);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut game, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Blink 2048!");
    println!("Largest tile: {}", game.board.max_tile());
}

/// env_logger with a `warn` default. Output goes to `log_file` when set,
/// since stderr shares the terminal with the game screen.
fn init_logging(general: &GeneralConfig) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));

    if let Some(path) = &general.log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Warning: cannot open log file {}: {e}", path.display()),
        }
    }

    builder.init();
}

fn game_loop(
    game: &mut Game,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    // Presses between ticks are buffered; the latest one wins.
    let mut pending_move: Option<Direction> = None;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }

        if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
            info!("[Game] Restart");
            game.restart();
            pending_move = None;
        }

        if let Some(dir) = kb.direction_pressed().or_else(|| gp.direction_pressed()) {
            pending_move = Some(dir);
        }

        if last_tick.elapsed() >= tick_rate {
            let events = step::step(game, pending_move.take());
            process_sound_events(sound, &events);
            last_tick = Instant::now();
        }

        let pixels = game.frame();
        let status = status_line(game, gp.connected);
        renderer.render(&Frame {
            pixels: &pixels,
            banner: game.banner_message(),
            status: &status,
        })?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn status_line(game: &Game, pad_connected: bool) -> String {
    let pad = if pad_connected { "  [Pad]" } else { "" };
    format!("Max {}{pad}", game.board.max_tile())
}

/// One sound per category per tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Cue {
    Merge(u32),
    Slide,
    Win,
    GameOver,
    Spawn,
}

fn sound_cues(events: &[GameEvent]) -> Vec<Cue> {
    let mut cues = Vec::new();

    let top_merge = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::TilesMerged { value, .. } => Some(*value),
            _ => None,
        })
        .max();
    if let Some(value) = top_merge {
        cues.push(Cue::Merge(value));
    } else if events.iter().any(|e| matches!(e, GameEvent::TilesMoved { .. })) {
        cues.push(Cue::Slide);
    }

    if events.iter().any(|e| matches!(e, GameEvent::Won { .. })) {
        cues.push(Cue::Win);
    } else if events.contains(&GameEvent::GameOver) {
        cues.push(Cue::GameOver);
    } else if events.iter().any(|e| matches!(e, GameEvent::TileSpawned { .. })) {
        cues.push(Cue::Spawn);
    }
    cues
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for cue in sound_cues(events) {
        match cue {
            Cue::Merge(value) => sfx.play_merge(value),
            Cue::Slide => sfx.play_slide(),
            Cue::Win => sfx.play_win(),
            Cue::GameOver => sfx.play_game_over(),
            Cue::Spawn => sfx.play_spawn(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;

    fn moved_left() -> GameEvent {
        GameEvent::TilesMoved { direction: Direction::Left }
    }

    #[test]
    fn plain_slide_gets_its_own_sound() {
        assert_eq!(sound_cues(&[moved_left()]), vec![Cue::Slide]);
    }

    #[test]
    fn highest_merge_replaces_the_slide() {
        let events = [
            moved_left(),
            GameEvent::TilesMerged { x: 0, y: 0, value: 4 },
            GameEvent::TilesMerged { x: 0, y: 1, value: 16 },
        ];
        assert_eq!(sound_cues(&events), vec![Cue::Merge(16)]);
    }

    #[test]
    fn win_outranks_spawn_and_game_over_outranks_spawn() {
        let won = [
            moved_left(),
            GameEvent::TilesMerged { x: 0, y: 0, value: 1024 },
            GameEvent::Won { value: 1024 },
        ];
        assert_eq!(sound_cues(&won), vec![Cue::Merge(1024), Cue::Win]);

        let over = [GameEvent::TileSpawned { x: 1, y: 1, value: 2 }, GameEvent::GameOver];
        assert_eq!(sound_cues(&over), vec![Cue::GameOver]);

        let spawn = [GameEvent::TileSpawned { x: 1, y: 1, value: 4 }];
        assert_eq!(sound_cues(&spawn), vec![Cue::Spawn]);
        assert!(sound_cues(&[]).is_empty());
    }

    #[test]
    fn status_shows_only_the_largest_tile() {
        let rules = RulesConfig { spawn_count: 2, spawn_delay_ticks: 10, banner_ticks: 5 };
        let mut game = Game::new(rules, Some(1));
        game.board.set(0, 0, 64).unwrap();
        game.board.set(1, 0, 8).unwrap();
        assert_eq!(status_line(&game, false), "Max 64");
        assert_eq!(status_line(&game, true), "Max 64  [Pad]");
    }
}
