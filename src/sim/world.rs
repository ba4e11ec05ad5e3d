/// Game: the complete state of a running session.
///
/// Owned by the driving loop and mutated only through `step()` and
/// `restart()`. The board is zeroed once at construction; the first tick
/// places the starting tiles because `pending_spawn` begins at `Some(0)`.
///
/// ## Spawn countdown
///
/// An accepted move arms `pending_spawn` with `spawn_delay_ticks`. The
/// countdown runs down one per tick and the new tiles land when it is
/// consumed at zero. Input is ignored while a spawn is pending.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::RulesConfig;
use crate::domain::board::Board;
use crate::domain::projector::{self, BlinkPhase, ColorGrid};

pub const WIN_MESSAGE: &str = "YOU WON!";
pub const GAME_OVER_MESSAGE: &str = "GAME OVER!";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Banner {
    Won,
    GameOver,
}

impl Banner {
    pub fn message(self) -> &'static str {
        match self {
            Banner::Won => WIN_MESSAGE,
            Banner::GameOver => GAME_OVER_MESSAGE,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ActiveBanner {
    pub banner: Banner,
    /// `None` = stays until restart.
    pub ticks_left: Option<u32>,
}

pub struct Game {
    pub board: Board,
    pub blink: BlinkPhase,
    pub pending_spawn: Option<u32>,
    /// At least one winning merge happened this game.
    pub won: bool,
    /// No move is possible; only restart is accepted.
    pub over: bool,
    pub banner: Option<ActiveBanner>,
    pub tick: u64,
    pub rules: RulesConfig,
    pub(crate) rng: StdRng,
}

impl Game {
    /// New game. A fixed seed makes spawns reproducible.
    pub fn new(rules: RulesConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Game {
            board: Board::new(),
            blink: BlinkPhase::default(),
            pending_spawn: Some(0),
            won: false,
            over: false,
            banner: None,
            tick: 0,
            rules,
            rng,
        }
    }

    /// Clear the board and re-arm the opening spawn. RNG and rules are kept.
    pub fn restart(&mut self) {
        self.board.clear();
        self.pending_spawn = Some(0);
        self.won = false;
        self.over = false;
        self.banner = None;
    }

    pub fn accepts_input(&self) -> bool {
        !self.over && self.pending_spawn.is_none()
    }

    pub fn show_banner(&mut self, banner: Banner) {
        let ticks_left = match banner {
            Banner::Won => Some(self.rules.banner_ticks),
            Banner::GameOver => None,
        };
        self.banner = Some(ActiveBanner { banner, ticks_left });
    }

    /// Message of the banner currently on screen, if any.
    pub fn banner_message(&self) -> Option<&'static str> {
        self.banner.map(|b| b.banner.message())
    }

    /// The frame to hand to the display this tick.
    pub fn frame(&self) -> ColorGrid {
        projector::project(&self.board, self.blink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RulesConfig {
        RulesConfig { spawn_count: 2, spawn_delay_ticks: 10, banner_ticks: 5 }
    }

    #[test]
    fn fresh_game_waits_for_opening_spawn() {
        let g = Game::new(rules(), Some(1));
        assert_eq!(g.board.empty_count(), 64);
        assert_eq!(g.pending_spawn, Some(0));
        assert!(!g.accepts_input());
    }

    #[test]
    fn win_banner_is_timed_game_over_is_not() {
        let mut g = Game::new(rules(), Some(1));
        g.show_banner(Banner::Won);
        assert_eq!(g.banner, Some(ActiveBanner { banner: Banner::Won, ticks_left: Some(5) }));
        assert_eq!(g.banner_message(), Some("YOU WON!"));

        g.show_banner(Banner::GameOver);
        assert_eq!(g.banner.unwrap().ticks_left, None);
        assert_eq!(g.banner_message(), Some("GAME OVER!"));
    }

    #[test]
    fn restart_clears_state() {
        let mut g = Game::new(rules(), Some(1));
        g.board.set(0, 0, 8).unwrap();
        g.pending_spawn = None;
        g.over = true;
        g.won = true;
        g.show_banner(Banner::GameOver);

        g.restart();
        assert_eq!(g.board.empty_count(), 64);
        assert_eq!(g.pending_spawn, Some(0));
        assert!(!g.over && !g.won);
        assert!(g.banner.is_none());
    }
}
