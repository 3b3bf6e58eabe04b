/// World state: every mutable fact about one play session.
///
/// There are no globals; the whole simulation is a function of this
/// struct plus the per-frame input. The RNG lives here too, so a test
/// can seed it and replay an exact session.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::TuningConfig;
use crate::domain::entity::{
    Enemy, Entry, ExitDoor, KeyItem, LevelObject, Player, Trap, Wall,
};
use crate::domain::physics::TILE;
use crate::sim::level::{LevelInfo, LoadError, ParsedLevel};

/// Outer application phase, driven by the UI loop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    PauseMenu,
    GameWon,
    GameOver,
}

/// Terminal status of the simulation itself.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

pub struct WorldState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub walls: Vec<Wall>,
    pub traps: Vec<Trap>,
    pub exits: Vec<ExitDoor>,
    pub entry: Entry,
    pub key: KeyItem,
    pub state: GameState,
    /// Accumulated play time in seconds (sum of frame deltas).
    pub play_time: f64,
    /// Whole seconds the run took, captured once at the moment of winning.
    pub completed_in: u32,
    pub tuning: TuningConfig,
    /// Grid extents in tiles, derived from the loaded objects.
    pub grid_w: u32,
    pub grid_h: u32,
    pub level: LevelInfo,
    /// Unrecognized map cells, surfaced once on the HUD message line.
    pub skipped_cells: usize,
    pub rng: StdRng,
}

/// Player spawn offset from the entry tile's corner.
pub const SPAWN_OFFSET_X: f32 = 15.0;
pub const SPAWN_OFFSET_Y: f32 = 5.0;

impl WorldState {
    /// Build a fresh session from a parsed level. On duplicate entries
    /// or keys the last one listed wins; a map missing either refuses
    /// to start.
    pub fn new(
        parsed: ParsedLevel,
        level: LevelInfo,
        tuning: TuningConfig,
    ) -> Result<Self, LoadError> {
        Self::with_rng(parsed, level, tuning, StdRng::from_entropy())
    }

    /// Seeded variant for deterministic tests.
    pub fn with_seed(
        parsed: ParsedLevel,
        level: LevelInfo,
        tuning: TuningConfig,
        seed: u64,
    ) -> Result<Self, LoadError> {
        Self::with_rng(parsed, level, tuning, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        parsed: ParsedLevel,
        level: LevelInfo,
        tuning: TuningConfig,
        rng: StdRng,
    ) -> Result<Self, LoadError> {
        let mut walls = vec![];
        let mut traps = vec![];
        let mut exits = vec![];
        let mut enemies = vec![];
        let mut entry: Option<Entry> = None;
        let mut key: Option<KeyItem> = None;
        let mut max_x = 0.0f32;
        let mut max_y = 0.0f32;

        for obj in parsed.objects {
            let (x, y) = match &obj {
                LevelObject::Wall(o) => (o.x, o.y),
                LevelObject::Entry(o) => (o.x, o.y),
                LevelObject::Exit(o) => (o.x, o.y),
                LevelObject::Trap(o) => (o.x, o.y),
                LevelObject::Enemy(o) => (o.x, o.y),
                LevelObject::Key(o) => (o.x, o.y),
            };
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            match obj {
                LevelObject::Wall(w) => walls.push(w),
                LevelObject::Entry(e) => entry = Some(e),
                LevelObject::Exit(e) => exits.push(e),
                LevelObject::Trap(t) => traps.push(t),
                LevelObject::Enemy(e) => enemies.push(e),
                LevelObject::Key(k) => key = Some(k),
            }
        }

        let entry = entry.ok_or(LoadError::MissingEntry)?;
        let key = key.ok_or(LoadError::MissingKey)?;

        let player = Player::new(
            entry.x + SPAWN_OFFSET_X,
            entry.y + SPAWN_OFFSET_Y,
            tuning.starting_lives,
        );

        Ok(WorldState {
            player,
            enemies,
            walls,
            traps,
            exits,
            entry,
            key,
            state: GameState::Playing,
            play_time: 0.0,
            completed_in: 0,
            tuning,
            grid_w: (max_x / TILE) as u32 + 1,
            grid_h: (max_y / TILE) as u32 + 1,
            level,
            skipped_cells: parsed.skipped,
            rng,
        })
    }

    /// Stop all motion. Called once when the session ends; every later
    /// step is a no-op because `state` is terminal.
    pub fn freeze(&mut self) {
        self.player.paused = true;
        for enemy in &mut self.enemies {
            enemy.paused = true;
        }
    }

    /// Final score. Flat 1000 under 30 s, flat 100 over 120 s, linear
    /// decay of 10 points per second in between. A lost game scores 0.
    pub fn score(&self) -> u32 {
        match self.state {
            GameState::Lost => 0,
            _ => {
                let secs = self.completed_in;
                if secs <= 30 {
                    1000
                } else if secs >= 120 {
                    100
                } else {
                    1000 - (secs - 30) * 10
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{load_source, LevelSource};

    fn test_world() -> WorldState {
        let source = LevelSource::BuiltIn(0);
        let parsed = load_source(&source).unwrap();
        let info = LevelInfo { name: "test".into(), source };
        WorldState::with_seed(parsed, info, TuningConfig::default(), 42).unwrap()
    }

    #[test]
    fn player_spawns_offset_from_entry() {
        let w = test_world();
        assert_eq!(w.player.x, w.entry.x + 15.0);
        assert_eq!(w.player.y, w.entry.y + 5.0);
        assert_eq!(w.player.lives, 5);
    }

    #[test]
    fn grid_extents_cover_the_map() {
        let w = test_world();
        assert_eq!(w.grid_w, 12);
        assert_eq!(w.grid_h, 9);
    }

    #[test]
    fn freeze_pauses_everything() {
        let mut w = test_world();
        w.freeze();
        assert!(w.player.paused);
        assert!(w.enemies.iter().all(|e| e.paused));
    }

    #[test]
    fn score_table() {
        let mut w = test_world();
        w.state = GameState::Won;
        for (secs, expected) in [(10, 1000), (30, 1000), (75, 550), (120, 100), (300, 100)] {
            w.completed_in = secs;
            assert_eq!(w.score(), expected, "at {secs}s");
        }
    }

    #[test]
    fn lost_game_scores_zero() {
        let mut w = test_world();
        w.state = GameState::Lost;
        w.completed_in = 10;
        assert_eq!(w.score(), 0);
    }
}
