/// One simulation tick.
///
/// `step` advances the whole world by `dt` seconds: player intent and
/// enemy wander produce candidate positions, then the resolver walks a
/// fixed sequence of overlap checks, rolling movers back and applying
/// timer-gated effects. Later checks may re-override positions set by
/// earlier ones, so the order is load-bearing.

use crate::domain::entity::{Facing, FrameInput, MoveDir, Player};
use crate::domain::wander;
use crate::sim::event::GameEvent;
use crate::sim::world::{GameState, WorldState, SPAWN_OFFSET_X, SPAWN_OFFSET_Y};

/// Advance the session by one frame. Returns the signals raised this
/// tick, in the order they fired. Terminal sessions are inert: once the
/// state leaves `Playing` every call is a no-op.
pub fn step(world: &mut WorldState, input: FrameInput, dt: f32) -> Vec<GameEvent> {
    let mut events = vec![];

    if world.state != GameState::Playing {
        return events;
    }

    world.play_time += dt as f64;

    move_player(&mut world.player, input, dt, world.tuning.player_speed);

    let (min, max) = (world.tuning.wander_interval_min, world.tuning.wander_interval_max);
    for enemy in &mut world.enemies {
        wander::decide(enemy, &mut world.rng, dt, min, max);
        wander::advance(enemy, dt, world.tuning.enemy_speed);
    }

    let mut won = false;
    resolve_collisions(world, dt, &mut won, &mut events);

    // Loss is checked before win so a frame that produces both ends the
    // session as a loss.
    if world.player.lives == 0 {
        world.state = GameState::Lost;
        world.freeze();
        events.push(GameEvent::GameLost);
    } else if won {
        world.state = GameState::Won;
        world.completed_in = world.play_time.round() as u32;
        world.freeze();
        events.push(GameEvent::GameWon);
    }

    events
}

/// Apply the frame's directional intent. The moved axis is recorded as
/// the previous position first, so any of the resolver's rollbacks can
/// undo exactly this move.
fn move_player(player: &mut Player, input: FrameInput, dt: f32, speed: f32) {
    if player.paused {
        return;
    }
    let dir = match input.movement {
        Some(d) => d,
        None => return,
    };
    match dir {
        MoveDir::Up => {
            player.facing = Facing::Up;
            player.prev_y = player.y;
            player.y += dt * speed;
        }
        MoveDir::Down => {
            player.facing = Facing::Down;
            player.prev_y = player.y;
            player.y -= dt * speed;
        }
        MoveDir::Left => {
            player.facing = Facing::Left;
            player.prev_x = player.x;
            player.x -= dt * speed;
        }
        MoveDir::Right => {
            player.facing = Facing::Right;
            player.prev_x = player.x;
            player.x += dt * speed;
        }
    }
}

fn resolve_collisions(
    world: &mut WorldState,
    dt: f32,
    won: &mut bool,
    events: &mut Vec<GameEvent>,
) {
    let damage_after = world.tuning.damage_overlap_secs;
    let dwell = world.tuning.exit_dwell_secs;

    // Player vs enemies: both movers roll back on every overlapping
    // frame; sustained contact costs a life.
    for enemy in &mut world.enemies {
        if world.player.bounds().overlaps(&enemy.bounds()) {
            enemy.overlap_timer += dt;
            world.player.roll_back();
            enemy.roll_back();
            if enemy.overlap_timer >= damage_after && world.player.lives > 0 {
                world.player.lose_life();
                events.push(GameEvent::LifeLost);
                enemy.overlap_timer = 0.0;
            }
        } else {
            enemy.overlap_timer = 0.0;
        }
    }

    // Player vs traps: the trap never moves, only the player rolls back.
    for trap in &mut world.traps {
        if world.player.bounds().overlaps(&trap.bounds()) {
            trap.overlap_timer += dt;
            world.player.roll_back();
            if trap.overlap_timer >= damage_after && world.player.lives > 0 {
                world.player.lose_life();
                events.push(GameEvent::LifeLost);
                trap.overlap_timer = 0.0;
            }
        } else {
            trap.overlap_timer = 0.0;
        }
    }

    // Walls block the player outright.
    for wall in &world.walls {
        if world.player.bounds().overlaps(&wall.bounds()) {
            world.player.roll_back();
        }
    }

    // Walls, the entry, and every exit block enemies.
    for enemy in &mut world.enemies {
        for wall in &world.walls {
            if enemy.bounds().overlaps(&wall.bounds()) {
                enemy.roll_back();
            }
        }
        if enemy.bounds().overlaps(&world.entry.bounds()) {
            enemy.roll_back();
        }
        for exit in &world.exits {
            if enemy.bounds().overlaps(&exit.bounds()) {
                enemy.roll_back();
            }
        }
    }

    // Exits: with the key, dwelling in the door wins; without it the
    // door is a wall.
    for exit in &mut world.exits {
        if world.player.bounds().overlaps(&exit.bounds()) {
            if world.player.key_collected {
                world.player.facing = Facing::Exiting;
                exit.overlap_timer += dt;
                if exit.overlap_timer > dwell {
                    world.player.x = exit.x + SPAWN_OFFSET_X;
                    world.player.y = exit.y + SPAWN_OFFSET_Y;
                    *won = true;
                    exit.overlap_timer = 0.0;
                }
            } else {
                world.player.roll_back();
            }
        } else {
            exit.overlap_timer = 0.0;
        }
    }

    // Key pickup is edge-triggered: one signal per session, then the
    // key is inert.
    if !world.player.key_collected && world.player.bounds().overlaps(&world.key.bounds()) {
        world.player.key_collected = true;
        events.push(GameEvent::KeyCollected);
    }

    // The entry side of the maze is a one-way boundary.
    if world.player.x < world.entry.x {
        world.player.roll_back();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuningConfig;
    use crate::domain::entity::{
        Enemy, Entry, ExitDoor, KeyItem, LevelObject, Trap, Wall,
    };
    use crate::sim::level::{LevelInfo, LevelSource, ParsedLevel};

    /// Hand-built world: entry and key live far out of the way unless a
    /// test places them deliberately.
    fn world_with(mut objects: Vec<LevelObject>) -> WorldState {
        let has_entry = objects.iter().any(|o| matches!(o, LevelObject::Entry(_)));
        let has_key = objects.iter().any(|o| matches!(o, LevelObject::Key(_)));
        if !has_entry {
            objects.push(LevelObject::Entry(Entry::new(0.0, 0.0)));
        }
        if !has_key {
            objects.push(LevelObject::Key(KeyItem::new(5000.0, 5000.0)));
        }
        let parsed = ParsedLevel { objects, skipped: 0 };
        let info = LevelInfo {
            name: "test".into(),
            source: LevelSource::BuiltIn(0),
        };
        WorldState::with_seed(parsed, info, TuningConfig::default(), 1).unwrap()
    }

    fn place_player(world: &mut WorldState, x: f32, y: f32) {
        world.player.x = x;
        world.player.y = y;
        world.player.prev_x = x;
        world.player.prev_y = y;
    }

    fn input(dir: MoveDir) -> FrameInput {
        FrameInput { movement: Some(dir) }
    }

    #[test]
    fn player_never_ends_a_frame_inside_a_wall() {
        let mut w = world_with(vec![LevelObject::Wall(Wall::new(160.0, 100.0))]);
        place_player(&mut w, 100.0, 110.0);

        for _ in 0..50 {
            step(&mut w, input(MoveDir::Right), 0.016);
            let p = w.player.bounds();
            for wall in &w.walls {
                assert!(!p.overlaps(&wall.bounds()));
            }
        }
        // The wall actually stopped the walk.
        assert!(w.player.x + 30.0 <= 160.0 + 1e-3);
    }

    #[test]
    fn enemy_wall_rollback_is_exact() {
        let mut enemy = Enemy::new(130.0, 110.0);
        enemy.dir = Some(MoveDir::Right);
        enemy.dir_interval = 999.0; // never re-decide during the test
        let mut w = world_with(vec![
            LevelObject::Enemy(enemy),
            LevelObject::Wall(Wall::new(160.0, 100.0)),
        ]);
        place_player(&mut w, 400.0, 400.0);

        // 12.5 units of drift would bury the enemy in the wall.
        step(&mut w, FrameInput::default(), 0.1);
        assert_eq!((w.enemies[0].x, w.enemies[0].y), (130.0, 110.0));
    }

    #[test]
    fn enemy_contact_costs_a_life_only_after_sustained_overlap() {
        let enemy = Enemy::new(300.0, 300.0); // dir None: stationary
        let mut w = world_with(vec![LevelObject::Enemy(enemy)]);
        place_player(&mut w, 300.0, 300.0);

        let events = step(&mut w, FrameInput::default(), 0.1);
        assert!(events.is_empty());
        assert_eq!(w.player.lives, 5);

        let events = step(&mut w, FrameInput::default(), 0.1);
        assert_eq!(events, vec![GameEvent::LifeLost]);
        assert_eq!(w.player.lives, 4);
        // Threshold firing resets the accumulator.
        assert_eq!(w.enemies[0].overlap_timer, 0.0);
    }

    #[test]
    fn overlap_timer_resets_when_contact_breaks() {
        let enemy = Enemy::new(300.0, 300.0);
        let mut w = world_with(vec![LevelObject::Enemy(enemy)]);
        place_player(&mut w, 300.0, 300.0);

        step(&mut w, FrameInput::default(), 0.1);
        assert!(w.enemies[0].overlap_timer > 0.0);

        // Separate them: the grace window starts over.
        w.enemies[0].x = 1000.0;
        w.enemies[0].prev_x = 1000.0;
        step(&mut w, FrameInput::default(), 0.1);
        assert_eq!(w.enemies[0].overlap_timer, 0.0);
        assert_eq!(w.player.lives, 5);
    }

    #[test]
    fn trap_drains_a_life_per_threshold_crossing() {
        let mut w = world_with(vec![LevelObject::Trap(Trap::new(300.0, 300.0))]);
        place_player(&mut w, 300.0, 300.0);

        let mut lost = 0;
        for _ in 0..8 {
            let events = step(&mut w, FrameInput::default(), 0.05);
            lost += events.iter().filter(|e| **e == GameEvent::LifeLost).count();
        }
        // 0.4s of continuous overlap at a 0.2s threshold: two crossings.
        assert_eq!(lost, 2);
        assert_eq!(w.player.lives, 3);
    }

    #[test]
    fn key_signal_fires_exactly_once() {
        let mut w = world_with(vec![LevelObject::Key(KeyItem::new(300.0, 300.0))]);
        place_player(&mut w, 300.0, 300.0);

        let mut collected = 0;
        for _ in 0..20 {
            let events = step(&mut w, FrameInput::default(), 0.016);
            collected += events.iter().filter(|e| **e == GameEvent::KeyCollected).count();
        }
        assert_eq!(collected, 1);
        assert!(w.player.key_collected);
    }

    #[test]
    fn exit_blocks_player_without_key() {
        let mut w = world_with(vec![LevelObject::Exit(ExitDoor::new(160.0, 100.0))]);
        place_player(&mut w, 125.0, 110.0);

        for _ in 0..50 {
            step(&mut w, input(MoveDir::Right), 0.016);
        }
        assert!(!w.player.bounds().overlaps(&w.exits[0].bounds()));
        assert_eq!(w.state, GameState::Playing);
    }

    #[test]
    fn dwelling_on_exit_with_key_wins_once() {
        let mut w = world_with(vec![LevelObject::Exit(ExitDoor::new(512.0, 512.0))]);
        place_player(&mut w, 522.0, 522.0);
        w.player.key_collected = true;

        let events = step(&mut w, FrameInput::default(), 0.06);
        assert!(events.is_empty());
        assert_eq!(w.state, GameState::Playing);

        let events = step(&mut w, FrameInput::default(), 0.06);
        assert_eq!(events, vec![GameEvent::GameWon]);
        assert_eq!(w.state, GameState::Won);
        assert_eq!(w.player.facing, Facing::Exiting);
        // Player snaps into the doorway.
        assert_eq!((w.player.x, w.player.y), (512.0 + 15.0, 512.0 + 5.0));

        // Terminal state never re-fires.
        for _ in 0..10 {
            assert!(step(&mut w, FrameInput::default(), 0.06).is_empty());
        }
    }

    #[test]
    fn win_captures_elapsed_whole_seconds() {
        let mut w = world_with(vec![LevelObject::Exit(ExitDoor::new(512.0, 512.0))]);
        place_player(&mut w, 522.0, 522.0);

        // Wander around for a while before stepping onto the exit.
        w.player.key_collected = false;
        place_player(&mut w, 2000.0, 2000.0);
        for _ in 0..100 {
            step(&mut w, FrameInput::default(), 0.4); // 40s of play
        }
        w.player.key_collected = true;
        place_player(&mut w, 522.0, 522.0);
        while w.state == GameState::Playing {
            step(&mut w, FrameInput::default(), 0.06);
        }
        assert_eq!(w.completed_in, (w.play_time.round()) as u32);
        assert!(w.completed_in >= 40);
        assert_eq!(w.score(), 1000 - (w.completed_in - 30) * 10);
    }

    #[test]
    fn last_life_lost_to_a_trap_ends_the_game_that_frame() {
        let mut w = world_with(vec![LevelObject::Trap(Trap::new(300.0, 300.0))]);
        place_player(&mut w, 300.0, 300.0);
        w.player.lives = 1;

        let events = step(&mut w, FrameInput::default(), 0.2);
        assert_eq!(events, vec![GameEvent::LifeLost, GameEvent::GameLost]);
        assert_eq!(w.state, GameState::Lost);
        assert_eq!(w.player.lives, 0);
        assert_eq!(w.score(), 0);

        // Everything is frozen afterwards.
        let (px, py) = (w.player.x, w.player.y);
        for _ in 0..5 {
            assert!(step(&mut w, input(MoveDir::Right), 0.1).is_empty());
        }
        assert_eq!((w.player.x, w.player.y), (px, py));
    }

    #[test]
    fn loss_beats_win_in_the_same_frame() {
        // Trap and exit share the doorway; the player arrives with the
        // key, one life, and a timer about to fire both ways.
        let mut w = world_with(vec![
            LevelObject::Trap(Trap::new(512.0, 512.0)),
            LevelObject::Exit(ExitDoor::new(512.0, 512.0)),
        ]);
        place_player(&mut w, 515.0, 515.0);
        w.player.key_collected = true;
        w.player.lives = 1;

        let events = step(&mut w, FrameInput::default(), 0.25);
        assert_eq!(w.state, GameState::Lost);
        assert!(events.contains(&GameEvent::GameLost));
        assert!(!events.contains(&GameEvent::GameWon));
    }

    #[test]
    fn cannot_leave_through_the_entry_side() {
        let mut w = world_with(vec![LevelObject::Entry(Entry::new(64.0, 64.0))]);
        place_player(&mut w, 80.0, 70.0);

        for _ in 0..100 {
            step(&mut w, input(MoveDir::Left), 0.016);
        }
        assert!(w.player.x >= 64.0);
    }

    #[test]
    fn moving_records_prev_on_that_axis_before_the_move() {
        let mut w = world_with(vec![]);
        place_player(&mut w, 300.0, 300.0);

        step(&mut w, input(MoveDir::Up), 0.1);
        assert_eq!(w.player.prev_y, 300.0);
        assert!((w.player.y - 320.0).abs() < 1e-3);
        assert_eq!(w.player.facing, Facing::Up);
    }
}
