/// Enemy wander behaviour: pick a uniformly random direction every
/// 1–5 seconds, drift along it at a fixed speed in between.
///
/// Each enemy owns its own timer/interval pair; the interval is redrawn
/// from [1, 5) every time a direction is picked, so enemies decide
/// independently of each other. A fresh enemy has interval 0, so its
/// first tick always picks a direction.

use rand::Rng;

use crate::domain::entity::{Enemy, MoveDir, ALL_DIRS};

pub const INTERVAL_MIN: f32 = 1.0;
pub const INTERVAL_MAX: f32 = 5.0;

/// Advance the direction-change clock and, when due, pick a new random
/// direction and redraw the decision interval.
pub fn decide<R: Rng>(enemy: &mut Enemy, rng: &mut R, dt: f32, min: f32, max: f32) {
    enemy.dir_timer += dt;
    if enemy.dir_timer >= enemy.dir_interval {
        enemy.dir = Some(ALL_DIRS[rng.gen_range(0..ALL_DIRS.len())]);
        enemy.dir_timer = 0.0;
        enemy.dir_interval = rng.gen_range(min..max);
    }
}

/// Drift along the chosen direction. The axis being changed is recorded
/// as the previous position first, so a later collision can roll it back.
/// Paused enemies (win/loss freeze) and enemies with no direction yet
/// stay put.
pub fn advance(enemy: &mut Enemy, dt: f32, speed: f32) {
    if enemy.paused {
        return;
    }
    let dir = match enemy.dir {
        Some(d) => d,
        None => return,
    };
    match dir {
        MoveDir::Up => {
            enemy.prev_y = enemy.y;
            enemy.y += dt * speed;
        }
        MoveDir::Down => {
            enemy.prev_y = enemy.y;
            enemy.y -= dt * speed;
        }
        MoveDir::Right => {
            enemy.prev_x = enemy.x;
            enemy.x += dt * speed;
        }
        MoveDir::Left => {
            enemy.prev_x = enemy.x;
            enemy.x -= dt * speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn first_tick_picks_a_direction() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut e = Enemy::new(0.0, 0.0);
        assert!(e.dir.is_none());
        decide(&mut e, &mut rng, 0.016, INTERVAL_MIN, INTERVAL_MAX);
        assert!(e.dir.is_some());
        assert_eq!(e.dir_timer, 0.0);
        assert!(e.dir_interval >= INTERVAL_MIN && e.dir_interval < INTERVAL_MAX);
    }

    #[test]
    fn direction_holds_until_interval_elapses() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut e = Enemy::new(0.0, 0.0);
        decide(&mut e, &mut rng, 0.016, INTERVAL_MIN, INTERVAL_MAX);
        let first = e.dir;
        let interval = e.dir_interval;

        // Tick up to just under the interval: no re-decision.
        let mut elapsed = 0.0;
        while elapsed + 0.1 < interval {
            decide(&mut e, &mut rng, 0.1, INTERVAL_MIN, INTERVAL_MAX);
            elapsed += 0.1;
            assert_eq!(e.dir, first);
        }

        // Crossing the interval resets the timer.
        decide(&mut e, &mut rng, interval, INTERVAL_MIN, INTERVAL_MAX);
        assert_eq!(e.dir_timer, 0.0);
    }

    #[test]
    fn advance_moves_at_fixed_speed() {
        let mut e = Enemy::new(100.0, 100.0);
        e.dir = Some(MoveDir::Right);
        advance(&mut e, 0.5, 125.0);
        assert!((e.x - 162.5).abs() < 1e-4);
        assert_eq!(e.prev_x, 100.0);
        assert_eq!(e.y, 100.0);
    }

    #[test]
    fn advance_records_prev_on_moved_axis_only() {
        let mut e = Enemy::new(100.0, 200.0);
        e.dir = Some(MoveDir::Up);
        advance(&mut e, 0.1, 125.0);
        assert_eq!(e.prev_y, 200.0);
        assert_eq!(e.prev_x, 100.0); // untouched seed value
        assert!(e.y > 200.0);
    }

    #[test]
    fn paused_enemy_does_not_move() {
        let mut e = Enemy::new(100.0, 100.0);
        e.dir = Some(MoveDir::Left);
        e.paused = true;
        advance(&mut e, 1.0, 125.0);
        assert_eq!((e.x, e.y), (100.0, 100.0));
    }

    #[test]
    fn directionless_enemy_stays_put() {
        let mut e = Enemy::new(100.0, 100.0);
        advance(&mut e, 1.0, 125.0);
        assert_eq!((e.x, e.y), (100.0, 100.0));
    }
}
