/// Entities: Player, Enemy, and the static maze objects
/// (Wall, Trap, Key, Entry, Exit).
///
/// Positions are floats in world units. Static objects never move after
/// load; Enemy and Player mutate every frame and carry independent
/// prev_x / prev_y fields, each recorded right before that axis is
/// changed, so the collision resolver can roll a mover back without the
/// two axes coupling.

use crate::domain::physics::{
    Rect, PLAYER_H, PLAYER_W, SMALL_H, SMALL_W, TILE_H, TILE_W,
};

/// Movement direction (continuous while key held; also the enemy
/// wander direction set).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRS: [MoveDir; 4] = [
    MoveDir::Up,
    MoveDir::Down,
    MoveDir::Left,
    MoveDir::Right,
];

/// Player facing pose. `Exiting` is the terminal pose forced while the
/// player walks through the exit door.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
    Exiting,
}

/// Frame input: at most one movement intent per tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: Option<MoveDir>,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub prev_x: f32,
    pub prev_y: f32,
    pub facing: Facing,
    pub lives: u32,
    pub key_collected: bool,
    pub paused: bool,
}

impl Player {
    pub fn new(x: f32, y: f32, lives: u32) -> Self {
        Player {
            x,
            y,
            prev_x: x,
            prev_y: y,
            facing: Facing::Down,
            lives,
            key_collected: false,
            paused: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, PLAYER_W, PLAYER_H)
    }

    /// Restore both axes to their last recorded positions.
    pub fn roll_back(&mut self) {
        self.x = self.prev_x;
        self.y = self.prev_y;
    }

    /// Lose one life. No-op at zero; lives never go negative.
    pub fn lose_life(&mut self) {
        if self.lives > 0 {
            self.lives -= 1;
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub prev_x: f32,
    pub prev_y: f32,
    /// None until the first wander decision fires.
    pub dir: Option<MoveDir>,
    /// Seconds since the last direction pick.
    pub dir_timer: f32,
    /// Seconds until the next direction pick. Starts at 0 so the first
    /// tick always picks a direction.
    pub dir_interval: f32,
    /// Continuous-overlap accumulator against the player.
    pub overlap_timer: f32,
    pub paused: bool,
}

impl Enemy {
    pub fn new(x: f32, y: f32) -> Self {
        Enemy {
            x,
            y,
            prev_x: x,
            prev_y: y,
            dir: None,
            dir_timer: 0.0,
            dir_interval: 0.0,
            overlap_timer: 0.0,
            paused: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, SMALL_W, SMALL_H)
    }

    pub fn roll_back(&mut self) {
        self.x = self.prev_x;
        self.y = self.prev_y;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Wall {
    pub x: f32,
    pub y: f32,
}

impl Wall {
    pub fn new(x: f32, y: f32) -> Self {
        Wall { x, y }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, TILE_W, TILE_H)
    }
}

#[derive(Clone, Debug)]
pub struct Trap {
    pub x: f32,
    pub y: f32,
    /// Continuous-overlap accumulator against the player.
    pub overlap_timer: f32,
}

impl Trap {
    pub fn new(x: f32, y: f32) -> Self {
        Trap { x, y, overlap_timer: 0.0 }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, SMALL_W, SMALL_H)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct KeyItem {
    pub x: f32,
    pub y: f32,
}

impl KeyItem {
    pub fn new(x: f32, y: f32) -> Self {
        KeyItem { x, y }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, SMALL_W, SMALL_H)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub x: f32,
    pub y: f32,
}

impl Entry {
    pub fn new(x: f32, y: f32) -> Self {
        Entry { x, y }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, TILE_W, TILE_H)
    }
}

#[derive(Clone, Debug)]
pub struct ExitDoor {
    pub x: f32,
    pub y: f32,
    /// Dwell accumulator while the key-holding player stands in the door.
    pub overlap_timer: f32,
}

impl ExitDoor {
    pub fn new(x: f32, y: f32) -> Self {
        ExitDoor { x, y, overlap_timer: 0.0 }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, TILE_W, TILE_H)
    }
}

/// One typed object produced by the level loader. The world partitions
/// these into its working sets with an exhaustive match.
#[derive(Clone, Debug)]
pub enum LevelObject {
    Wall(Wall),
    Entry(Entry),
    Exit(ExitDoor),
    Trap(Trap),
    Enemy(Enemy),
    Key(KeyItem),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lose_life_floors_at_zero() {
        let mut p = Player::new(0.0, 0.0, 2);
        p.lose_life();
        p.lose_life();
        assert_eq!(p.lives, 0);
        p.lose_life();
        assert_eq!(p.lives, 0);
    }

    #[test]
    fn roll_back_restores_both_axes() {
        let mut p = Player::new(100.0, 100.0, 5);
        p.prev_x = 100.0;
        p.prev_y = 100.0;
        p.x = 130.0;
        p.y = 90.0;
        p.roll_back();
        assert_eq!((p.x, p.y), (100.0, 100.0));
    }

    #[test]
    fn size_classes() {
        assert_eq!(Wall::new(0.0, 0.0).bounds().w, 64.0);
        assert_eq!(Trap::new(0.0, 0.0).bounds().w, 25.0);
        assert_eq!(Trap::new(0.0, 0.0).bounds().h, 40.0);
        let p = Player::new(0.0, 0.0, 5).bounds();
        assert_eq!((p.w, p.h), (30.0, 44.0));
    }
}
