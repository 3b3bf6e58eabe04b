/// Axis-aligned rectangle geometry.
///
/// Everything that collides in the maze is an AABB in world units.
/// One maze tile is 64×64 world units; the small obstacle sprites
/// (enemy, trap, key) are 25×40 and the player is 30×44.
///
/// Overlap is strict: rectangles that merely share an edge do NOT
/// overlap. Bounds are always recomputed from the owner's current
/// position before a collision test, never cached across a tick.

/// World-unit edge length of one maze tile.
pub const TILE: f32 = 64.0;

/// Size of tile-class entities: Wall, Entry, Exit.
pub const TILE_W: f32 = 64.0;
pub const TILE_H: f32 = 64.0;

/// Size of small-class entities: Enemy, Trap, Key.
pub const SMALL_W: f32 = 25.0;
pub const SMALL_H: f32 = 40.0;

/// Size of the player sprite.
pub const PLAYER_W: f32 = 30.0;
pub const PLAYER_H: f32 = 44.0;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Strict AABB overlap test.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}
