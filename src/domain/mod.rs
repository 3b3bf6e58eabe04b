pub mod entity;
pub mod physics;
pub mod wander;
