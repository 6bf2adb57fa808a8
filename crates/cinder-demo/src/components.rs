use cinder_engine::ecs::{Component, EntityId};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}
impl Component for Position {}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}
impl Component for Velocity {}

/// Weak reference to the entity being chased.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Target {
    pub entity: EntityId,
    pub speed: f32,
}
impl Component for Target {}

/// Seconds left before the entity despawns.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lifetime(pub f32);
impl Component for Lifetime {}
