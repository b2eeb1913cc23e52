//! Fundamental geometric and simulation types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 2D position in screen space (pixels, y grows upward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// 2D velocity in screen space (pixels per second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned box size, anchored at an entity's `Position` (bottom-left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub width: f32,
    pub height: f32,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each unpaused tick).
    pub tick: u64,
    /// Elapsed unpaused simulation time in seconds.
    pub elapsed_secs: f64,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        self.to_vec2().distance(other.to_vec2())
    }

    /// Linear interpolation towards `other` (`t` in 0..=1).
    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        Position::from(self.to_vec2().lerp(other.to_vec2(), t))
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for Position {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl Velocity {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn speed(&self) -> f32 {
        Vec2::new(self.x, self.y).length()
    }
}

impl From<Vec2> for Velocity {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl Hitbox {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether two boxes anchored at the given positions overlap.
    pub fn overlaps(&self, at: &Position, other: &Hitbox, other_at: &Position) -> bool {
        at.x < other_at.x + other.width
            && other_at.x < at.x + self.width
            && at.y < other_at.y + other.height
            && other_at.y < at.y + self.height
    }

    /// Centre of this box when anchored at `at`.
    pub fn center(&self, at: &Position) -> Position {
        Position::new(at.x + self.width / 2.0, at.y + self.height / 2.0)
    }
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed_secs += dt as f64;
    }
}
