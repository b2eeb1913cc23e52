//! Motion paths: precomputed waypoint sequences that drive enemy and pickup
//! movement directly, bypassing velocity integration.
//!
//! A `MotionPath` is immutable once generated. Per-entity traversal state
//! lives in `PathFollower`, which is stepped by the motion system.

use serde::{Deserialize, Serialize};

use crate::types::Position;

/// One leg of a path: move to `target` over `duration` seconds after
/// waiting `delay` seconds at the previous point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub target: Position,
    pub duration: f32,
    pub delay: f32,
}

/// What happens once the last waypoint is reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Repeat {
    /// Path completes; the follower reports `finished`.
    Once,
    /// Path plays back in reverse, then forward again, forever.
    Yoyo { delay: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionPath {
    pub origin: Position,
    pub waypoints: Vec<Waypoint>,
    pub repeat: Repeat,
}

impl Waypoint {
    pub fn new(target: Position, duration: f32) -> Self {
        Self {
            target,
            duration,
            delay: 0.0,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

impl MotionPath {
    /// A path from `origin` through `targets`, each leg taking
    /// distance / velocity seconds.
    pub fn through(origin: Position, targets: &[Position], velocity: f32) -> Self {
        let mut waypoints = Vec::with_capacity(targets.len());
        let mut from = origin;
        for &target in targets {
            waypoints.push(Waypoint::new(target, from.distance_to(&target) / velocity));
            from = target;
        }
        Self {
            origin,
            waypoints,
            repeat: Repeat::Once,
        }
    }

    /// Sum of all leg delays and durations for one forward pass.
    pub fn pass_duration(&self) -> f32 {
        self.waypoints.iter().map(|w| w.delay + w.duration).sum()
    }

    /// Final point of a forward pass.
    pub fn end(&self) -> Position {
        self.waypoints.last().map_or(self.origin, |w| w.target)
    }

    pub fn is_repeating(&self) -> bool {
        matches!(self.repeat, Repeat::Yoyo { .. })
    }

    /// Start point of leg `index` in forward order.
    fn leg_start(&self, index: usize) -> Position {
        if index == 0 {
            self.origin
        } else {
            self.waypoints[index - 1].target
        }
    }
}

/// Traversal state of one entity along its `MotionPath`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathFollower {
    pub path: MotionPath,
    /// Legs completed in the current pass.
    pub leg: usize,
    /// Time spent in the current leg, delay included.
    pub elapsed: f32,
    /// Playing the path backwards (yoyo).
    pub reversed: bool,
    /// Remaining wait before the next yoyo pass starts.
    pub repeat_wait: f32,
    pub finished: bool,
}

impl PathFollower {
    pub fn new(path: MotionPath) -> Self {
        // A repeating path with no duration would never consume time.
        let degenerate = path.waypoints.is_empty()
            || (path.is_repeating() && path.pass_duration() <= 0.0);
        Self {
            path,
            leg: 0,
            elapsed: 0.0,
            reversed: false,
            repeat_wait: 0.0,
            finished: degenerate,
        }
    }

    /// Advance by `dt` seconds and return the new position.
    pub fn advance(&mut self, dt: f32) -> Position {
        let mut remaining = dt.max(0.0);
        loop {
            if self.finished {
                return self.path.end();
            }
            if self.repeat_wait > 0.0 {
                let used = remaining.min(self.repeat_wait);
                self.repeat_wait -= used;
                remaining -= used;
                if self.repeat_wait > 0.0 {
                    return self.current_position();
                }
            }

            let (_, _, waypoint) = self.current_leg();
            let total = waypoint.delay + waypoint.duration;
            if self.elapsed + remaining < total {
                self.elapsed += remaining;
                return self.current_position();
            }
            remaining -= (total - self.elapsed).max(0.0);
            self.elapsed = 0.0;
            self.leg += 1;

            if self.leg == self.path.waypoints.len() {
                match self.path.repeat {
                    Repeat::Once => {
                        self.finished = true;
                        return self.path.end();
                    }
                    Repeat::Yoyo { delay } => {
                        self.leg = 0;
                        self.reversed = !self.reversed;
                        self.repeat_wait = delay;
                    }
                }
            }
        }
    }

    /// Position for the current leg and elapsed time, without advancing.
    pub fn current_position(&self) -> Position {
        if self.finished {
            return self.path.end();
        }
        let (from, to, waypoint) = self.current_leg();
        let moving = self.elapsed - waypoint.delay;
        if moving <= 0.0 {
            return from;
        }
        if waypoint.duration <= 0.0 {
            return to;
        }
        from.lerp(&to, (moving / waypoint.duration).min(1.0))
    }

    /// (from, to, waypoint) of the leg currently being played.
    fn current_leg(&self) -> (Position, Position, Waypoint) {
        let count = self.path.waypoints.len();
        if self.reversed {
            let index = count - 1 - self.leg;
            let waypoint = self.path.waypoints[index];
            (waypoint.target, self.path.leg_start(index), waypoint)
        } else {
            let waypoint = self.path.waypoints[self.leg];
            (self.path.leg_start(self.leg), waypoint.target, waypoint)
        }
    }
}
