//! Pausable virtual clock with one-shot timed tasks.
//!
//! Delayed effects (bonus text removal, boss death stages) are scheduled
//! against this clock rather than wall-clock time, so they freeze and
//! resume together with the game.

use hecs::Entity;

/// Work to perform once a scheduled delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedTask {
    /// Remove a transient entity (e.g. floating bonus text).
    RemoveEntity(Entity),
    /// Mark the player as having finished the level.
    MarkLevelFinished,
    /// Clear the level-finished mark and move to the next level.
    AdvanceLevel,
}

#[derive(Debug, Clone)]
struct Pending {
    due: f64,
    seq: u64,
    task: TimedTask,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: f64,
    paused: bool,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` seconds of unpaused time have passed.
    pub fn schedule(&mut self, delay: f32, task: TimedTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due: self.now + delay.max(0.0) as f64,
            seq,
            task,
        });
    }

    /// Advance the clock and return every task that became due, in due
    /// order (ties in scheduling order). Does nothing while paused.
    pub fn advance(&mut self, dt: f32) -> Vec<TimedTask> {
        if self.paused {
            return Vec::new();
        }
        self.now += dt.max(0.0) as f64;

        let now = self.now;
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.due <= now {
                due.push(p.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|p| p.task).collect()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Unpaused seconds elapsed since creation.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop every pending task (level change).
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
