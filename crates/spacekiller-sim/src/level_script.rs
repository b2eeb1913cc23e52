//! Level script driver: a clock that issues spawn commands keyed by
//! integer seconds.
//!
//! The clock starts before zero to give the player a lead-in. Every whole
//! second crossed by an advance is issued exactly once, in order, even when
//! a single frame spans several seconds.

use spacekiller_core::enums::Level;

use crate::scripts;
use crate::squadrons::SquadronSpec;

/// What a script second asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Squadron(SquadronSpec),
    /// Drop a bomb pickup at horizontal position `x` from the top edge.
    BombUp { x: f32 },
    /// Remember this second as the restart point after a continue.
    Checkpoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptEntry {
    pub second: i32,
    pub command: ScriptCommand,
}

impl ScriptEntry {
    pub fn new(second: i32, command: ScriptCommand) -> Self {
        Self { second, command }
    }

    pub fn squadron(second: i32, spec: SquadronSpec) -> Self {
        Self::new(second, ScriptCommand::Squadron(spec))
    }
}

#[derive(Debug, Clone)]
pub struct LevelScript {
    level: Level,
    time: f32,
    last_issued: i32,
    entries: Vec<ScriptEntry>,
}

impl LevelScript {
    pub fn new(level: Level, entries: Vec<ScriptEntry>, start: f32) -> Self {
        Self {
            level,
            time: start,
            last_issued: start.floor() as i32,
            entries,
        }
    }

    /// The built-in script for `level`.
    pub fn for_level(level: Level, start: f32) -> Self {
        Self::new(level, scripts::entries(level), start)
    }

    /// Advance the clock and return the seconds crossed, oldest first.
    pub fn advance(&mut self, dt: f32) -> Vec<i32> {
        self.time += dt.max(0.0);
        let reached = self.time.floor() as i32;
        if reached <= self.last_issued {
            return Vec::new();
        }
        let crossed = (self.last_issued + 1..=reached).collect();
        self.last_issued = reached;
        crossed
    }

    /// Commands scheduled at `second`, in script order.
    pub fn commands_at(&self, second: i32) -> impl Iterator<Item = &ScriptCommand> {
        self.entries
            .iter()
            .filter(move |e| e.second == second)
            .map(|e| &e.command)
    }

    /// Restart from `second`; it is issued again on the next advance.
    pub fn rewind_to(&mut self, second: i32) {
        self.time = second as f32;
        self.last_issued = second - 1;
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Last second holding a command, if any.
    pub fn last_second(&self) -> Option<i32> {
        self.entries.iter().map(|e| e.second).max()
    }
}
