//! Simulation engine, the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, processes player commands,
//! drives the level script, runs all systems, and produces
//! `GameStateSnapshot`s. Completely headless: rendering, audio and online
//! services sit behind `GameHost`.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use spacekiller_core::commands::PlayerCommand;
use spacekiller_core::components::{Flicker, Invulnerable, LevelFinished, Player};
use spacekiller_core::constants::*;
use spacekiller_core::enums::{GamePhase, Level, Screen, ShipKind, SoundId};
use spacekiller_core::events::GameEvent;
use spacekiller_core::state::GameStateSnapshot;
use spacekiller_core::types::{Position, SimTime};

use crate::clock::{Scheduler, TimedTask};
use crate::error::SimError;
use crate::host::{self, DefaultPlayerListener, GameHost, NullHost, PlayerListener};
use crate::level_script::{LevelScript, ScriptCommand};
use crate::mask::{MaskLoader, MaskStore};
use crate::squadrons::{self, SquadronSpec};
use crate::systems;
use crate::systems::combat::{self, CombatContext};
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Level loaded by `SimulationEngine::start`.
    pub level: Level,
    /// Script clock value at level start.
    pub script_start: f32,
    pub lives: u32,
    pub bombs: u32,
    pub continues: u32,
    /// Seconds simulated by each `tick()`.
    pub frame_dt: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            level: Level::Level1,
            script_start: SCRIPT_START_SECS,
            lives: PLAYER_LIVES,
            bombs: PLAYER_BOMBS,
            continues: PLAYER_CONTINUES,
            frame_dt: DT,
        }
    }
}

impl SimConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    fn fresh_player(&self) -> Player {
        Player::new(self.lives, self.bombs, self.continues)
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    level: Level,
    config: SimConfig,
    rng: ChaCha8Rng,
    scheduler: Scheduler,
    script: LevelScript,
    player: Entity,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<GameEvent>,
    masks: MaskStore,
    host: Box<dyn GameHost>,
    listener: Box<dyn PlayerListener>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config. The engine
    /// waits in the main menu until a `StartLevel` command arrives.
    pub fn new(config: SimConfig) -> Self {
        let mut world = World::new();
        let player = world_setup::spawn_player(&mut world, config.fresh_player());
        Self {
            world,
            time: SimTime::default(),
            phase: GamePhase::default(),
            level: config.level,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            scheduler: Scheduler::new(),
            script: LevelScript::for_level(config.level, config.script_start),
            player,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            masks: MaskStore::new(),
            host: Box::new(NullHost),
            listener: Box::new(DefaultPlayerListener::new(config.lives, config.bombs)),
            config,
        }
    }

    pub fn with_host(mut self, host: Box<dyn GameHost>) -> Self {
        self.host = host;
        self
    }

    pub fn with_listener(mut self, listener: Box<dyn PlayerListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Refine bullet hits on `kind` with a per-pixel mask.
    pub fn set_mask(&mut self, kind: ShipKind, mask: MaskLoader) {
        self.masks.insert(kind, mask);
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Start the configured level immediately.
    pub fn start(&mut self) {
        let player = self.config.fresh_player();
        self.load_level(self.config.level, player);
    }

    /// Advance by one nominal frame.
    pub fn tick(&mut self) -> Result<GameStateSnapshot, SimError> {
        self.step(self.config.frame_dt)
    }

    /// Advance the simulation by `dt` seconds and return the resulting
    /// snapshot. A formation error aborts the tick.
    pub fn step(&mut self, dt: f32) -> Result<GameStateSnapshot, SimError> {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems(dt)?;
            self.time.advance(dt);
        }

        let events = std::mem::take(&mut self.events);
        for event in &events {
            host::dispatch(self.host.as_mut(), event);
        }
        Ok(systems::snapshot::build_snapshot(
            &self.world,
            self.player,
            &self.time,
            self.phase,
            self.level,
            self.script.time(),
            events,
        ))
    }

    /// Spawn a squadron outside the level script.
    pub fn spawn_squadron(&mut self, spec: &SquadronSpec) -> Result<Entity, SimError> {
        Ok(squadrons::create_squadron(
            &mut self.world,
            &mut self.rng,
            spec,
        )?)
    }

    /// Replace the running level script (custom content, tests).
    pub fn set_script(&mut self, script: LevelScript) {
        self.script = script;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn script_time(&self) -> f32 {
        self.script.time()
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    /// Copy of the player's bookkeeping.
    pub fn player_state(&self) -> Option<Player> {
        self.world.get::<&Player>(self.player).ok().map(|p| (*p).clone())
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Read-only access to the ECS world (for testing and inspection).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the ECS world (for testing).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    // --- Private ---

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartLevel { level } => {
                let player = self.config.fresh_player();
                self.load_level(level, player);
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                    self.scheduler.pause();
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                    self.scheduler.resume();
                }
            }
            PlayerCommand::ContinueWithExtraLife => self.continue_with_extra_life(),
            PlayerCommand::Quit => {
                self.world.clear();
                self.scheduler.clear();
                self.player = world_setup::spawn_player(&mut self.world, self.config.fresh_player());
                self.phase = GamePhase::MainMenu;
                self.events.push(GameEvent::GoToScreen {
                    screen: Screen::Menu,
                });
                info!("quit to menu");
            }
            PlayerCommand::Move { dx, dy } => {
                if self.controls_locked() {
                    return;
                }
                if let Ok(mut pos) = self.world.get::<&mut Position>(self.player) {
                    pos.x = (pos.x + dx).clamp(0.0, SCREEN_WIDTH - PLAYER_SIZE);
                    pos.y = (pos.y + dy).clamp(0.0, SCREEN_HEIGHT - PLAYER_SIZE);
                }
            }
            PlayerCommand::Fire => {
                if self.controls_locked() {
                    return;
                }
                let power = self.world.get::<&Player>(self.player).map(|p| p.power_level);
                let pos = self.world.get::<&Position>(self.player).map(|p| *p);
                if let (Ok(power), Ok(pos)) = (power, pos) {
                    world_setup::spawn_player_bullets(&mut self.world, pos, power);
                    self.events.push(GameEvent::Sound {
                        sound: SoundId::PlayerFire,
                        volume: None,
                    });
                }
            }
            PlayerCommand::DropBomb => {
                if self.controls_locked() {
                    return;
                }
                let mut ctx = CombatContext {
                    player: self.player,
                    listener: &mut *self.listener,
                    scheduler: &mut self.scheduler,
                    events: &mut self.events,
                };
                combat::drop_bomb(&mut self.world, &mut ctx);
            }
        }
    }

    /// Player input is ignored outside active play and once the level is won.
    fn controls_locked(&self) -> bool {
        self.phase != GamePhase::Active
            || combat::has::<LevelFinished>(&self.world, self.player)
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f32) -> Result<(), SimError> {
        // 0. Level script
        for second in self.script.advance(dt) {
            self.run_script_second(second)?;
        }

        // 1. Timed tasks
        for task in self.scheduler.advance(dt) {
            self.run_task(task);
        }

        // 2. Motion paths, then free movement
        systems::motion::run(&mut self.world, dt, &mut self.despawn_buffer);
        systems::movement::run(&mut self.world, dt);

        // 3. Explosions, shields, invulnerability, flicker
        systems::effects::run(&mut self.world, self.player, dt, &mut self.despawn_buffer);

        // 4. Collisions and combat, then the squadron sweep
        let collisions = systems::collision::detect(&self.world, self.player, &mut self.masks);
        {
            let mut ctx = CombatContext {
                player: self.player,
                listener: &mut *self.listener,
                scheduler: &mut self.scheduler,
                events: &mut self.events,
            };
            systems::collision::apply(&mut self.world, &mut ctx, &collisions);
            systems::combat::advance_boss_deaths(&mut self.world, &mut ctx, dt);
            systems::squadron::run(&mut self.world, &mut self.rng, &mut ctx);
        }

        // 5. Enemy attack intents
        systems::attack::run(
            &mut self.world,
            &mut self.rng,
            self.player,
            dt,
            &mut self.events,
        );

        // 6. Cleanup
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);

        let game_over = self
            .world
            .get::<&Player>(self.player)
            .map_or(false, |p| p.game_over);
        if game_over && self.phase != GamePhase::GameOver {
            self.phase = GamePhase::GameOver;
            self.scheduler.pause();
            self.events.push(GameEvent::GoToScreen {
                screen: Screen::GameOver,
            });
        }
        Ok(())
    }

    fn run_script_second(&mut self, second: i32) -> Result<(), SimError> {
        let commands: Vec<ScriptCommand> = self.script.commands_at(second).cloned().collect();
        for command in commands {
            match command {
                ScriptCommand::Squadron(spec) => {
                    squadrons::create_squadron(&mut self.world, &mut self.rng, &spec).map_err(
                        |err| {
                            error!(second, level = ?self.level, "{err}");
                            err
                        },
                    )?;
                }
                ScriptCommand::BombUp { x } => {
                    world_setup::spawn_bomb_up(&mut self.world, Position::new(x, SCREEN_HEIGHT));
                }
                ScriptCommand::Checkpoint => {
                    if let Ok(mut player) = self.world.get::<&mut Player>(self.player) {
                        player.checkpoint_second = second;
                    }
                }
            }
        }
        Ok(())
    }

    fn run_task(&mut self, task: TimedTask) {
        match task {
            TimedTask::RemoveEntity(entity) => {
                world_setup::remove_entity(&mut self.world, entity);
            }
            TimedTask::MarkLevelFinished => {
                let _ = self.world.insert_one(self.player, LevelFinished);
                self.scheduler
                    .schedule(NEXT_LEVEL_DELAY, TimedTask::AdvanceLevel);
                info!(level = ?self.level, "level finished");
            }
            TimedTask::AdvanceLevel => self.advance_level(),
        }
    }

    fn advance_level(&mut self) {
        let from = self.level;
        let next = from.next();
        self.events.push(GameEvent::AchievementUnlocked {
            achievement: from.boss_achievement(),
        });
        self.events.push(GameEvent::NextLevel { from, next });

        let player = self
            .player_state()
            .unwrap_or_else(|| self.config.fresh_player());
        self.load_level(next, player);
    }

    /// Reset the world for `level`, carrying `player` over.
    fn load_level(&mut self, level: Level, mut player: Player) {
        player.checkpoint_second = 0;
        self.world.clear();
        self.scheduler.clear();
        self.scheduler.resume();
        self.player = world_setup::spawn_player(&mut self.world, player);
        self.level = level;
        self.script = LevelScript::for_level(level, self.config.script_start);
        self.phase = GamePhase::Active;
        info!(?level, "level started");
    }

    fn continue_with_extra_life(&mut self) {
        if self.phase != GamePhase::GameOver {
            return;
        }
        let restored = {
            let Ok(mut player) = self.world.get::<&mut Player>(self.player) else {
                return;
            };
            if player.continues == 0 {
                warn!("no continue left");
                return;
            }
            player.continues -= 1;
            self.listener
                .update_lives_and_bombs_after_continue(&mut player);
            player.score = 0;
            (player.lives, player.bombs, player.checkpoint_second)
        };
        let (lives, bombs, checkpoint) = restored;
        self.events
            .push(GameEvent::LivesAndBombsRestored { lives, bombs });

        if let Ok(mut pos) = self.world.get::<&mut Position>(self.player) {
            *pos = Position::new(PLAYER_ORIGIN_X, PLAYER_ORIGIN_Y);
        }
        let _ = self.world.insert(
            self.player,
            (
                Invulnerable {
                    remaining_secs: Some(CONTINUE_INVULNERABILITY),
                },
                Flicker::new(FLICKER_HALF_PERIOD),
            ),
        );
        self.script.rewind_to(checkpoint);
        self.scheduler.resume();
        self.phase = GamePhase::Active;
        info!(checkpoint, "continue with extra life");
    }
}
