//! Simulation constants and tuning parameters.

/// Nominal frame rate (Hz) used by `SimulationEngine::tick`.
pub const TICK_RATE: u32 = 60;

/// Seconds per nominal frame.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Screen ---

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: f32 = 360.0;

/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: f32 = 640.0;

// --- Motion paths ---

/// Number of samples along the semi-circle formation arc.
pub const SEMI_CIRCLE_SAMPLES: usize = 20;

/// Number of samples along Bezier and Catmull-Rom formation curves.
pub const SPLINE_SAMPLES: usize = 100;

/// Minimum number of control points for spline formations.
pub const SPLINE_MIN_CONTROL_POINTS: usize = 3;

/// Members in an arrow (chevron) formation.
pub const ARROW_MEMBERS: usize = 7;

/// Spacing factor between arrow members, relative to their hitbox.
pub const ARROW_SPACING: f32 = 1.1;

/// Linear and arrow formations travel this many screen lengths before leaving.
pub const TRAVERSAL_SCREENS: f32 = 3.0;

/// Pause between boss patrol legs (seconds).
pub const BOSS_LEG_DELAY: f32 = 2.0;

/// Pause before the boss patrol loop reverses (seconds).
pub const BOSS_REPEAT_DELAY: f32 = 1.0;

/// Vertical gap between the top of the boss and the top of the screen.
pub const BOSS_TOP_MARGIN: f32 = 20.0;

// --- Squadrons & rewards ---

/// How long the floating squadron bonus text stays on screen (seconds).
pub const SCORE_TEXT_LIFETIME: f32 = 1.5;

/// Pickups drift down to this height before disappearing.
pub const PICKUP_FLOOR_Y: f32 = 50.0;

/// Time a pickup takes to drift down to `PICKUP_FLOOR_Y` (seconds).
pub const PICKUP_DRIFT_SECS: f32 = 8.0;

// --- Combat ---

/// Hits credited to an enemy caught in a bomb/explosion chain.
pub const HIT_EXPLOSION: u32 = 5;

/// Boss health fraction below which the boss turns red (one-way).
pub const BOSS_TINT_THRESHOLD: f32 = 0.25;

/// Explosion visual size (square, pixels).
pub const EXPLOSION_SIZE: f32 = 32.0;

/// Lifetime of an explosion visual (seconds).
pub const EXPLOSION_LIFETIME: f32 = 0.5;

/// Duration of the boss move to screen centre during its death sequence.
pub const BOSS_DEATH_MOVE_SECS: f32 = 5.0;

/// Half period of the boss/player flicker (seconds).
pub const FLICKER_HALF_PERIOD: f32 = 0.2;

/// Number of yoyo repeats of the boss death flicker.
pub const BOSS_DEATH_FLICKER_REPEATS: u32 = 25;

/// Delay between the boss disappearing and the level-finished banner.
pub const LEVEL_FINISHED_DELAY: f32 = 2.0;

/// Duration of the level-finished grace period before the next level.
pub const NEXT_LEVEL_DELAY: f32 = 5.0;

/// Lifetime of a shield picked up by the player (seconds).
pub const SHIELD_LIFETIME: f32 = 7.0;

/// Invulnerability window after a continue (seconds).
pub const CONTINUE_INVULNERABILITY: f32 = 4.0;

/// Invulnerability after losing a life (seconds).
pub const RESPAWN_INVULNERABILITY: f32 = 2.0;

/// Screen shake when a laser ship or tank dies: (intensity, seconds).
pub const HEAVY_KILL_SHAKE: (f32, f32) = (10.0, 0.5);

/// Screen shake when the boss dies or a bomb goes off: (intensity, seconds).
pub const BIG_SHAKE: (f32, f32) = (20.0, 1.0);

// --- Achievements ---

/// Generic kill counts that unlock an achievement.
pub const KILL_ACHIEVEMENT_THRESHOLDS: [u32; 3] = [50, 100, 500];

/// Laser ship kill counts that unlock an achievement.
pub const LASER_SHIP_ACHIEVEMENT_THRESHOLDS: [u32; 2] = [1, 5];

// --- Player ---

pub const PLAYER_ORIGIN_X: f32 = SCREEN_WIDTH / 2.0 - 16.0;
pub const PLAYER_ORIGIN_Y: f32 = 40.0;
pub const PLAYER_LIVES: u32 = 3;
pub const PLAYER_BOMBS: u32 = 2;
pub const PLAYER_CONTINUES: u32 = 2;
pub const PLAYER_BULLET_VELOCITY: f32 = 500.0;
pub const PLAYER_BULLET_VELOCITY_FAST: f32 = 750.0;
/// Horizontal gap between side-by-side player bullets.
pub const PLAYER_BULLET_SPREAD: f32 = 10.0;

/// Player ship hitbox (square, pixels).
pub const PLAYER_SIZE: f32 = 32.0;

/// Bullet hitbox (square, pixels), both sides.
pub const BULLET_SIZE: f32 = 8.0;

/// Pickup hitbox (square, pixels).
pub const PICKUP_SIZE: f32 = 24.0;

/// Shield diameter (pixels), centred on the player.
pub const SHIELD_SIZE: f32 = 64.0;

// --- Enemy attacks ---

/// Chance per second that an idle armed enemy starts an attack.
pub const ENEMY_FIRE_CHANCE_PER_SEC: f64 = 0.25;

/// Chance per second that the boss starts an attack.
pub const BOSS_FIRE_CHANCE_PER_SEC: f64 = 1.0;

/// Wind-up between deciding to fire and releasing the bullet (seconds).
pub const ATTACK_WINDUP_SECS: f32 = 0.3;

/// Maximum random deviation of an aimed enemy bullet (degrees).
pub const ENEMY_BULLET_SPREAD_DEG: f32 = 10.0;

/// Angle between the bullets of the boss fan (degrees).
pub const BOSS_FAN_ANGLE_DEG: f32 = 15.0;

// --- Level script ---

/// Script clock value when a level starts (lead-in before second 0).
pub const SCRIPT_START_SECS: f32 = -3.0;

/// Margin outside the screen after which free-moving entities are removed.
pub const OOB_MARGIN: f32 = 64.0;
