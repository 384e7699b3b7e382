//! Fireworks Frenzy - tap the fireworks before they escape
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, scoring, lives)
//! - `game`: Frame controller that drives the simulation and persistence
//! - `persistence`: Local key-value storage (high score, session snapshot, identity)
//! - `leaderboard`: Remote leaderboard validation and wire types
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Player preferences

pub mod game;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation step (ms), one 60 Hz animation frame
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame deltas above this are clamped (tab switches, debugger pauses)
    pub const MAX_FRAME_MS: f32 = 250.0;

    /// Default arena size (canvas pixels)
    pub const DEFAULT_ARENA_WIDTH: f32 = 1280.0;
    pub const DEFAULT_ARENA_HEIGHT: f32 = 720.0;

    /// Lives
    pub const MAX_LIVES: u8 = 3;

    /// Combo
    pub const MAX_COMBO: u32 = 20;
    pub const COMBO_WINDOW_MS: f32 = 2000.0;

    /// Scoring
    pub const NORMAL_POINTS: u64 = 10;
    pub const GOLDEN_POINTS: u64 = 100;
    pub const BOMB_PENALTY: u64 = 50;
    pub const EXTRA_LIFE_BONUS: u64 = 500;
    /// Radius around a hit that multi-pop chains reach
    pub const CHAIN_RADIUS: f32 = 150.0;

    /// Hit-test tolerance multipliers on radius²
    pub const FIREWORK_HIT_FACTOR: f32 = 2.5;
    pub const POWERUP_HIT_FACTOR: f32 = 2.0;

    /// Spawning
    pub const INITIAL_SPAWN_INTERVAL_MS: f32 = 1500.0;
    pub const MIN_SPAWN_INTERVAL_MS: f32 = 400.0;
    pub const SPAWN_INTERVAL_STEP_MS: f32 = 100.0;
    pub const DIFFICULTY_PERIOD_MS: f32 = 10_000.0;
    pub const POWERUP_CHANCE: f32 = 0.08;
    /// Opening fireworks, by session time (ms)
    pub const OPENING_SALVO_MS: [f32; 3] = [0.0, 500.0, 1000.0];

    /// Effect durations (ms)
    pub const SHIELD_MS: f32 = 5000.0;
    pub const TIME_FREEZE_MS: f32 = 4000.0;
    pub const MULTI_POP_MS: f32 = 6000.0;
    /// Spawn interval multiplier and motion scale under time-freeze
    pub const FREEZE_SPAWN_SCALE: f32 = 3.0;
    pub const FREEZE_MOTION_SCALE: f32 = 0.3;

    /// Fireworks linger this long after exploding before removal (ms)
    pub const EXPLOSION_LINGER_MS: f32 = 500.0;
    /// Collected power-ups shrink away over this long (ms)
    pub const COLLECT_ANIM_MS: f32 = 300.0;

    /// Session snapshot cadence and expiry (ms)
    pub const SNAPSHOT_PERIOD_MS: f32 = 5000.0;
    pub const SNAPSHOT_MAX_AGE_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;
}

/// Scale factor turning a per-frame constant (tuned at 60 fps) into one for `dt_ms`
#[inline]
pub fn frame_scale(dt_ms: f32) -> f32 {
    dt_ms / consts::SIM_DT_MS
}
