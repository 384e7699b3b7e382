//! Game state and session lifecycle
//!
//! Everything the simulation mutates lives in `GameState`; the saved subset
//! is `SessionSnapshot`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::{ActiveEffects, TimedEffect};
use super::entity::{
    Firework, FireworkKind, FloatingText, Particles, PowerUp, PowerUpKind, TRAIL_LENGTH,
};
use super::rng::SimRng;
use super::spawner::Spawner;
use crate::consts::*;

/// Particle budget when no settings are applied
pub const DEFAULT_PARTICLE_BUDGET: usize = 2000;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Before the first start, or after a reset
    Idle,
    /// Active gameplay
    Running,
    /// Externally triggered finale
    Celebration,
    /// Out of lives
    GameOver,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Celebration | SessionPhase::GameOver)
    }
}

/// Something observable happened (feedback, persistence, audio hooks)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum GameEvent {
    SessionStarted { resumed: bool },
    FireworkPopped { id: u32, kind: FireworkKind, points: u64, combo: u32 },
    ChainPopped { id: u32, kind: FireworkKind, points: u64 },
    BombHit { id: u32, penalty: u64 },
    BombBlocked { id: u32 },
    PowerUpCollected { id: u32, kind: PowerUpKind },
    BonusAwarded { points: u64 },
    Miss { at: Vec2 },
    Escaped { id: u32, kind: FireworkKind },
    ComboReset,
    LifeLost { remaining: u8 },
    LifeAbsorbed,
    EffectExpired(TimedEffect),
    DifficultyIncreased { interval: f32 },
    /// Periodic save point reached
    SnapshotDue,
    GameOver { score: u64, new_high_score: bool },
    Celebration { score: u64, new_high_score: bool },
}

/// Saved in-progress session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub score: u64,
    pub combo: u32,
    pub combo_timer: f32,
    pub spawn_interval: f32,
    pub difficulty_timer: f32,
    /// Wall-clock start of the session (ms since epoch)
    pub game_start_time: f64,
    pub lives: u8,
    /// Wall-clock time of the save (ms since epoch)
    pub saved_at: f64,
}

impl SessionSnapshot {
    /// Older than the resume window relative to `now_ms`
    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.saved_at > SNAPSHOT_MAX_AGE_MS
    }
}

/// Complete simulation state (deterministic given seed + inputs)
#[derive(Debug, Clone)]
pub struct GameState {
    pub rng: SimRng,
    pub phase: SessionPhase,
    /// Arena size (canvas pixels)
    pub width: f32,
    pub height: f32,

    pub score: u64,
    /// Point multiplier, 1..=20
    pub combo: u32,
    /// Time left before the combo lapses (ms)
    pub combo_timer: f32,
    pub lives: u8,
    /// Best score known before and during this session
    pub high_score: u64,

    pub spawner: Spawner,
    pub effects: ActiveEffects,

    /// Active fireworks in creation order
    pub fireworks: Vec<Firework>,
    /// Active power-ups in creation order
    pub power_ups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Particles,
    pub texts: Vec<FloatingText>,
    pub trail_length: usize,

    /// Wall-clock start of the session (ms since epoch), informational
    pub game_start_time: f64,
    /// Running time since the last snapshot point (ms)
    pub snapshot_timer: f32,

    /// Events since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Idle state for an arena of the given size
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        Self {
            rng: SimRng::new(seed),
            phase: SessionPhase::Idle,
            width,
            height,
            score: 0,
            combo: 1,
            combo_timer: 0.0,
            lives: MAX_LIVES,
            high_score: 0,
            spawner: Spawner::default(),
            effects: ActiveEffects::default(),
            fireworks: Vec::new(),
            power_ups: Vec::new(),
            particles: Particles::with_budget(DEFAULT_PARTICLE_BUDGET),
            texts: Vec::new(),
            trail_length: TRAIL_LENGTH,
            game_start_time: 0.0,
            snapshot_timer: 0.0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn clear_board(&mut self) {
        self.fireworks.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.texts.clear();
        self.effects.clear();
        self.snapshot_timer = 0.0;
    }

    /// Begin a fresh session
    pub fn start(&mut self, now_ms: f64) {
        self.clear_board();
        self.score = 0;
        self.combo = 1;
        self.combo_timer = 0.0;
        self.lives = MAX_LIVES;
        self.spawner = Spawner::default();
        self.game_start_time = now_ms;
        self.phase = SessionPhase::Running;
        self.events.push(GameEvent::SessionStarted { resumed: false });
        log::info!("Session started (high score {})", self.high_score);
    }

    /// Continue from a saved snapshot; out-of-range values are clamped
    pub fn resume(&mut self, snapshot: &SessionSnapshot) {
        self.clear_board();
        self.score = snapshot.score;
        self.combo = snapshot.combo.clamp(1, MAX_COMBO);
        self.combo_timer = snapshot.combo_timer.clamp(0.0, COMBO_WINDOW_MS);
        self.lives = snapshot.lives.clamp(1, MAX_LIVES);
        self.spawner = Spawner::resumed(snapshot.spawn_interval, snapshot.difficulty_timer);
        self.game_start_time = snapshot.game_start_time;
        self.phase = SessionPhase::Running;
        self.events.push(GameEvent::SessionStarted { resumed: true });
        log::info!(
            "Session resumed (score {}, lives {}, combo x{})",
            self.score,
            self.lives,
            self.combo
        );
    }

    /// Back to idle, keeping the known high score
    pub fn reset(&mut self) {
        self.clear_board();
        self.score = 0;
        self.combo = 1;
        self.combo_timer = 0.0;
        self.lives = MAX_LIVES;
        self.spawner = Spawner::default();
        self.phase = SessionPhase::Idle;
    }

    /// Capture the resumable part of a running session
    pub fn snapshot(&self, saved_at: f64) -> SessionSnapshot {
        SessionSnapshot {
            score: self.score,
            combo: self.combo,
            combo_timer: self.combo_timer,
            spawn_interval: self.spawner.interval,
            difficulty_timer: self.spawner.difficulty_timer,
            game_start_time: self.game_start_time,
            lives: self.lives,
            saved_at,
        }
    }

    /// Change the arena size; affects entities spawned afterwards
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn spawn_firework(&mut self) {
        let id = self.next_entity_id();
        let fw = Firework::spawn(id, &mut self.rng, self.width, self.height, self.trail_length);
        self.fireworks.push(fw);
    }

    pub fn spawn_power_up(&mut self) {
        let id = self.next_entity_id();
        let power_up = PowerUp::spawn(id, &mut self.rng, self.width, self.height);
        log::debug!("Power-up {:?} spawned", power_up.kind);
        self.power_ups.push(power_up);
    }

    /// Drop the combo back to x1
    pub fn reset_combo(&mut self) {
        self.combo_timer = 0.0;
        if self.combo > 1 {
            self.combo = 1;
            self.events.push(GameEvent::ComboReset);
        }
    }

    /// Lose one life unless the shield absorbs it.
    ///
    /// Returns true if a life was actually lost. Reaching zero lives ends the
    /// session; further calls after that are ignored.
    pub fn lose_life(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        if self.effects.shield_active() {
            self.events.push(GameEvent::LifeAbsorbed);
            return false;
        }

        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::LifeLost {
            remaining: self.lives,
        });
        if self.lives == 0 {
            self.finish(SessionPhase::GameOver);
        }
        true
    }

    /// External finale trigger. Returns false if the session already ended.
    pub fn celebrate(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.particles
            .celebration(&mut self.rng, self.width, self.height);
        self.finish(SessionPhase::Celebration);
        true
    }

    fn finish(&mut self, phase: SessionPhase) {
        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
        }
        self.phase = phase;

        let event = match phase {
            SessionPhase::Celebration => GameEvent::Celebration {
                score: self.score,
                new_high_score,
            },
            _ => GameEvent::GameOver {
                score: self.score,
                new_high_score,
            },
        };
        log::info!("Session ended: {:?}", event);
        self.events.push(event);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
