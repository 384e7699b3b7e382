//! Spawn scheduling and difficulty ramp
//!
//! The spawner only decides *when* to emit; `GameState` builds the entities.

use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use crate::consts::*;

/// What the spawner wants created this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnTick {
    pub fireworks: usize,
    /// The spawn interval tightened this tick
    pub ramped: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    /// Time since the last regular spawn (ms)
    pub accumulator: f32,
    /// Current gap between regular spawns (ms)
    pub interval: f32,
    /// Time since the last difficulty step (ms)
    pub difficulty_timer: f32,
    /// Session time covered so far (ms)
    elapsed: f32,
    /// Opening fireworks still to launch, by session time
    salvo: Vec<f32>,
}

impl Default for Spawner {
    fn default() -> Self {
        Self {
            accumulator: 0.0,
            interval: INITIAL_SPAWN_INTERVAL_MS,
            difficulty_timer: 0.0,
            elapsed: 0.0,
            salvo: OPENING_SALVO_MS.to_vec(),
        }
    }
}

impl Spawner {
    /// Resume with a saved pace (opening salvo still plays)
    pub fn resumed(interval: f32, difficulty_timer: f32) -> Self {
        Self {
            interval: interval.max(MIN_SPAWN_INTERVAL_MS),
            difficulty_timer: difficulty_timer.max(0.0),
            ..Self::default()
        }
    }

    /// Interval actually in force (stretched while time-freeze runs)
    pub fn effective_interval(&self, time_freeze: bool) -> f32 {
        if time_freeze {
            self.interval * FREEZE_SPAWN_SCALE
        } else {
            self.interval
        }
    }

    pub fn update(&mut self, dt: f32, time_freeze: bool) -> SpawnTick {
        let mut out = SpawnTick::default();

        self.elapsed += dt;
        let elapsed = self.elapsed;
        let before = self.salvo.len();
        self.salvo.retain(|&at| at > elapsed);
        out.fireworks += before - self.salvo.len();

        self.accumulator += dt;
        if self.accumulator >= self.effective_interval(time_freeze) {
            out.fireworks += 1;
            self.accumulator = 0.0;
        }

        self.difficulty_timer += dt;
        if self.difficulty_timer >= DIFFICULTY_PERIOD_MS {
            self.interval = (self.interval - SPAWN_INTERVAL_STEP_MS).max(MIN_SPAWN_INTERVAL_MS);
            self.difficulty_timer = 0.0;
            out.ramped = true;
        }

        out
    }

    /// Roll for a power-up to accompany a firework
    pub fn roll_powerup(rng: &mut SimRng) -> bool {
        rng.chance(POWERUP_CHANCE)
    }
}
