//! Frame controller
//!
//! Owns the simulation state together with its saved data and settings.
//! Variable frame deltas are turned into fixed simulation steps; pointer
//! input is queued and consumed by the next step. Events coming out of the
//! simulation drive the persistence side effects (snapshots, high score).

use glam::Vec2;

use crate::consts::*;
use crate::persistence::{KeyValueStore, Persistence};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, SessionPhase, SessionSnapshot, TickInput, tick};

pub struct Game<S: KeyValueStore> {
    state: GameState,
    persistence: Persistence<S>,
    settings: Settings,
    accumulator: f32,
    input: TickInput,
}

impl<S: KeyValueStore> Game<S> {
    /// Idle game on an arena of the given size, with saved high score and settings applied
    pub fn new(seed: u64, store: S, width: f32, height: f32) -> Self {
        let persistence = Persistence::new(store);
        let settings = Settings::load(&persistence);
        let mut state = GameState::new(seed, width, height);
        state.high_score = persistence.high_score();

        let mut game = Self {
            state,
            persistence,
            settings,
            accumulator: 0.0,
            input: TickInput::default(),
        };
        game.apply_settings();
        game
    }

    fn apply_settings(&mut self) {
        self.state.particles.budget = self.settings.max_particles();
        self.state.trail_length = self.settings.trail_length();
        if !self.settings.floating_text {
            self.state.texts.clear();
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn high_score(&self) -> u64 {
        self.state.high_score
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist settings
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save(&mut self.persistence);
        self.apply_settings();
    }

    /// Replace settings from page-supplied JSON. Returns false, changing nothing, if it does not parse.
    pub fn set_settings_json(&mut self, json: &str) -> bool {
        match Settings::from_json(json) {
            Some(settings) => {
                self.set_settings(settings);
                true
            }
            None => false,
        }
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut Persistence<S> {
        &mut self.persistence
    }

    /// Begin a fresh session, discarding any saved one
    pub fn start(&mut self, now_ms: f64) -> Vec<GameEvent> {
        self.persistence.clear_snapshot();
        self.accumulator = 0.0;
        self.input.taps.clear();
        self.state.start(now_ms);
        self.handle_events(now_ms)
    }

    /// Saved session that could be resumed right now
    pub fn saved_session(&mut self, now_ms: f64) -> Option<SessionSnapshot> {
        self.persistence.load_snapshot(now_ms)
    }

    /// Resume the saved session if there is a fresh one. Returns false otherwise.
    pub fn resume_saved(&mut self, now_ms: f64) -> bool {
        let Some(snapshot) = self.saved_session(now_ms) else {
            return false;
        };
        self.accumulator = 0.0;
        self.input.taps.clear();
        self.state.resume(&snapshot);
        true
    }

    /// Queue a click/tap in arena coordinates
    pub fn pointer(&mut self, x: f32, y: f32) {
        if self.state.phase == SessionPhase::Running {
            self.input.taps.push(Vec2::new(x, y));
        }
    }

    /// Queue every point of a touch event, in order
    pub fn touch(&mut self, points: &[(f32, f32)]) {
        for &(x, y) in points {
            self.pointer(x, y);
        }
    }

    /// Advance by one animation frame of `dt_ms`.
    ///
    /// Returns the events produced, after their persistence side effects ran.
    pub fn frame(&mut self, dt_ms: f32, now_ms: f64) -> Vec<GameEvent> {
        // A NaN delta would poison the accumulator for good
        let dt = if dt_ms.is_finite() {
            dt_ms.clamp(0.0, MAX_FRAME_MS)
        } else {
            0.0
        };

        if self.state.phase == SessionPhase::Running {
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
                let input = std::mem::take(&mut self.input);
                tick(&mut self.state, &input, SIM_DT_MS);
                self.accumulator -= SIM_DT_MS;
                substeps += 1;

                if self.state.phase != SessionPhase::Running {
                    self.accumulator = 0.0;
                    break;
                }
            }

            // Drop backlog we could not catch up on
            if substeps == MAX_SUBSTEPS {
                self.accumulator = self.accumulator.min(SIM_DT_MS);
            }
        } else {
            // Ended sessions stay frozen; only the finale's visuals keep moving
            self.accumulator = 0.0;
            self.input.taps.clear();
            self.state.particles.update(dt);
            self.state.texts.retain_mut(|t| t.update(dt));
        }

        if !self.settings.floating_text {
            self.state.texts.clear();
        }
        self.handle_events(now_ms)
    }

    /// External finale trigger (e.g. a countdown reaching zero)
    pub fn celebrate(&mut self, now_ms: f64) -> Vec<GameEvent> {
        self.state.celebrate();
        self.handle_events(now_ms)
    }

    /// Back to idle; the saved high score stays
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.input.taps.clear();
        self.state.reset();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(width, height);
    }

    fn handle_events(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let events = self.state.drain_events();
        for event in &events {
            match *event {
                GameEvent::SnapshotDue => {
                    let snapshot = self.state.snapshot(now_ms);
                    if self.persistence.save_snapshot(&snapshot) {
                        log::debug!("Session snapshot saved (score {})", snapshot.score);
                    }
                }
                GameEvent::GameOver { score, .. } | GameEvent::Celebration { score, .. } => {
                    self.persistence.record_high_score(score);
                    self.persistence.clear_snapshot();
                }
                _ => {}
            }
        }
        events
    }
}
