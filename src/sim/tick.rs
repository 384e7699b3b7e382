//! Simulation tick
//!
//! Advances the session by an injected elapsed time. Order within a tick:
//! combo timer, spawner, entities (escapes), effect timers, queued pointer
//! input, snapshot cadence.

use glam::Vec2;

use super::entity::FireworkKind;
use super::resolve::{PointerOutcome, pointer_down};
use super::spawner::Spawner;
use super::state::{GameEvent, GameState, SessionPhase};
use crate::consts::*;

/// Input gathered since the previous tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer/touch presses in arrival order
    pub taps: Vec<Vec2>,
}

impl TickInput {
    pub fn tap(at: Vec2) -> Self {
        Self { taps: vec![at] }
    }
}

/// Advance the game state by `dt` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<PointerOutcome> {
    if state.phase != SessionPhase::Running {
        return Vec::new();
    }

    if state.combo_timer > 0.0 {
        state.combo_timer -= dt;
        if state.combo_timer <= 0.0 {
            state.reset_combo();
        }
    }

    let time_freeze = state.effects.time_freeze_active();
    let plan = state.spawner.update(dt, time_freeze);
    for _ in 0..plan.fireworks {
        state.spawn_firework();
        if Spawner::roll_powerup(&mut state.rng) {
            state.spawn_power_up();
        }
    }
    if plan.ramped {
        log::debug!("Spawn interval now {}ms", state.spawner.interval);
        state.events.push(GameEvent::DifficultyIncreased {
            interval: state.spawner.interval,
        });
    }

    update_entities(state, dt, time_freeze);

    for expired in state.effects.tick(dt) {
        state.events.push(GameEvent::EffectExpired(expired));
    }

    let outcomes = input
        .taps
        .iter()
        .map(|&at| pointer_down(state, at))
        .collect();

    if state.phase == SessionPhase::Running {
        state.snapshot_timer += dt;
        if state.snapshot_timer >= SNAPSHOT_PERIOD_MS {
            state.snapshot_timer = 0.0;
            state.events.push(GameEvent::SnapshotDue);
        }
    }

    outcomes
}

fn update_entities(state: &mut GameState, dt: f32, time_freeze: bool) {
    let motion_scale = if time_freeze { FREEZE_MOTION_SCALE } else { 1.0 };

    let mut escaped = Vec::new();
    for fw in state.fireworks.iter_mut() {
        if fw.update(dt, motion_scale) {
            state.particles.explosion(&mut state.rng, fw);
            escaped.push((fw.id, fw.kind));
        }
    }
    state.fireworks.retain(|fw| fw.is_alive());

    for (id, kind) in escaped {
        state.events.push(GameEvent::Escaped { id, kind });
        // Bombs are meant to be left alone
        if kind != FireworkKind::Bomb {
            state.reset_combo();
            state.lose_life();
        }
    }

    state.power_ups.retain_mut(|p| p.update(dt));
    state.particles.update(dt);
    state.texts.retain_mut(|t| t.update(dt));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::TimedEffect;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(seed, 800.0, 600.0);
        state.start(0.0);
        state.drain_events();
        state
    }

    /// Tall arena: nothing escapes for several seconds
    fn running_tall(seed: u64) -> GameState {
        let mut state = running(seed);
        state.resize(800.0, 10_000.0);
        state
    }

    fn idle_input() -> TickInput {
        TickInput::default()
    }

    /// A firework one step away from escaping
    fn about_to_escape(state: &mut GameState, kind: FireworkKind) {
        state.spawn_firework();
        let fw = state.fireworks.last_mut().unwrap();
        fw.kind = kind;
        fw.pos.y = fw.target_y + 0.5;
    }

    #[test]
    fn test_idle_state_does_not_tick() {
        let mut state = GameState::new(1, 800.0, 600.0);
        tick(&mut state, &idle_input(), SIM_DT_MS);
        assert!(state.fireworks.is_empty());
        assert_eq!(state.spawner.accumulator, 0.0);
    }

    #[test]
    fn test_opening_salvo_spawns() {
        let mut state = running_tall(5);
        for _ in 0..70 {
            tick(&mut state, &idle_input(), SIM_DT_MS);
        }
        // Three opening fireworks within the first 1.1s, no regular spawn yet
        assert_eq!(state.fireworks.len(), 3);
    }

    #[test]
    fn test_escaped_normal_costs_life_and_combo() {
        let mut state = running(5);
        state.combo = 6;
        about_to_escape(&mut state, FireworkKind::Normal);

        tick(&mut state, &idle_input(), SIM_DT_MS);
        assert_eq!(state.lives, MAX_LIVES - 1);
        assert_eq!(state.combo, 1);
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Escaped { kind: FireworkKind::Normal, .. })));
        assert!(events.contains(&GameEvent::LifeLost { remaining: MAX_LIVES - 1 }));
    }

    #[test]
    fn test_escaped_bomb_is_free() {
        let mut state = running(5);
        state.score = 70;
        state.combo = 3;
        state.fireworks.clear();
        about_to_escape(&mut state, FireworkKind::Bomb);
        tick(&mut state, &idle_input(), SIM_DT_MS);
        assert_eq!(state.lives, MAX_LIVES);
        assert_eq!(state.score, 70);
        assert_eq!(state.combo, 3);
    }

    #[test]
    fn test_escape_under_shield() {
        let mut state = running(5);
        state.effects.activate(TimedEffect::Shield);
        state.combo = 4;
        about_to_escape(&mut state, FireworkKind::Golden);
        tick(&mut state, &idle_input(), SIM_DT_MS);
        assert_eq!(state.lives, MAX_LIVES);
        assert_eq!(state.combo, 1);
        assert!(state.drain_events().contains(&GameEvent::LifeAbsorbed));
    }

    #[test]
    fn test_combo_timer_expiry() {
        let mut state = running(5);
        state.combo = 5;
        state.combo_timer = 100.0;
        tick(&mut state, &idle_input(), 60.0);
        assert_eq!(state.combo, 5);
        tick(&mut state, &idle_input(), 60.0);
        assert_eq!(state.combo, 1);
        assert!(state.drain_events().contains(&GameEvent::ComboReset));
    }

    #[test]
    fn test_effect_expiry_event() {
        let mut state = running_tall(5);
        state.effects.activate(TimedEffect::MultiPop);
        for _ in 0..361 {
            tick(&mut state, &idle_input(), SIM_DT_MS);
        }
        assert!(!state.effects.multi_pop_active());
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::EffectExpired(TimedEffect::MultiPop))
        );
    }

    #[test]
    fn test_snapshot_cadence() {
        let mut state = running(5);
        let mut due = 0;
        for _ in 0..11 {
            state.effects.activate(TimedEffect::Shield);
            tick(&mut state, &idle_input(), 1000.0);
            due += state
                .drain_events()
                .iter()
                .filter(|e| **e == GameEvent::SnapshotDue)
                .count();
        }
        assert_eq!(due, 2);
    }

    #[test]
    fn test_three_escapes_end_the_game_once() {
        let mut state = running(5);
        for _ in 0..4 {
            about_to_escape(&mut state, FireworkKind::Normal);
        }
        tick(&mut state, &idle_input(), SIM_DT_MS);
        assert_eq!(state.phase, SessionPhase::GameOver);
        assert_eq!(state.lives, 0);
        let overs = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);

        // Frozen afterwards
        let count = state.fireworks.len();
        tick(&mut state, &idle_input(), 5000.0);
        assert_eq!(state.fireworks.len(), count);
    }

    #[test]
    fn test_taps_resolve_in_tick() {
        let mut state = running(5);
        // Let the first opening firework launch, then clear the board
        tick(&mut state, &idle_input(), 1.0);
        state.fireworks.clear();
        state.power_ups.clear();

        state.spawn_firework();
        let fw = state.fireworks.last_mut().unwrap();
        fw.kind = FireworkKind::Normal;
        fw.target_y = -1000.0;
        let at = fw.pos;
        let outcomes = tick(&mut state, &TickInput::tap(at), 0.0);
        assert!(matches!(outcomes[0], PointerOutcome::Popped { .. }));
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_determinism() {
        let script: Vec<(f32, Option<Vec2>)> = (0..2000)
            .map(|i| {
                let tap = (i % 7 == 0).then(|| Vec2::new((i * 37 % 800) as f32, (i * 53 % 600) as f32));
                (SIM_DT_MS + (i % 3) as f32, tap)
            })
            .collect();

        let run = || {
            let mut state = running(99_999);
            for (dt, tap) in &script {
                let input = TickInput {
                    taps: tap.iter().copied().collect(),
                };
                tick(&mut state, &input, *dt);
            }
            state
        };

        let a = run();
        let b = run();
        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.combo, b.combo);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.fireworks.len(), b.fireworks.len());
        assert_eq!(a.particles.len(), b.particles.len());
        for (x, y) in a.fireworks.iter().zip(&b.fireworks) {
            assert_eq!(x.pos.to_array().map(f32::to_bits), y.pos.to_array().map(f32::to_bits));
        }
    }
}
