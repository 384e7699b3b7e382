//! Integration tests: whole sessions driven by (dt, taps) sequences.

use fireworks_frenzy::consts::*;
use fireworks_frenzy::sim::{
    FireworkKind, Flight, GameEvent, GameState, PointerOutcome, SessionPhase, TickInput,
    TimedEffect, pointer_down, tick,
};
use glam::Vec2;
use proptest::prelude::*;

/// How a scripted tap picks its position
#[derive(Debug, Clone)]
enum Aim {
    /// Arena coordinates
    At(f32, f32),
    /// The n-th live firework (mod count), or a miss if none
    Firework(usize),
    /// The n-th live power-up (mod count), or a miss if none
    PowerUp(usize),
}

fn resolve_aim(state: &GameState, aim: &Aim) -> Vec2 {
    match *aim {
        Aim::At(x, y) => Vec2::new(x, y),
        Aim::Firework(n) => {
            let live: Vec<_> = state.fireworks.iter().filter(|f| !f.is_exploding()).collect();
            if live.is_empty() {
                Vec2::new(-500.0, -500.0)
            } else {
                live[n % live.len()].pos
            }
        }
        Aim::PowerUp(n) => {
            let live: Vec<_> = state.power_ups.iter().filter(|p| !p.is_collected()).collect();
            if live.is_empty() {
                Vec2::new(-500.0, -500.0)
            } else {
                live[n % live.len()].pos
            }
        }
    }
}

fn fresh(seed: u64) -> GameState {
    let mut state = GameState::new(seed, 800.0, 600.0);
    state.start(0.0);
    state
}

/// Play a scripted session; returns the final state and every event
fn play(seed: u64, script: &[(f32, Vec<Aim>)]) -> (GameState, Vec<GameEvent>) {
    let mut state = fresh(seed);
    let mut events = state.drain_events();
    for (dt, aims) in script {
        let taps = aims.iter().map(|a| resolve_aim(&state, a)).collect();
        tick(&mut state, &TickInput { taps }, *dt);
        events.extend(state.drain_events());
    }
    (state, events)
}

fn scripted(frames: usize) -> Vec<(f32, Vec<Aim>)> {
    (0..frames)
        .map(|i| {
            let aims = match i % 15 {
                0 => vec![Aim::Firework(i)],
                5 => vec![Aim::PowerUp(i)],
                10 => vec![Aim::At(400.0, 300.0)],
                _ => Vec::new(),
            };
            (SIM_DT_MS, aims)
        })
        .collect()
}

#[test]
fn test_replay_is_deterministic() {
    let script = scripted(3000);
    let (a, events_a) = play(0xDEADBEEF, &script);
    let (b, events_b) = play(0xDEADBEEF, &script);

    assert_eq!(a.score, b.score);
    assert_eq!(a.lives, b.lives);
    assert_eq!(a.phase, b.phase);
    assert_eq!(events_a, events_b);
    let pos_a: Vec<_> = a.fireworks.iter().map(|f| f.pos).collect();
    let pos_b: Vec<_> = b.fireworks.iter().map(|f| f.pos).collect();
    assert_eq!(pos_a, pos_b);
}

#[test]
fn test_different_seeds_diverge() {
    let script = scripted(600);
    let (a, _) = play(1, &script);
    let (b, _) = play(2, &script);
    let pos_a: Vec<_> = a.fireworks.iter().map(|f| f.pos).collect();
    let pos_b: Vec<_> = b.fireworks.iter().map(|f| f.pos).collect();
    assert_ne!(pos_a, pos_b);
}

#[test]
fn test_idle_player_loses_the_session() {
    // Nobody taps: normal/golden escapes drain lives until game over
    let script: Vec<_> = (0..60 * 120).map(|_| (SIM_DT_MS, Vec::new())).collect();
    let (state, events) = play(7, &script);

    assert_eq!(state.phase, SessionPhase::GameOver);
    assert_eq!(state.lives, 0);
    assert_eq!(state.score, 0);
    let game_overs = events
        .iter()
        .filter(|e| matches!(e, GameEvent::GameOver { .. }))
        .count();
    assert_eq!(game_overs, 1);
    let lost = events
        .iter()
        .filter(|e| matches!(e, GameEvent::LifeLost { .. }))
        .count();
    assert_eq!(lost, MAX_LIVES as usize);
}

#[test]
fn test_difficulty_ramps_to_floor() {
    let mut state = fresh(3);
    state.resize(800.0, 1_000_000.0);
    let mut intervals = Vec::new();
    for _ in 0..(15.0 * DIFFICULTY_PERIOD_MS / SIM_DT_MS) as usize {
        state.effects.activate(TimedEffect::Shield);
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        for event in state.drain_events() {
            if let GameEvent::DifficultyIncreased { interval } = event {
                intervals.push(interval);
            }
        }
    }
    assert_eq!(intervals.first().copied(), Some(1400.0));
    assert_eq!(intervals.last().copied(), Some(MIN_SPAWN_INTERVAL_MS));
    assert!(intervals.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn test_golden_hit_at_max_combo() {
    let mut state = fresh(5);
    state.fireworks.clear();
    state.power_ups.clear();
    state.spawn_firework();
    state.fireworks[0].kind = FireworkKind::Golden;
    state.combo = MAX_COMBO;
    let at = state.fireworks[0].pos;

    let outcome = pointer_down(&mut state, at);
    assert!(matches!(outcome, PointerOutcome::Popped { points: 2000, .. }));
    assert_eq!(state.score, 2000);
    assert_eq!(state.combo, MAX_COMBO);
}

fn aim_strategy() -> impl Strategy<Value = Aim> {
    prop_oneof![
        (0.0f32..800.0, 0.0f32..700.0).prop_map(|(x, y)| Aim::At(x, y)),
        (0usize..8).prop_map(Aim::Firework),
        (0usize..4).prop_map(Aim::PowerUp),
    ]
}

fn step_strategy() -> impl Strategy<Value = (f32, Vec<Aim>)> {
    (0.0f32..120.0, prop::collection::vec(aim_strategy(), 0..3))
}

fn is_primary(event: &GameEvent) -> bool {
    matches!(
        event,
        GameEvent::FireworkPopped { .. }
            | GameEvent::BombHit { .. }
            | GameEvent::BombBlocked { .. }
            | GameEvent::PowerUpCollected { .. }
            | GameEvent::Miss { .. }
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_session_invariants(seed in any::<u64>(), script in prop::collection::vec(step_strategy(), 1..400)) {
        let mut state = fresh(seed);
        state.drain_events();
        let mut game_overs = 0;

        for (dt, aims) in &script {
            let was_running = state.phase == SessionPhase::Running;
            let taps = aims.iter().map(|a| resolve_aim(&state, a)).collect();
            let outcomes = tick(&mut state, &TickInput { taps }, *dt);
            let events = state.drain_events();

            prop_assert!((1..=MAX_COMBO).contains(&state.combo));
            prop_assert!(state.lives <= MAX_LIVES);
            prop_assert!(state.spawner.interval >= MIN_SPAWN_INTERVAL_MS);
            match state.phase {
                SessionPhase::Running => prop_assert!(state.lives >= 1),
                SessionPhase::GameOver => prop_assert_eq!(state.lives, 0),
                _ => {}
            }
            if !was_running {
                prop_assert!(events.is_empty());
            }

            // Exactly one scoring path per resolved tap
            let resolved = outcomes.iter().filter(|o| **o != PointerOutcome::Ignored).count();
            let primary = events.iter().filter(|e| is_primary(e)).count();
            prop_assert_eq!(resolved, primary);

            // Nothing left rising above its burst altitude
            for fw in &state.fireworks {
                if fw.flight == Flight::Rising {
                    prop_assert!(fw.pos.y > fw.target_y);
                }
            }

            game_overs += events.iter().filter(|e| matches!(e, GameEvent::GameOver { .. })).count();
        }
        prop_assert!(game_overs <= 1);
    }

    #[test]
    fn prop_replay_matches(seed in any::<u64>(), script in prop::collection::vec(step_strategy(), 1..200)) {
        let (a, events_a) = play(seed, &script);
        let (b, events_b) = play(seed, &script);
        prop_assert_eq!(a.score, b.score);
        prop_assert_eq!(a.lives, b.lives);
        prop_assert_eq!(events_a, events_b);
    }
}
