//! Pointer hit-testing and scoring rules
//!
//! One pointer event resolves at most one scoring path: a power-up, or a
//! single firework (plus its multi-pop chain), or a miss. Power-ups are
//! tested first, then fireworks, newest first in both cases.

use glam::Vec2;

use super::effects::TimedEffect;
use super::entity::{FireworkKind, FloatingText, PowerUpKind, TextTone};
use super::state::{GameEvent, GameState, SessionPhase};
use crate::consts::*;

/// What a pointer event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Session not running
    Ignored,
    PowerUp(PowerUpKind),
    Popped { id: u32, points: u64, chained: usize },
    Bomb { id: u32, blocked: bool },
    Miss,
}

/// Resolve a tap/click at `at`
pub fn pointer_down(state: &mut GameState, at: Vec2) -> PointerOutcome {
    if state.phase != SessionPhase::Running {
        return PointerOutcome::Ignored;
    }

    if let Some(i) = state.power_ups.iter().rposition(|p| p.contains(at)) {
        let power_up = &mut state.power_ups[i];
        power_up.collected = Some(0.0);
        let (id, kind, pos) = (power_up.id, power_up.kind, power_up.pos);
        collect_power_up(state, id, kind, pos);
        return PointerOutcome::PowerUp(kind);
    }

    let Some(i) = state.fireworks.iter().rposition(|fw| fw.contains(at)) else {
        state.particles.miss(&mut state.rng, at);
        state.events.push(GameEvent::Miss { at });
        return PointerOutcome::Miss;
    };

    // Chains score off the multiplier as it stood before this hit
    let combo_before = state.combo;
    let (id, kind, pos, hue) = {
        let fw = &mut state.fireworks[i];
        fw.explode(true);
        (fw.id, fw.kind, fw.pos, fw.hue)
    };
    state.particles.explosion(&mut state.rng, &state.fireworks[i]);

    match kind {
        FireworkKind::Bomb => {
            let blocked = hit_bomb(state, id, pos);
            PointerOutcome::Bomb { id, blocked }
        }
        FireworkKind::Normal | FireworkKind::Golden => {
            let points = kind.base_points() * combo_before as u64;
            state.score += points;

            let tone = match kind {
                FireworkKind::Golden => TextTone::Gold,
                _ => TextTone::Hue(hue),
            };
            state.texts.push(FloatingText::new(pos, format!("+{points}"), tone));
            if combo_before > 1 {
                state.texts.push(FloatingText::new(
                    pos - Vec2::new(0.0, 30.0),
                    format!("COMBO x{combo_before}!"),
                    TextTone::Combo,
                ));
            }

            state.combo = (combo_before + 1).min(MAX_COMBO);
            state.combo_timer = COMBO_WINDOW_MS;
            state.events.push(GameEvent::FireworkPopped {
                id,
                kind,
                points,
                combo: combo_before,
            });

            let chained = if state.effects.multi_pop_active() {
                chain_pop(state, at, combo_before)
            } else {
                0
            };
            PointerOutcome::Popped {
                id,
                points,
                chained,
            }
        }
    }
}

/// Apply a bomb hit; returns true if the shield blocked it
fn hit_bomb(state: &mut GameState, id: u32, pos: Vec2) -> bool {
    if state.effects.shield_active() {
        state
            .texts
            .push(FloatingText::new(pos, "BLOCKED!", TextTone::Blocked));
        state.events.push(GameEvent::BombBlocked { id });
        return true;
    }

    let penalty = BOMB_PENALTY * state.combo as u64;
    state.score = state.score.saturating_sub(penalty);
    state
        .texts
        .push(FloatingText::new(pos, format!("-{penalty}"), TextTone::Penalty));
    state.events.push(GameEvent::BombHit { id, penalty });
    state.reset_combo();
    state.lose_life();
    false
}

/// Detonate eligible fireworks near `center`. Chains never cascade.
fn chain_pop(state: &mut GameState, center: Vec2, combo_before: u32) -> usize {
    let multiplier = (combo_before / 2).max(1) as u64;
    let reach_sq = CHAIN_RADIUS * CHAIN_RADIUS;

    let targets: Vec<usize> = state
        .fireworks
        .iter()
        .enumerate()
        .filter(|(_, fw)| {
            !fw.is_exploding()
                && fw.kind != FireworkKind::Bomb
                && fw.pos.distance_squared(center) <= reach_sq
        })
        .map(|(i, _)| i)
        .collect();

    for &i in &targets {
        let (id, kind, pos) = {
            let fw = &mut state.fireworks[i];
            fw.explode(true);
            (fw.id, fw.kind, fw.pos)
        };
        let points = kind.base_points() * multiplier;
        state.score += points;
        state.particles.explosion(&mut state.rng, &state.fireworks[i]);
        state
            .texts
            .push(FloatingText::new(pos, format!("+{points}"), TextTone::Combo));
        state.events.push(GameEvent::ChainPopped { id, kind, points });
    }

    if !targets.is_empty() {
        log::debug!("Multi-pop chained {} fireworks", targets.len());
    }
    targets.len()
}

fn collect_power_up(state: &mut GameState, id: u32, kind: PowerUpKind, pos: Vec2) {
    state
        .texts
        .push(FloatingText::new(pos, kind.label(), TextTone::PowerUp(kind)));
    state.events.push(GameEvent::PowerUpCollected { id, kind });

    match kind {
        PowerUpKind::ExtraLife => {
            if state.lives < MAX_LIVES {
                state.lives += 1;
            } else {
                state.score += EXTRA_LIFE_BONUS;
                state.texts.push(FloatingText::new(
                    pos - Vec2::new(0.0, 30.0),
                    format!("+{EXTRA_LIFE_BONUS}"),
                    TextTone::Gold,
                ));
                state.events.push(GameEvent::BonusAwarded {
                    points: EXTRA_LIFE_BONUS,
                });
            }
        }
        PowerUpKind::Shield => state.effects.activate(TimedEffect::Shield),
        PowerUpKind::TimeFreeze => state.effects.activate(TimedEffect::TimeFreeze),
        PowerUpKind::MultiPop => state.effects.activate(TimedEffect::MultiPop),
    }
}
