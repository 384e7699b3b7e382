//! Timed power-up effects
//!
//! Each effect is a countdown; it is active exactly while its timer is
//! positive. Re-applying an active effect restarts it at full duration.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Effects with a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimedEffect {
    Shield,
    TimeFreeze,
    MultiPop,
}

impl TimedEffect {
    pub const ALL: [TimedEffect; 3] = [TimedEffect::Shield, TimedEffect::TimeFreeze, TimedEffect::MultiPop];

    /// Full duration (ms)
    pub fn duration(self) -> f32 {
        match self {
            TimedEffect::Shield => SHIELD_MS,
            TimedEffect::TimeFreeze => TIME_FREEZE_MS,
            TimedEffect::MultiPop => MULTI_POP_MS,
        }
    }
}

/// Remaining time (ms) on each effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub shield: f32,
    pub time_freeze: f32,
    pub multi_pop: f32,
}

impl ActiveEffects {
    fn slot(&mut self, effect: TimedEffect) -> &mut f32 {
        match effect {
            TimedEffect::Shield => &mut self.shield,
            TimedEffect::TimeFreeze => &mut self.time_freeze,
            TimedEffect::MultiPop => &mut self.multi_pop,
        }
    }

    pub fn remaining(&self, effect: TimedEffect) -> f32 {
        match effect {
            TimedEffect::Shield => self.shield,
            TimedEffect::TimeFreeze => self.time_freeze,
            TimedEffect::MultiPop => self.multi_pop,
        }
    }

    pub fn is_active(&self, effect: TimedEffect) -> bool {
        self.remaining(effect) > 0.0
    }

    pub fn shield_active(&self) -> bool {
        self.is_active(TimedEffect::Shield)
    }

    pub fn time_freeze_active(&self) -> bool {
        self.is_active(TimedEffect::TimeFreeze)
    }

    pub fn multi_pop_active(&self) -> bool {
        self.is_active(TimedEffect::MultiPop)
    }

    /// Start (or restart) an effect at its full duration
    pub fn activate(&mut self, effect: TimedEffect) {
        *self.slot(effect) = effect.duration();
    }

    /// Count all timers down by `dt`, stopping at exactly zero.
    ///
    /// Returns the effects that ran out during this call.
    pub fn tick(&mut self, dt: f32) -> Vec<TimedEffect> {
        let mut expired = Vec::new();
        for effect in TimedEffect::ALL {
            let slot = self.slot(effect);
            if *slot > 0.0 {
                *slot = (*slot - dt).max(0.0);
                if *slot == 0.0 {
                    expired.push(effect);
                }
            }
        }
        expired
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
