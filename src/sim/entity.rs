//! Entity models: fireworks, particles, power-ups and floating text
//!
//! Positions are canvas pixels with y growing downward, so rising entities
//! move toward smaller y. Per-frame constants are tuned at 60 fps and scaled
//! by `frame_scale(dt)`.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use crate::consts::*;
use crate::frame_scale;

/// Maximum trail positions kept per firework
pub const TRAIL_LENGTH: usize = 20;
/// Downward acceleration applied to particles per frame
pub const PARTICLE_GRAVITY: f32 = 0.1;
/// Horizontal wobble amplitude per frame
const WOBBLE_AMPLITUDE: f32 = 1.5;

/// Firework category, rolled once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireworkKind {
    Normal,
    Golden,
    Bomb,
}

impl FireworkKind {
    /// Cumulative-threshold table: Golden below 0.10, Bomb below 0.25, else Normal
    pub const WEIGHTS: [(FireworkKind, f32); 3] = [
        (FireworkKind::Golden, 0.10),
        (FireworkKind::Bomb, 0.15),
        (FireworkKind::Normal, 0.75),
    ];

    /// Points for a hit before the combo multiplier (bombs score nothing)
    pub fn base_points(self) -> u64 {
        match self {
            FireworkKind::Normal => NORMAL_POINTS,
            FireworkKind::Golden => GOLDEN_POINTS,
            FireworkKind::Bomb => 0,
        }
    }
}

/// Lifecycle of a firework
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flight {
    Rising,
    /// `popped` is true when the player hit it, false when it escaped
    Exploding { elapsed: f32, popped: bool },
}

/// A rising firework the player must tap
#[derive(Debug, Clone)]
pub struct Firework {
    pub id: u32,
    pub pos: Vec2,
    /// Ascent per frame (px)
    pub speed: f32,
    pub target_y: f32,
    pub radius: f32,
    pub hue: f32,
    pub kind: FireworkKind,
    pub flight: Flight,
    /// Past positions, oldest at the front
    pub trail: VecDeque<Vec2>,
    pub max_trail: usize,
    pub wobble: f32,
    pub wobble_speed: f32,
    pub pulse_phase: f32,
}

impl Firework {
    /// Create a firework just below the bottom edge of a `width` x `height` arena
    pub fn spawn(id: u32, rng: &mut SimRng, width: f32, height: f32, max_trail: usize) -> Self {
        let x = rng.span(50.0, (width - 100.0).max(0.0));
        let target_y = rng.span(50.0, height * 0.6);
        let speed = rng.span(4.0, 3.0);
        let radius = rng.span(25.0, 15.0);
        let hue = rng.span(0.0, 360.0);
        let kind = rng.choose(&FireworkKind::WEIGHTS);
        let wobble_speed = rng.span(0.05, 0.1);
        let pulse_phase = rng.span(0.0, TAU);

        Self {
            id,
            pos: Vec2::new(x, height + 50.0),
            speed,
            target_y,
            radius,
            hue,
            kind,
            flight: Flight::Rising,
            trail: VecDeque::with_capacity(max_trail + 1),
            max_trail,
            wobble: 0.0,
            wobble_speed,
            pulse_phase,
        }
    }

    pub fn is_exploding(&self) -> bool {
        matches!(self.flight, Flight::Exploding { .. })
    }

    /// Still in the active collection (rising, or within the post-explosion linger)
    pub fn is_alive(&self) -> bool {
        match self.flight {
            Flight::Rising => true,
            Flight::Exploding { elapsed, .. } => elapsed <= EXPLOSION_LINGER_MS,
        }
    }

    /// Advance one tick. `motion_scale` slows ascent (time-freeze).
    ///
    /// Returns true exactly when the firework reached its target altitude on
    /// this tick and escaped unpopped.
    pub fn update(&mut self, dt: f32, motion_scale: f32) -> bool {
        if let Flight::Exploding { ref mut elapsed, .. } = self.flight {
            *elapsed += dt;
            return false;
        }

        self.trail.push_back(self.pos);
        while self.trail.len() > self.max_trail {
            self.trail.pop_front();
        }

        let s = frame_scale(dt * motion_scale);
        self.wobble += self.wobble_speed * s;
        self.pos.x += self.wobble.sin() * WOBBLE_AMPLITUDE * s;
        self.pos.y -= self.speed * s;
        self.pulse_phase += 0.1 * s;

        if self.pos.y <= self.target_y {
            return self.explode(false);
        }
        false
    }

    /// Begin the explosion. Returns false if it was already exploding.
    pub fn explode(&mut self, popped: bool) -> bool {
        if self.is_exploding() {
            return false;
        }
        self.flight = Flight::Exploding {
            elapsed: 0.0,
            popped,
        };
        true
    }

    /// Forgiving radial hit-test (radius² x 2.5)
    pub fn contains(&self, point: Vec2) -> bool {
        !self.is_exploding()
            && point.distance_squared(self.pos) <= self.radius * self.radius * FIREWORK_HIT_FACTOR
    }
}

/// Particle category (rendering only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Spark,
    Golden,
    Bomb,
    Glitter,
    Smoke,
    Miss,
}

/// A cosmetic particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hue: f32,
    /// 0-1, decreases by `decay` per frame
    pub life: f32,
    pub decay: f32,
    pub kind: ParticleKind,
}

impl Particle {
    /// Integrate one tick; returns false once the particle is spent
    pub fn update(&mut self, dt: f32) -> bool {
        let s = frame_scale(dt);
        self.pos += self.vel * s;
        self.vel.y += PARTICLE_GRAVITY * s;
        self.life -= self.decay * s;
        self.life > 0.0
    }
}

/// Particle collection with a population cap
#[derive(Debug, Clone, Default)]
pub struct Particles {
    pub items: Vec<Particle>,
    pub budget: usize,
}

impl Particles {
    pub fn with_budget(budget: usize) -> Self {
        Self {
            items: Vec::new(),
            budget,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a particle unless the budget is exhausted
    pub fn push(&mut self, particle: Particle) {
        if self.items.len() < self.budget {
            self.items.push(particle);
        }
    }

    /// Advance all particles and drop the spent ones in the same tick
    pub fn update(&mut self, dt: f32) {
        self.items.retain_mut(|p| p.update(dt));
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Radial burst for an exploding firework, plus glitter
    pub fn explosion(&mut self, rng: &mut SimRng, fw: &Firework) {
        let (count, kind) = match fw.kind {
            FireworkKind::Normal => (50, ParticleKind::Spark),
            FireworkKind::Golden => (80, ParticleKind::Golden),
            FireworkKind::Bomb => (40, ParticleKind::Bomb),
        };

        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            let speed = rng.span(3.0, 5.0);
            let hue = match fw.kind {
                FireworkKind::Golden => rng.span(45.0, 20.0),
                FireworkKind::Bomb => rng.span(0.0, 20.0),
                FireworkKind::Normal => fw.hue + rng.centered(15.0),
            };
            let vx = angle.cos() * speed * rng.span(0.5, 0.5);
            let vy = angle.sin() * speed * rng.span(0.5, 0.5);
            let radius = rng.span(2.0, 3.0);
            let decay = rng.span(0.005, 0.01);
            self.push(Particle {
                pos: fw.pos,
                vel: Vec2::new(vx, vy),
                radius,
                hue,
                life: 1.0,
                decay,
                kind,
            });
        }

        if fw.kind == FireworkKind::Bomb {
            for _ in 0..15 {
                let offset = Vec2::new(rng.centered(15.0), rng.centered(15.0));
                let vel = Vec2::new(rng.centered(1.5), rng.span(-2.5, 1.5));
                let radius = rng.span(6.0, 6.0);
                let decay = rng.span(0.01, 0.01);
                self.push(Particle {
                    pos: fw.pos + offset,
                    vel,
                    radius,
                    hue: 0.0,
                    life: 1.0,
                    decay,
                    kind: ParticleKind::Smoke,
                });
            }
            return;
        }

        let glitter_hue = if fw.kind == FireworkKind::Golden { 45.0 } else { fw.hue };
        for _ in 0..20 {
            let offset = Vec2::new(rng.centered(25.0), rng.centered(25.0));
            let vel = Vec2::new(rng.centered(4.0), rng.centered(4.0));
            let radius = rng.span(1.0, 2.0);
            self.push(Particle {
                pos: fw.pos + offset,
                vel,
                radius,
                hue: glitter_hue,
                life: 1.0,
                decay: 0.02,
                kind: ParticleKind::Glitter,
            });
        }
    }

    /// Small puff where a tap hit nothing
    pub fn miss(&mut self, rng: &mut SimRng, at: Vec2) {
        for _ in 0..5 {
            let vel = Vec2::new(rng.centered(2.0), rng.centered(2.0));
            self.push(Particle {
                pos: at,
                vel,
                radius: 2.0,
                hue: 0.0,
                life: 0.5,
                decay: 0.05,
                kind: ParticleKind::Miss,
            });
        }
    }

    /// Screen-wide glitter shower
    pub fn celebration(&mut self, rng: &mut SimRng, width: f32, height: f32) {
        for _ in 0..200 {
            let pos = Vec2::new(rng.span(0.0, width), rng.span(0.0, height));
            let vel = Vec2::new(rng.centered(5.0), rng.centered(5.0));
            let radius = rng.span(2.0, 4.0);
            let hue = rng.span(0.0, 360.0);
            self.push(Particle {
                pos,
                vel,
                radius,
                hue,
                life: 1.0,
                decay: 0.005,
                kind: ParticleKind::Glitter,
            });
        }
    }
}

/// Power-up types, in weighted-roll order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    ExtraLife,
    Shield,
    TimeFreeze,
    MultiPop,
}

impl PowerUpKind {
    pub const WEIGHTS: [(PowerUpKind, f32); 4] = [
        (PowerUpKind::ExtraLife, 0.15),
        (PowerUpKind::Shield, 0.30),
        (PowerUpKind::TimeFreeze, 0.25),
        (PowerUpKind::MultiPop, 0.30),
    ];

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::ExtraLife => "EXTRA LIFE!",
            PowerUpKind::Shield => "SHIELD!",
            PowerUpKind::TimeFreeze => "TIME FREEZE!",
            PowerUpKind::MultiPop => "MULTI-POP!",
        }
    }
}

/// A collectible power-up
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    /// Ascent per frame (px)
    pub speed: f32,
    pub target_y: f32,
    pub radius: f32,
    pub kind: PowerUpKind,
    /// Time since collection (ms), `None` while uncollected
    pub collected: Option<f32>,
    pub bob_phase: f32,
}

/// Power-up hit radius (px)
pub const POWERUP_RADIUS: f32 = 22.0;

impl PowerUp {
    pub fn spawn(id: u32, rng: &mut SimRng, width: f32, height: f32) -> Self {
        let x = rng.span(60.0, (width - 120.0).max(0.0));
        let target_y = rng.span(40.0, height * 0.4);
        let speed = rng.span(2.0, 2.0);
        let kind = rng.choose(&PowerUpKind::WEIGHTS);
        let bob_phase = rng.span(0.0, TAU);
        Self {
            id,
            pos: Vec2::new(x, height + 30.0),
            speed,
            target_y,
            radius: POWERUP_RADIUS,
            kind,
            collected: None,
            bob_phase,
        }
    }

    pub fn is_collected(&self) -> bool {
        self.collected.is_some()
    }

    /// Advance one tick; returns false once the power-up should be removed
    pub fn update(&mut self, dt: f32) -> bool {
        if let Some(ref mut elapsed) = self.collected {
            *elapsed += dt;
            return *elapsed <= COLLECT_ANIM_MS;
        }
        let s = frame_scale(dt);
        self.pos.y -= self.speed * s;
        self.bob_phase += 0.08 * s;
        // Missed power-ups simply drift away
        self.pos.y > self.target_y
    }

    /// Radial hit-test (radius² x 2)
    pub fn contains(&self, point: Vec2) -> bool {
        !self.is_collected()
            && point.distance_squared(self.pos) <= self.radius * self.radius * POWERUP_HIT_FACTOR
    }
}

/// Floating text tint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextTone {
    Gold,
    Hue(f32),
    Combo,
    Penalty,
    Blocked,
    PowerUp(PowerUpKind),
}

/// Score popups and labels that drift upward and fade
#[derive(Debug, Clone)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub tone: TextTone,
    pub life: f32,
    pub scale: f32,
}

impl FloatingText {
    pub fn new(pos: Vec2, text: impl Into<String>, tone: TextTone) -> Self {
        Self {
            pos,
            text: text.into(),
            tone,
            life: 1.0,
            scale: 1.0,
        }
    }

    /// Advance one tick; returns false once faded out
    pub fn update(&mut self, dt: f32) -> bool {
        let s = frame_scale(dt);
        self.pos.y -= 2.0 * s;
        self.life -= 0.02 * s;
        self.scale += 0.02 * s;
        self.life > 0.0
    }
}
