//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed time is injected, never read from a clock
//! - Seeded RNG only
//! - Stable iteration order (creation order)
//! - No rendering, storage or platform dependencies

pub mod effects;
pub mod entity;
pub mod resolve;
pub mod rng;
pub mod spawner;
pub mod state;
pub mod tick;

pub use effects::{ActiveEffects, TimedEffect};
pub use entity::{
    Firework, FireworkKind, Flight, FloatingText, Particle, ParticleKind, Particles, PowerUp,
    PowerUpKind, TextTone,
};
pub use resolve::{PointerOutcome, pointer_down};
pub use rng::{SimRng, weighted_choice};
pub use spawner::{SpawnTick, Spawner};
pub use state::{GameEvent, GameState, SessionPhase, SessionSnapshot};
pub use tick::{TickInput, tick};
