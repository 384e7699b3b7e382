//! Game settings and preferences
//!
//! Persisted separately from the session snapshot, through the same key-value store.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, Persistence};
use crate::sim::entity::TRAIL_LENGTH;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 300,
            QualityPreset::Medium => 1000,
            QualityPreset::High => 2000,
        }
    }

    /// Trail length multiplier (1.0 = full)
    pub fn trail_quality(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.25,
            QualityPreset::Medium => 0.6,
            QualityPreset::High => 1.0,
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Explosion, glitter and miss particles
    pub particles: bool,
    /// Firework trails
    pub trails: bool,
    /// "+N" and "COMBO xN!" popups
    pub floating_text: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,

            particles: true,
            trails: true,
            floating_text: true,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low keeps the particle budget but drops trails entirely
        if preset == QualityPreset::Low {
            self.trails = false;
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Trail positions kept per firework
    pub fn trail_length(&self) -> usize {
        if !self.trails {
            return 0;
        }
        ((TRAIL_LENGTH as f32) * self.quality.trail_quality()).round() as usize
    }

    /// Storage key
    pub const STORAGE_KEY: &'static str = "fireworks_frenzy_settings";

    /// Parse settings sent by the page. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Ignoring invalid settings ({})", e);
                None
            }
        }
    }

    /// Load saved settings, falling back to defaults
    pub fn load<S: KeyValueStore>(persistence: &Persistence<S>) -> Self {
        if let Some(json) = persistence.read(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                Err(e) => log::warn!("Saved settings unreadable ({}), using defaults", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save<S: KeyValueStore>(&self, persistence: &mut Persistence<S>) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if persistence.write(Self::STORAGE_KEY, &json) {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Could not serialize settings: {}", e),
        }
    }
}
