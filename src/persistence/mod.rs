//! Local persistence: high score, session snapshot and player identity
//!
//! Storage is string-valued key-value (LocalStorage in the browser). Every
//! read or write tolerates an unavailable store: failures are logged and the
//! caller sees defaults, as if nothing had ever been saved.

#[cfg(target_arch = "wasm32")]
mod local_storage;
mod memory;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;
pub use memory::MemoryStore;

use thiserror::Error;

use crate::platform;
use crate::sim::SessionSnapshot;

pub const HIGH_SCORE_KEY: &str = "fireworks_frenzy_high_score";
pub const SESSION_KEY: &str = "fireworks_frenzy_session";
pub const PLAYER_NAME_KEY: &str = "fireworks_frenzy_player_name";
pub const PLAYER_ID_KEY: &str = "fireworks_frenzy_player_id";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage write rejected: {0}")]
    Rejected(String),
}

/// String key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Typed, failure-tolerant access to the game's saved data
#[derive(Debug)]
pub struct Persistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Read a key, treating errors as absence
    pub fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Could not read {}: {}", key, e);
                None
            }
        }
    }

    /// Write a key; returns false if the store refused
    pub fn write(&mut self, key: &str, value: &str) -> bool {
        match self.store.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Could not write {}: {}", key, e);
                false
            }
        }
    }

    pub fn remove(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            log::warn!("Could not remove {}: {}", key, e);
        }
    }

    /// Saved high score (0 if none or unreadable)
    pub fn high_score(&self) -> u64 {
        self.read(HIGH_SCORE_KEY)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Store `score` if it beats the saved high score. Returns true if written.
    pub fn record_high_score(&mut self, score: u64) -> bool {
        if score <= self.high_score() {
            return false;
        }
        let written = self.write(HIGH_SCORE_KEY, &score.to_string());
        if written {
            log::info!("New high score saved: {}", score);
        }
        written
    }

    pub fn save_snapshot(&mut self, snapshot: &SessionSnapshot) -> bool {
        match serde_json::to_string(snapshot) {
            Ok(json) => self.write(SESSION_KEY, &json),
            Err(e) => {
                log::warn!("Could not serialize session: {}", e);
                false
            }
        }
    }

    /// Saved session, if present, readable and younger than the resume window.
    ///
    /// Stale or corrupt snapshots are removed.
    pub fn load_snapshot(&mut self, now_ms: f64) -> Option<SessionSnapshot> {
        let json = self.read(SESSION_KEY)?;
        match serde_json::from_str::<SessionSnapshot>(&json) {
            Ok(snapshot) if !snapshot.is_expired(now_ms) => Some(snapshot),
            Ok(_) => {
                log::info!("Saved session expired, discarding");
                self.clear_snapshot();
                None
            }
            Err(e) => {
                log::warn!("Saved session unreadable ({}), discarding", e);
                self.clear_snapshot();
                None
            }
        }
    }

    pub fn clear_snapshot(&mut self) {
        self.remove(SESSION_KEY);
    }

    pub fn player_name(&self) -> Option<String> {
        self.read(PLAYER_NAME_KEY)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.write(PLAYER_NAME_KEY, name.trim());
    }

    /// Persistent player identifier, created on first use
    pub fn player_id(&mut self, now_ms: f64) -> String {
        if let Some(id) = self.read(PLAYER_ID_KEY).filter(|id| !id.is_empty()) {
            return id;
        }
        let id = format!(
            "player_{}_{}",
            platform::to_base36(now_ms.max(0.0) as u64),
            platform::random_token(9)
        );
        self.write(PLAYER_ID_KEY, &id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SNAPSHOT_MAX_AGE_MS;
    use crate::sim::GameState;

    fn snapshot(saved_at: f64) -> SessionSnapshot {
        let mut state = GameState::new(1, 800.0, 600.0);
        state.start(saved_at);
        state.score = 1234;
        state.snapshot(saved_at)
    }

    #[test]
    fn test_high_score_is_monotonic() {
        let mut p = Persistence::new(MemoryStore::new());
        assert_eq!(p.high_score(), 0);
        assert!(p.record_high_score(500));
        assert!(!p.record_high_score(300));
        assert!(!p.record_high_score(500));
        assert_eq!(p.high_score(), 500);
        assert!(p.record_high_score(501));
        assert_eq!(p.high_score(), 501);
    }

    #[test]
    fn test_garbage_high_score_reads_as_zero() {
        let mut store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, "lots").unwrap();
        let p = Persistence::new(store);
        assert_eq!(p.high_score(), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut p = Persistence::new(MemoryStore::new());
        let snap = snapshot(1_000.0);
        assert!(p.save_snapshot(&snap));
        assert_eq!(p.load_snapshot(2_000.0), Some(snap));
    }

    #[test]
    fn test_stale_snapshot_is_absent_and_cleared() {
        let mut p = Persistence::new(MemoryStore::new());
        p.save_snapshot(&snapshot(0.0));
        assert!(p.load_snapshot(SNAPSHOT_MAX_AGE_MS + 1.0).is_none());
        assert!(p.store().get(SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_snapshot_is_cleared() {
        let mut store = MemoryStore::new();
        store.set(SESSION_KEY, "{not json").unwrap();
        let mut p = Persistence::new(store);
        assert!(p.load_snapshot(0.0).is_none());
        assert!(p.store().get(SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn test_unavailable_store_degrades_silently() {
        let mut p = Persistence::new(MemoryStore::unavailable());
        assert_eq!(p.high_score(), 0);
        assert!(!p.record_high_score(10));
        assert!(!p.save_snapshot(&snapshot(0.0)));
        assert!(p.load_snapshot(0.0).is_none());
        p.clear_snapshot();
        assert!(p.player_name().is_none());
        let id = p.player_id(1.0);
        assert!(id.starts_with("player_"));
    }

    #[test]
    fn test_store_lost_mid_session() {
        let mut p = Persistence::new(MemoryStore::new());
        assert!(p.record_high_score(300));
        assert!(p.save_snapshot(&snapshot(0.0)));
        assert_eq!(p.store().len(), 2);

        p.store_mut().set_unavailable(true);
        assert_eq!(p.high_score(), 0);
        assert!(!p.record_high_score(900));
        p.clear_snapshot();

        // Nothing was lost or overwritten while storage was down
        p.store_mut().set_unavailable(false);
        assert_eq!(p.high_score(), 300);
        assert!(p.load_snapshot(1.0).is_some());
    }

    #[test]
    fn test_player_id_created_once() {
        let mut p = Persistence::new(MemoryStore::new());
        let first = p.player_id(1_700_000_000_000.0);
        let second = p.player_id(1_800_000_000_000.0);
        assert_eq!(first, second);
        assert!(first.starts_with("player_"));
    }

    #[test]
    fn test_player_name() {
        let mut p = Persistence::new(MemoryStore::new());
        assert!(p.player_name().is_none());
        p.set_player_name("  Ada  ");
        assert_eq!(p.player_name().as_deref(), Some("Ada"));
    }
}
