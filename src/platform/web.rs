//! Browser bindings
//!
//! `WebGame` is what the page script drives: it forwards animation frames
//! and pointer input to the controller and exposes the HUD values. The
//! leaderboard calls go through `fetch`.

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::game::Game;
use crate::leaderboard::{self, LeaderboardStatus};
use crate::persistence::{KeyValueStore, LocalStorage, MemoryStore, StorageError};
use crate::platform::now_ms;

/// LocalStorage when the browser allows it, otherwise an in-memory stand-in
pub enum BrowserStore {
    Local(LocalStorage),
    Memory(MemoryStore),
}

impl BrowserStore {
    pub fn open() -> Self {
        match LocalStorage::open() {
            Ok(storage) => BrowserStore::Local(storage),
            Err(e) => {
                log::warn!("{}; progress will not be saved", e);
                BrowserStore::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            BrowserStore::Local(s) => s.get(key),
            BrowserStore::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            BrowserStore::Local(s) => s.set(key, value),
            BrowserStore::Memory(s) => s.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match self {
            BrowserStore::Local(s) => s.remove(key),
            BrowserStore::Memory(s) => s.remove(key),
        }
    }
}

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
    }
    log::info!("Fireworks Frenzy starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game<BrowserStore>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        let seed = now_ms() as u64;
        WebGame {
            game: Game::new(seed, BrowserStore::open(), width, height),
        }
    }

    pub fn start(&mut self) {
        self.game.start(now_ms());
    }

    /// Whether a saved session younger than a day exists
    pub fn has_saved_session(&mut self) -> bool {
        self.game.saved_session(now_ms()).is_some()
    }

    pub fn resume(&mut self) -> bool {
        self.game.resume_saved(now_ms())
    }

    pub fn reset(&mut self) {
        self.game.reset();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.game.resize(width, height);
    }

    pub fn pointer(&mut self, x: f32, y: f32) {
        self.game.pointer(x, y);
    }

    /// Touch points as a flat `[x0, y0, x1, y1, ...]` array
    pub fn touch(&mut self, coords: &[f32]) {
        let points: Vec<(f32, f32)> = coords.chunks_exact(2).map(|c| (c[0], c[1])).collect();
        self.game.touch(&points);
    }

    /// Advance one animation frame; returns the frame's events as JSON
    pub fn frame(&mut self, dt_ms: f32) -> String {
        let events = self.game.frame(dt_ms, now_ms());
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    /// Fire the finale if the countdown target has passed. Returns true if it fired.
    pub fn check_celebration(&mut self, target_ms: f64) -> bool {
        if !super::celebration_due(now_ms(), target_ms) {
            return false;
        }
        !self.game.celebrate(now_ms()).is_empty()
    }

    pub fn countdown(&self, target_ms: f64) -> Option<String> {
        super::countdown_label(now_ms(), target_ms)
    }

    pub fn score(&self) -> f64 {
        self.game.state().score as f64
    }

    pub fn high_score(&self) -> f64 {
        self.game.high_score() as f64
    }

    pub fn combo(&self) -> u32 {
        self.game.state().combo
    }

    pub fn lives(&self) -> u8 {
        self.game.state().lives
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.game.phase())
    }

    /// Remaining effect times as JSON (`{"shield":ms,"timeFreeze":ms,"multiPop":ms}`)
    pub fn effects(&self) -> String {
        let effects = &self.game.state().effects;
        serde_json::json!({
            "shield": effects.shield,
            "timeFreeze": effects.time_freeze,
            "multiPop": effects.multi_pop,
        })
        .to_string()
    }

    /// Current settings as JSON
    pub fn settings(&self) -> String {
        serde_json::to_string(self.game.settings()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Apply and persist settings given as JSON. Returns false if they were rejected.
    pub fn set_settings(&mut self, json: &str) -> bool {
        self.game.set_settings_json(json)
    }

    pub fn player_name(&self) -> Option<String> {
        self.game.persistence().player_name()
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.game.persistence_mut().set_player_name(name);
    }

    pub fn player_id(&mut self) -> String {
        self.game.persistence_mut().player_id(now_ms())
    }
}

async fn send(url: &str, method: &str, body: Option<&str>) -> Result<(u16, String), JsValue> {
    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    if let Some(body) = body {
        opts.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    let text = JsFuture::from(response.text()?).await?;
    Ok((response.status(), text.as_string().unwrap_or_default()))
}

/// Fetch the board. Resolves to `{"available":true,"entries":[...]}` or
/// `{"available":false,"reason":"..."}`; never rejects.
#[wasm_bindgen]
pub async fn fetch_leaderboard(url: String) -> String {
    let status = match send(&url, "GET", None).await {
        Ok((status, body)) => leaderboard::read_board_response(status, &body),
        Err(e) => LeaderboardStatus::Unavailable(format!("{:?}", e)),
    };
    match status {
        LeaderboardStatus::Available(entries) => {
            serde_json::json!({ "available": true, "entries": entries }).to_string()
        }
        LeaderboardStatus::Unavailable(reason) => {
            log::warn!("Leaderboard unavailable: {}", reason);
            serde_json::json!({ "available": false, "reason": reason }).to_string()
        }
    }
}

/// Submit a score. Resolves to the receipt JSON, rejects with a message to show the player.
#[wasm_bindgen]
pub async fn submit_score(
    url: String,
    player_name: String,
    score: f64,
    player_id: Option<String>,
) -> Result<String, JsValue> {
    let body = leaderboard::submit_body(&player_name, score.max(0.0) as u64, player_id.as_deref());
    let (status, text) = send(&url, "POST", Some(&body)).await?;
    let receipt = leaderboard::read_submit_response(status, &text)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    log::info!("Score submitted: {}", receipt.message);
    serde_json::to_string(&receipt).map_err(|e| JsValue::from_str(&e.to_string()))
}
