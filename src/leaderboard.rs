//! Remote leaderboard
//!
//! The endpoint is a single `/leaderboard` resource backed by one key in a
//! key-value store. This module holds the wire types, the request handler
//! (validation, merge, rank) and the client-side reading of responses.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::persistence::KeyValueStore;
use crate::platform;

/// Key the whole board is stored under
pub const LEADERBOARD_KEY: &str = "leaderboard";

/// One ranked score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: u64,
    /// ISO-8601 UTC
    pub timestamp: String,
    pub id: String,
}

/// POST body. Fields stay loosely typed so bad input becomes a 400, not a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub player_name: Option<Value>,
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub player_id: Option<String>,
}

/// Successful POST response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub success: bool,
    pub rank: Option<usize>,
    pub message: String,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("missing leaderboard store credentials")]
    MissingCredentials,
    #[error("leaderboard store failed: {0}")]
    Store(String),
    #[error("leaderboard request failed: {0}")]
    Network(String),
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected leaderboard response: {0}")]
    Malformed(String),
}

/// Board limits
#[derive(Debug, Clone, Copy)]
pub struct LeaderboardConfig {
    pub max_entries: usize,
    /// Entries returned with a submission receipt
    pub top_n: usize,
    pub max_name_len: usize,
    pub max_score: i64,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            top_n: 10,
            max_name_len: 20,
            max_score: 10_000_000,
        }
    }
}

/// Write credentials for the backing store
#[derive(Clone, PartialEq)]
pub struct Credentials {
    store_id: String,
    api_token: String,
}

impl Credentials {
    /// Environment variable naming the store
    pub const STORE_ID_VAR: &'static str = "LEADERBOARD_STORE_ID";
    /// Environment variable holding the write token
    pub const API_TOKEN_VAR: &'static str = "LEADERBOARD_API_TOKEN";

    /// `None` unless both values are present and non-blank
    pub fn from_vars(store_id: Option<String>, api_token: Option<String>) -> Option<Self> {
        let store_id = store_id?.trim().to_string();
        let api_token = api_token?.trim().to_string();
        if store_id.is_empty() || api_token.is_empty() {
            return None;
        }
        Some(Self {
            store_id,
            api_token,
        })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_vars(
            std::env::var(Self::STORE_ID_VAR).ok(),
            std::env::var(Self::API_TOKEN_VAR).ok(),
        )
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("store_id", &self.store_id)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Where the board lives
pub trait LeaderboardBackend {
    fn load(&mut self) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
    fn save(&mut self, entries: &[LeaderboardEntry]) -> Result<(), LeaderboardError>;
}

/// Board stored as a JSON array under one key of a key-value store
#[derive(Debug)]
pub struct KvLeaderboard<S: KeyValueStore> {
    store: S,
    credentials: Option<Credentials>,
}

impl<S: KeyValueStore> KvLeaderboard<S> {
    pub fn new(store: S, credentials: Option<Credentials>) -> Self {
        match &credentials {
            Some(creds) => log::info!("Leaderboard writes go to store {}", creds.store_id),
            None => log::warn!("No leaderboard credentials; the board is read-only"),
        }
        Self { store, credentials }
    }

    /// Credentials from `LEADERBOARD_STORE_ID` and `LEADERBOARD_API_TOKEN`
    pub fn from_env(store: S) -> Self {
        Self::new(store, Credentials::from_env())
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> LeaderboardBackend for KvLeaderboard<S> {
    fn load(&mut self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let raw = self
            .store
            .get(LEADERBOARD_KEY)
            .map_err(|e| LeaderboardError::Store(e.to_string()))?;
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        // Anything but an array of entries counts as an empty board
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    fn save(&mut self, entries: &[LeaderboardEntry]) -> Result<(), LeaderboardError> {
        let Some(creds) = &self.credentials else {
            return Err(LeaderboardError::MissingCredentials);
        };
        let json =
            serde_json::to_string(entries).map_err(|e| LeaderboardError::Store(e.to_string()))?;
        self.store
            .set(LEADERBOARD_KEY, &json)
            .map_err(|e| LeaderboardError::Store(e.to_string()))?;
        log::debug!("Saved {} entries to store {}", entries.len(), creds.store_id);
        Ok(())
    }
}

/// HTTP-shaped response: status plus optional JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    /// Headers to send: CORS always, content type when there is a body
    pub fn headers(&self) -> Vec<(&'static str, &'static str)> {
        let mut headers = vec![
            ("Access-Control-Allow-Origin", "*"),
            ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
            ("Access-Control-Allow-Headers", "Content-Type"),
        ];
        if self.body.is_some() {
            headers.push(("Content-Type", "application/json"));
        }
        headers
    }
}

/// Strip tags and HTML-special characters, trim, cap length. `None` if nothing is left.
pub fn sanitize_player_name(name: &str, max_len: usize) -> Option<String> {
    let mut stripped = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(open) = rest.find('<') {
        stripped.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                stripped.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    stripped.push_str(rest);

    let cleaned: String = stripped
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&'))
        .collect();
    let capped: String = cleaned.trim().chars().take(max_len).collect();
    (!capped.is_empty()).then_some(capped)
}

/// Leading-integer parse of a JSON number or string (`"42abc"` is 42)
pub fn parse_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim_start();
            let (negative, digits) = match s.as_bytes().first() {
                Some(b'-') => (true, &s[1..]),
                Some(b'+') => (false, &s[1..]),
                _ => (false, s),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            let magnitude: i64 = digits[..end].parse().ok()?;
            Some(if negative { -magnitude } else { magnitude })
        }
        _ => None,
    }
}

/// Score within `[0, max]`
pub fn validate_score(value: &Value, max: i64) -> Option<u64> {
    parse_score(value)
        .filter(|&n| (0..=max).contains(&n))
        .map(|n| n as u64)
}

/// ISO-8601 UTC timestamp with milliseconds
pub fn format_timestamp(ms: f64) -> String {
    let total_ms = ms.max(0.0) as u64;
    let (secs, millis) = (total_ms / 1000, total_ms % 1000);
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (year, month, day) = civil_from_days(days as i64);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{millis:03}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Request handler for `/leaderboard`
pub struct LeaderboardService<B: LeaderboardBackend> {
    backend: B,
    config: LeaderboardConfig,
}

impl<B: LeaderboardBackend> LeaderboardService<B> {
    pub fn new(backend: B, config: LeaderboardConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Dispatch one request. `now_ms` stamps new entries.
    pub fn handle(&mut self, method: &str, body: &str, now_ms: f64) -> ApiResponse {
        match method {
            "OPTIONS" => ApiResponse {
                status: 204,
                body: None,
            },
            "GET" => ApiResponse::json(200, json!({ "leaderboard": self.current() })),
            "POST" => match self.submit(body, now_ms) {
                Ok(response) => response,
                Err(e) => {
                    log::error!("Leaderboard submission failed: {}", e);
                    ApiResponse::json(
                        500,
                        json!({ "error": "Internal server error", "details": e.to_string() }),
                    )
                }
            },
            _ => ApiResponse::error(405, "Method not allowed"),
        }
    }

    /// Stored board; read failures count as an empty board
    fn current(&mut self) -> Vec<LeaderboardEntry> {
        self.backend.load().unwrap_or_else(|e| {
            log::error!("Error fetching leaderboard: {}", e);
            Vec::new()
        })
    }

    fn submit(&mut self, body: &str, now_ms: f64) -> Result<ApiResponse, LeaderboardError> {
        let request: SubmitRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(_) => return Ok(ApiResponse::error(400, "Invalid JSON body.")),
        };

        let player_name = match &request.player_name {
            Some(Value::String(name)) => sanitize_player_name(name, self.config.max_name_len),
            _ => None,
        };
        let Some(player_name) = player_name else {
            log::info!("Rejected submission: bad player name");
            return Ok(ApiResponse::error(
                400,
                "Invalid player name. Must be 1-20 characters.",
            ));
        };

        let score = request
            .score
            .as_ref()
            .and_then(|v| validate_score(v, self.config.max_score));
        let Some(score) = score else {
            log::info!("Rejected submission from {}: bad score", player_name);
            return Ok(ApiResponse::error(
                400,
                "Invalid score. Must be a positive number.",
            ));
        };

        let entry = LeaderboardEntry {
            player_name,
            score,
            timestamp: format_timestamp(now_ms),
            id: format!("{}-{}", now_ms.max(0.0) as u64, platform::random_token(9)),
        };
        let id = entry.id.clone();

        let mut board = self.current();
        board.push(entry);
        board.sort_by(|a, b| b.score.cmp(&a.score));
        board.truncate(self.config.max_entries);
        self.backend.save(&board)?;

        let rank = board.iter().position(|e| e.id == id).map(|i| i + 1);
        let message = match rank {
            Some(rank) => format!("You ranked #{rank}!"),
            None => "Score submitted!".to_string(),
        };
        log::info!("Score {} submitted, rank {:?}", score, rank);

        board.truncate(self.config.top_n);
        let receipt = SubmitReceipt {
            success: true,
            rank,
            message,
            leaderboard: board,
        };
        let body =
            serde_json::to_value(&receipt).map_err(|e| LeaderboardError::Malformed(e.to_string()))?;
        Ok(ApiResponse::json(200, body))
    }
}

/// Client view of a board fetch
#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardStatus {
    Available(Vec<LeaderboardEntry>),
    /// Network or parse failure; not the same as an empty board
    Unavailable(String),
}

/// Interpret a `GET /leaderboard` response
pub fn read_board_response(status: u16, body: &str) -> LeaderboardStatus {
    #[derive(Deserialize)]
    struct Board {
        leaderboard: Vec<LeaderboardEntry>,
    }

    if status != 200 {
        return LeaderboardStatus::Unavailable(format!("server returned {status}"));
    }
    match serde_json::from_str::<Board>(body) {
        Ok(board) => LeaderboardStatus::Available(board.leaderboard),
        Err(e) => LeaderboardStatus::Unavailable(format!("unreadable leaderboard: {e}")),
    }
}

/// Interpret a `POST /leaderboard` response; rejections carry the server's message
pub fn read_submit_response(status: u16, body: &str) -> Result<SubmitReceipt, LeaderboardError> {
    if status == 200 {
        return serde_json::from_str(body).map_err(|e| LeaderboardError::Malformed(e.to_string()));
    }
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("server returned {status}"));
    if (400..500).contains(&status) {
        Err(LeaderboardError::Rejected(message))
    } else {
        Err(LeaderboardError::Network(message))
    }
}

/// JSON body for a submission
pub fn submit_body(player_name: &str, score: u64, player_id: Option<&str>) -> String {
    let mut body = json!({ "playerName": player_name, "score": score });
    if let Some(id) = player_id {
        body["playerId"] = json!(id);
    }
    body.to_string()
}
