//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (only for persistence timestamps, never inside the sim)
//! - Random identifiers
//! - Browser bindings (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Lowercase base-36 rendering of `n`
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Random lowercase base-36 token of `len` characters
pub fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

/// Whether the external celebration moment (e.g. a New Year countdown) has arrived
pub fn celebration_due(now_ms: f64, target_ms: f64) -> bool {
    now_ms >= target_ms
}

/// Time left until `target_ms` as `HH:MM:SS`, or `None` once reached
pub fn countdown_label(now_ms: f64, target_ms: f64) -> Option<String> {
    if celebration_due(now_ms, target_ms) {
        return None;
    }
    let secs = ((target_ms - now_ms) / 1000.0).floor() as u64;
    Some(format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    ))
}
