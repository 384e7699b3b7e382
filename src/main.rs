//! Fireworks Frenzy entry point
//!
//! On the web the library's `WebGame` is driven by the page script and this
//! binary does nothing. Natively it plays a short headless session with a
//! scripted tapper.

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use fireworks_frenzy::Game;
    use fireworks_frenzy::consts::*;
    use fireworks_frenzy::persistence::MemoryStore;
    use fireworks_frenzy::platform::now_ms;
    use fireworks_frenzy::sim::{FireworkKind, GameEvent, SessionPhase};

    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    log::info!("Fireworks Frenzy (native) headless run, seed {}", seed);

    let mut game = Game::new(
        seed,
        MemoryStore::new(),
        DEFAULT_ARENA_WIDTH,
        DEFAULT_ARENA_HEIGHT,
    );
    game.start(now_ms());

    // Two minutes of play, tapping the oldest rising non-bomb every 20 frames
    let mut popped = 0usize;
    for frame in 0..(120.0 * 60.0) as usize {
        if frame % 20 == 0 {
            let target = game
                .state()
                .fireworks
                .iter()
                .find(|fw| !fw.is_exploding() && fw.kind != FireworkKind::Bomb)
                .map(|fw| fw.pos);
            if let Some(pos) = target {
                game.pointer(pos.x, pos.y);
            }
        }

        for event in game.frame(SIM_DT_MS, now_ms()) {
            match event {
                GameEvent::FireworkPopped { .. } | GameEvent::ChainPopped { .. } => popped += 1,
                GameEvent::LifeLost { remaining } => log::info!("Life lost, {} left", remaining),
                GameEvent::PowerUpCollected { kind, .. } => log::info!("Collected {}", kind.label()),
                _ => {}
            }
        }

        if game.phase() != SessionPhase::Running {
            break;
        }
    }

    let state = game.state();
    println!(
        "phase {:?}, score {}, combo x{}, popped {}, lives {}, high score {}",
        state.phase,
        state.score,
        state.combo,
        popped,
        state.lives,
        game.high_score()
    );
}
