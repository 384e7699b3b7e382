//! Integration tests: the leaderboard endpoint as a client sees it.

use fireworks_frenzy::leaderboard::{
    ApiResponse, Credentials, KvLeaderboard, LEADERBOARD_KEY, LeaderboardConfig,
    LeaderboardService, LeaderboardStatus, read_board_response, read_submit_response, submit_body,
};
use fireworks_frenzy::persistence::{KeyValueStore, MemoryStore};

const NOW: f64 = 1_735_689_600_000.0;

fn service(store: MemoryStore) -> LeaderboardService<KvLeaderboard<MemoryStore>> {
    let credentials = Credentials::from_vars(Some("ecfg_test".into()), Some("secret".into()));
    LeaderboardService::new(
        KvLeaderboard::new(store, credentials),
        LeaderboardConfig::default(),
    )
}

fn body_text(resp: &ApiResponse) -> String {
    resp.body.as_ref().map(|b| b.to_string()).unwrap_or_default()
}

#[test]
fn test_submit_then_fetch() {
    let mut svc = service(MemoryStore::new());
    let scores = [("ada", 300u64), ("bob", 1200), ("cy", 50)];
    for (i, (name, score)) in scores.iter().enumerate() {
        let resp = svc.handle("POST", &submit_body(name, *score, None), NOW + i as f64);
        let receipt = read_submit_response(resp.status, &body_text(&resp)).unwrap();
        assert!(receipt.success);
    }

    let resp = svc.handle("GET", "", NOW);
    let LeaderboardStatus::Available(board) = read_board_response(resp.status, &body_text(&resp))
    else {
        panic!("board should be available");
    };
    let names: Vec<_> = board.iter().map(|e| e.player_name.as_str()).collect();
    assert_eq!(names, ["bob", "ada", "cy"]);
    assert!(board.iter().all(|e| e.timestamp.starts_with("2025-01-01T00:00:00")));
    assert!(board[0].id.starts_with("1735689600001-"));
}

#[test]
fn test_rank_message() {
    let mut svc = service(MemoryStore::new());
    svc.handle("POST", &submit_body("ada", 900, None), NOW);
    let resp = svc.handle("POST", &submit_body("bob", 400, Some("player_x")), NOW);
    let receipt = read_submit_response(resp.status, &body_text(&resp)).unwrap();
    assert_eq!(receipt.rank, Some(2));
    assert_eq!(receipt.message, "You ranked #2!");
}

#[test]
fn test_rejections_reach_client_as_messages() {
    let mut svc = service(MemoryStore::new());
    let resp = svc.handle("POST", r#"{"playerName":"ada","score":-5}"#, NOW);
    assert_eq!(resp.status, 400);
    let err = read_submit_response(resp.status, &body_text(&resp)).unwrap_err();
    assert_eq!(err.to_string(), "Invalid score. Must be a positive number.");

    let resp = svc.handle("POST", r#"{"playerName":"<b></b>","score":5}"#, NOW);
    let err = read_submit_response(resp.status, &body_text(&resp)).unwrap_err();
    assert_eq!(err.to_string(), "Invalid player name. Must be 1-20 characters.");

    // Nothing was stored
    assert!(svc.backend().store().get(LEADERBOARD_KEY).unwrap().is_none());
}

#[test]
fn test_corrupt_board_reads_as_empty() {
    let mut store = MemoryStore::new();
    store.set(LEADERBOARD_KEY, r#"{"not":"a list"}"#).unwrap();
    let mut svc = service(store);

    let resp = svc.handle("GET", "", NOW);
    assert_eq!(
        read_board_response(resp.status, &body_text(&resp)),
        LeaderboardStatus::Available(Vec::new())
    );

    let resp = svc.handle("POST", &submit_body("ada", 10, None), NOW);
    let receipt = read_submit_response(resp.status, &body_text(&resp)).unwrap();
    assert_eq!(receipt.rank, Some(1));
    assert_eq!(receipt.leaderboard.len(), 1);
}

#[test]
fn test_unreachable_store() {
    let mut svc = service(MemoryStore::unavailable());

    // Reads degrade to an empty board
    let resp = svc.handle("GET", "", NOW);
    assert_eq!(resp.status, 200);

    // Writes surface as a server error
    let resp = svc.handle("POST", &submit_body("ada", 10, None), NOW);
    assert_eq!(resp.status, 500);
    assert!(read_submit_response(resp.status, &body_text(&resp)).is_err());
}

#[test]
fn test_cors_headers_on_every_response() {
    let mut svc = service(MemoryStore::new());
    for method in ["OPTIONS", "GET", "PUT"] {
        let resp = svc.handle(method, "", NOW);
        let headers = resp.headers();
        assert!(headers.contains(&("Access-Control-Allow-Methods", "GET, POST, OPTIONS")));
        assert!(headers.contains(&("Access-Control-Allow-Headers", "Content-Type")));
    }
}
