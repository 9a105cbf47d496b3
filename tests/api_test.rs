//! Wallet protocol tests over the full middleware stack

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use rgs_emulator::{
    api::{build_app, AppState},
    config::{GameConfig, RgsConfig, ServerConfig, SessionConfig},
    games::{Catalogue, ScriptedSelector, SessionRegistry},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(script: Vec<u64>, session: SessionConfig) -> Router {
    let catalogue = Arc::new(Catalogue::embedded().expect("bundled books"));
    let state = Arc::new(AppState {
        sessions: SessionRegistry::new(catalogue, Arc::new(ScriptedSelector::new(script)), session),
        game: GameConfig::default(),
        version: "test".to_string(),
    });
    build_app(state, &ServerConfig::default())
}

fn app(script: Vec<u64>) -> Router {
    app_with(script, SessionConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    send(app, Method::POST, uri, body).await
}

#[tokio::test]
async fn health_reports_running() {
    let app = app(vec![1]);
    let (status, body) = send(&app, Method::GET, "/health", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Running");
}

#[tokio::test]
async fn authenticate_returns_balance_and_config() {
    let app = app(vec![1]);
    let (status, body) = post(
        &app,
        "/wallet/authenticate",
        r#"{"sessionID":"abc","language":"en"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], json!({"amount": 10_000_000_000i64, "currency": "USD"}));
    assert!(body["round"].is_null());

    let config = &body["config"];
    assert_eq!(config["minBet"], 100_000);
    assert_eq!(config["defaultBetLevel"], 1_000_000);
    assert_eq!(config["betLevels"].as_array().unwrap().len(), 13);
    assert_eq!(config["betModes"]["BONUS"]["costMultiplier"], 100.0);
    assert_eq!(config["betModes"]["BONUS"]["feature"], true);
    assert_eq!(config["jurisdiction"]["displayRTP"], false);
}

#[tokio::test]
async fn simple_win_is_credited_at_play() {
    let app = app(vec![2]);
    let (status, body) = post(
        &app,
        "/wallet/play",
        r#"{"amount":1000000,"currency":"USD","mode":"BASE"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"]["amount"], 10_000_700_000i64);

    let round = &body["round"];
    assert_eq!(round["betID"], 1);
    assert_eq!(round["roundID"], 1);
    assert_eq!(round["bookID"], 2);
    assert_eq!(round["payout"], 1_700_000);
    assert_eq!(round["payoutMultiplier"], 1.7);
    assert_eq!(round["active"], false);
    assert_eq!(round["mode"], "BASE");
    assert_eq!(round["state"][0]["index"], 0);
    assert_eq!(round["state"][0]["type"], "reveal");

    let (_, closed) = post(&app, "/wallet/end-round", "{}").await;
    assert_eq!(closed["balance"]["amount"], 10_000_700_000i64);
}

#[tokio::test]
async fn bonus_win_is_credited_at_end_round() {
    let app = app(vec![4]);
    let (_, body) = post(&app, "/wallet/play", r#"{"amount":1000000}"#).await;
    assert_eq!(body["round"]["active"], true);
    assert_eq!(body["balance"]["amount"], 9_999_000_000i64);

    let (status, closed) = post(&app, "/wallet/end-round", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["balance"]["amount"], 10_031_300_000i64);

    let (_, again) = post(&app, "/wallet/end-round", "").await;
    assert_eq!(again["balance"]["amount"], 10_031_300_000i64);

    let (_, balance) = post(&app, "/wallet/balance", "").await;
    assert_eq!(balance["balance"]["amount"], 10_031_300_000i64);
}

#[tokio::test]
async fn malformed_play_body_uses_defaults() {
    let app = app(vec![1]);
    let (status, body) = post(&app, "/wallet/play", "{not json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["round"]["amount"], 1_000_000);
    assert_eq!(body["round"]["mode"], "BASE");
    assert_eq!(body["balance"]["amount"], 9_999_000_000i64);
}

#[tokio::test]
async fn unknown_route_is_acknowledged() {
    let app = app(vec![1]);
    let (status, body) = post(&app, "/wallet/something-new", "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn event_is_echoed() {
    let app = app(vec![4]);
    post(&app, "/wallet/play", "").await;

    let (status, body) = post(&app, "/bet/event", r#"{"event":"3"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"], "3");
}

#[tokio::test]
async fn replay_leaves_wallet_untouched() {
    let app = app(vec![2]);

    let (status, body) = post(&app, "/bet/replay", r#"{"amount":2000000}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["round"]["roundID"], 1);
    assert_eq!(body["round"]["payout"], 3_400_000);

    let (status, _) = send(&app, Method::GET, "/bet/replay/game/mode/42", "").await;
    assert_eq!(status, StatusCode::OK);

    let (_, balance) = post(&app, "/wallet/balance", "").await;
    assert_eq!(balance["balance"]["amount"], 10_000_000_000i64);

    let (_, play) = post(&app, "/wallet/play", "").await;
    assert_eq!(play["round"]["roundID"], 1);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = app(vec![1]);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header("x-request-id", "trace-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-123");
}

#[tokio::test]
async fn strict_policies_reject_with_codes() {
    let mut session = RgsConfig::strict().session;
    session.starting_balance = 1_500_000;
    let app = app_with(vec![4, 1], session);

    let (status, _) = post(&app, "/wallet/play", r#"{"amount":1000000}"#).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&app, "/wallet/play", r#"{"amount":1000000}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ERR_RIP");
    assert!(body["requestId"].is_string());

    let (_, closed) = post(&app, "/wallet/end-round", "").await;
    assert_eq!(closed["balance"]["amount"], 32_800_000);

    let (status, body) = post(&app, "/wallet/play", r#"{"amount":50000000}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ERR_IPB");
}

#[tokio::test]
async fn isolated_sessions_keep_separate_wallets() {
    let app = app_with(
        vec![1],
        SessionConfig {
            isolate_sessions: true,
            ..SessionConfig::default()
        },
    );

    post(&app, "/wallet/play", r#"{"sessionID":"a"}"#).await;
    let (_, a) = post(&app, "/wallet/balance", r#"{"sessionID":"a"}"#).await;
    let (_, b) = post(&app, "/wallet/balance", r#"{"sessionID":"b"}"#).await;

    assert_eq!(a["balance"]["amount"], 9_999_000_000i64);
    assert_eq!(b["balance"]["amount"], 10_000_000_000i64);
}

#[tokio::test]
async fn strict_authenticate_refuses_to_drop_unsettled_bonus() {
    let app = app_with(vec![4], RgsConfig::strict().session);

    let (_, play) = post(&app, "/wallet/play", r#"{"amount":1000000}"#).await;
    assert_eq!(play["round"]["active"], true);

    let (status, body) = post(&app, "/wallet/authenticate", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ERR_RIP");

    let (_, closed) = post(&app, "/wallet/end-round", "").await;
    assert_eq!(closed["balance"]["amount"], 10_031_300_000i64);

    let (status, auth) = post(&app, "/wallet/authenticate", "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(auth["balance"]["amount"], 10_031_300_000i64);
}

#[tokio::test]
async fn bad_amount_keeps_session_id() {
    let app = app_with(
        vec![1],
        SessionConfig {
            isolate_sessions: true,
            ..SessionConfig::default()
        },
    );

    let (status, play) = post(&app, "/wallet/play", r#"{"sessionID":"a","amount":1.5}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(play["round"]["amount"], 1_000_000);

    let (_, a) = post(&app, "/wallet/balance", r#"{"sessionID":"a"}"#).await;
    let (_, shared) = post(&app, "/wallet/balance", "").await;
    assert_eq!(a["balance"]["amount"], 9_999_000_000i64);
    assert_eq!(shared["balance"]["amount"], 10_000_000_000i64);
}
