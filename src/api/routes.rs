//! Route Definitions
//!
//! Maps wallet protocol URLs to handlers.

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Wallet
        .route("/wallet/authenticate", post(authenticate_handler))
        .route("/wallet/play", post(play_handler))
        .route("/wallet/end-round", post(end_round_handler))
        .route("/wallet/balance", post(balance_handler))
        // Bet progress and replay viewer
        .route("/bet/event", post(event_handler))
        .route("/bet/replay", post(replay_handler))
        .route("/bet/replay/*rest", get(replay_handler).post(replay_handler))
        .fallback(fallback_handler)
        .with_state(state)
}
