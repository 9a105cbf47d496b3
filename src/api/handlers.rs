//! Request Handlers
//!
//! Thin adapters between the wallet protocol and the session core. Bodies are
//! decoded leniently: an empty or malformed body is treated as the default
//! request rather than rejected.

use super::{
    errors::ApiError,
    middleware::RequestId,
    models::*,
};
use crate::{
    config::{GameConfig, BASE_MODE},
    games::SessionRegistry,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    Extension, Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared application state
pub struct AppState {
    pub sessions: SessionRegistry,
    pub game: GameConfig,
    pub version: String,
}

/// Decode a JSON body, falling back to the default request
pub fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    if body.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(error = %e, "Malformed request body, using defaults");
        T::default()
    })
}

/// Health check handler
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
    })
}

/// POST /wallet/authenticate
pub async fn authenticate_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AuthenticateResponse>, ApiError> {
    let request: AuthenticateRequest = parse_body(&body);
    let session = state.sessions.session(request.session_id.as_deref());

    let balance = session
        .authenticate()
        .map_err(|e| ApiError::from_core(request_id.0.clone(), e))?;

    info!(
        session = session.id(),
        language = request.language.as_deref().unwrap_or("en"),
        balance = balance.amount,
        "Authenticated"
    );

    Ok(Json(AuthenticateResponse {
        balance: balance.into(),
        config: ConfigView::from(&state.game),
        round: None,
    }))
}

/// POST /wallet/play
pub async fn play_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PlayResponse>, ApiError> {
    let request: PlayRequest = parse_body(&body);
    let session = state.sessions.session(request.session_id.as_deref());

    let amount = request
        .amount
        .filter(|a| *a > 0)
        .unwrap_or(state.game.default_bet_level);
    let mode = request
        .mode
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| BASE_MODE.to_string());

    let outcome = session
        .bet(amount, &mode)
        .map_err(|e| ApiError::from_core(request_id.0.clone(), e))?;

    if let Some(currency) = request.currency.as_deref() {
        if currency != outcome.balance.currency {
            debug!(
                requested = currency,
                wallet = %outcome.balance.currency,
                "Currency label differs from wallet; amounts are not converted"
            );
        }
    }

    Ok(Json(PlayResponse {
        balance: outcome.balance.into(),
        round: outcome.round.into(),
    }))
}

/// POST /wallet/end-round
pub async fn end_round_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<BalanceResponse>, ApiError> {
    let request: SessionRequest = parse_body(&body);
    let balance = state
        .sessions
        .session(request.session_id.as_deref())
        .close_round()
        .map_err(|e| ApiError::from_core(request_id.0, e))?;

    Ok(Json(BalanceResponse {
        balance: balance.into(),
    }))
}

/// POST /wallet/balance
pub async fn balance_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<BalanceResponse>, ApiError> {
    let request: SessionRequest = parse_body(&body);
    let balance = state
        .sessions
        .session(request.session_id.as_deref())
        .balance()
        .map_err(|e| ApiError::from_core(request_id.0, e))?;

    Ok(Json(BalanceResponse {
        balance: balance.into(),
    }))
}

/// POST /bet/event
pub async fn event_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<EventResponse>, ApiError> {
    let request: EventRequest = parse_body(&body);

    if let Some(event) = request.event.as_deref() {
        state
            .sessions
            .session(request.session_id.as_deref())
            .record_event(event)
            .map_err(|e| ApiError::from_core(request_id.0, e))?;
    }

    Ok(Json(EventResponse {
        event: request.event,
    }))
}

/// Replay a random book without touching the wallet
/// POST /bet/replay, GET|POST /bet/replay/*
pub async fn replay_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ReplayResponse>, ApiError> {
    let request: ReplayRequest = parse_body(&body);
    let amount = request
        .amount
        .filter(|a| *a > 0)
        .unwrap_or(state.game.default_bet_level);
    let mode = request
        .mode
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| BASE_MODE.to_string());

    let round = state
        .sessions
        .session(None)
        .replay(amount, &mode)
        .map_err(|e| ApiError::from_core(request_id.0, e))?;

    debug!(book_id = round.book_id, payout = round.payout, "Replay served");

    Ok(Json(ReplayResponse {
        round: round.into(),
    }))
}

/// Anything the emulator does not model is acknowledged, not rejected
pub async fn fallback_handler(method: Method, uri: Uri) -> Json<AckResponse> {
    debug!(%method, %uri, "Unhandled route acknowledged");
    Json(AckResponse {
        status: "ok".to_string(),
    })
}
