//! Wire Models
//!
//! Request and response bodies for the wallet protocol. Every request field
//! is optional and decoded on its own: a field of the wrong type is dropped
//! while the rest of the body is kept.

use crate::config::{BetModeConfig, GameConfig, JurisdictionConfig};
use crate::games::{BalanceSnapshot, IndexedEvent, Multiplier, Round};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Decode one field, treating a value of the wrong type as absent so the
/// rest of the body still applies
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthenticateRequest {
    #[serde(rename = "sessionID", deserialize_with = "lenient")]
    pub session_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayRequest {
    #[serde(rename = "sessionID", deserialize_with = "lenient")]
    pub session_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub amount: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub mode: Option<String>,
}

/// Body shared by end-round and balance requests
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionRequest {
    #[serde(rename = "sessionID", deserialize_with = "lenient")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(rename = "sessionID", deserialize_with = "lenient")]
    pub session_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub event: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplayRequest {
    #[serde(deserialize_with = "lenient")]
    pub amount: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceView {
    pub amount: i64,
    pub currency: String,
}

impl From<BalanceSnapshot> for BalanceView {
    fn from(snapshot: BalanceSnapshot) -> Self {
        Self {
            amount: snapshot.amount,
            currency: snapshot.currency,
        }
    }
}

/// Round as the client sees it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    #[serde(rename = "betID")]
    pub bet_id: u64,
    #[serde(rename = "roundID")]
    pub round_id: u64,
    #[serde(rename = "bookID")]
    pub book_id: u64,
    pub amount: u64,
    pub payout: u64,
    pub payout_multiplier: Multiplier,
    pub active: bool,
    pub state: Vec<IndexedEvent>,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl From<Round> for RoundView {
    fn from(round: Round) -> Self {
        Self {
            bet_id: round.round_id,
            round_id: round.round_id,
            book_id: round.book_id,
            amount: round.amount,
            payout: round.payout,
            payout_multiplier: round.payout_multiplier,
            active: round.active,
            state: round.state,
            mode: round.mode,
            event: round.event,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetModeView {
    pub cost_multiplier: f64,
    pub feature: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionView {
    pub social_casino: bool,
    pub disabled_fullscreen: bool,
    pub disabled_turbo: bool,
    pub disabled_super_turbo: bool,
    pub disabled_autoplay: bool,
    pub disabled_slamstop: bool,
    pub disabled_spacebar: bool,
    pub disabled_buy_feature: bool,
    pub display_net_position: bool,
    #[serde(rename = "displayRTP")]
    pub display_rtp: bool,
    pub display_session_timer: bool,
    pub minimum_round_duration: u64,
}

impl From<&JurisdictionConfig> for JurisdictionView {
    fn from(j: &JurisdictionConfig) -> Self {
        Self {
            social_casino: j.social_casino,
            disabled_fullscreen: j.disabled_fullscreen,
            disabled_turbo: j.disabled_turbo,
            disabled_super_turbo: j.disabled_super_turbo,
            disabled_autoplay: j.disabled_autoplay,
            disabled_slamstop: j.disabled_slamstop,
            disabled_spacebar: j.disabled_spacebar,
            disabled_buy_feature: j.disabled_buy_feature,
            display_net_position: j.display_net_position,
            display_rtp: j.display_rtp,
            display_session_timer: j.display_session_timer,
            minimum_round_duration: j.minimum_round_duration,
        }
    }
}

/// Static game configuration sent on authenticate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub min_bet: u64,
    pub max_bet: u64,
    pub step_bet: u64,
    pub default_bet_level: u64,
    pub bet_levels: Vec<u64>,
    pub bet_modes: BTreeMap<String, BetModeView>,
    pub jurisdiction: JurisdictionView,
}

impl From<&GameConfig> for ConfigView {
    fn from(game: &GameConfig) -> Self {
        Self {
            min_bet: game.min_bet,
            max_bet: game.max_bet,
            step_bet: game.step_bet,
            default_bet_level: game.default_bet_level,
            bet_levels: game.bet_levels.clone(),
            bet_modes: game
                .bet_modes
                .iter()
                .map(|(mode, BetModeConfig { cost_multiplier, feature })| {
                    (
                        mode.clone(),
                        BetModeView {
                            cost_multiplier: *cost_multiplier,
                            feature: *feature,
                        },
                    )
                })
                .collect(),
            jurisdiction: JurisdictionView::from(&game.jurisdiction),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthenticateResponse {
    pub balance: BalanceView,
    pub config: ConfigView,
    pub round: Option<RoundView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayResponse {
    pub balance: BalanceView,
    pub round: RoundView,
}

/// End-round and balance responses
#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub balance: BalanceView,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub event: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayResponse {
    pub round: RoundView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Generic acknowledgment for routes the emulator does not model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
}
