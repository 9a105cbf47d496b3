//! Configuration management with validation and defaults
//!
//! Settings load from an optional TOML file, then `RGS_*` environment
//! variables, then command-line flags. Game configuration is static for the
//! life of the process and only echoed to clients.

use crate::errors::{ConfigError, ConfigResult};
use crate::games::ledger::OverdraftPolicy;
use crate::games::settlement::UnclosedRoundPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Minor units per whole currency unit
pub const MINOR_UNITS: u64 = 1_000_000;

/// Mode label used when a client does not send one
pub const BASE_MODE: &str = "BASE";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RgsConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub game: GameConfig,
    pub catalogue: CatalogueConfig,
}

/// HTTP listener settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Wallet and round policy settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub starting_balance: i64,
    pub currency: String,
    pub overdraft: OverdraftPolicy,
    pub unclosed_round: UnclosedRoundPolicy,
    /// Give every client session id its own wallet
    pub isolate_sessions: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_balance: 10_000 * MINOR_UNITS as i64,
            currency: "USD".to_string(),
            overdraft: OverdraftPolicy::Allow,
            unclosed_round: UnclosedRoundPolicy::Discard,
            isolate_sessions: false,
        }
    }
}

/// Bet mode entry in the cost table
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BetModeConfig {
    pub cost_multiplier: f64,
    /// Feature-buy mode rather than a regular spin
    #[serde(default)]
    pub feature: bool,
}

/// Jurisdiction flags; informational to the core
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JurisdictionConfig {
    pub social_casino: bool,
    pub disabled_fullscreen: bool,
    pub disabled_turbo: bool,
    pub disabled_super_turbo: bool,
    pub disabled_autoplay: bool,
    pub disabled_slamstop: bool,
    pub disabled_spacebar: bool,
    pub disabled_buy_feature: bool,
    pub display_net_position: bool,
    pub display_rtp: bool,
    pub display_session_timer: bool,
    pub minimum_round_duration: u64,
}

/// Bet limits, levels and modes handed to the client on authenticate
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub min_bet: u64,
    pub max_bet: u64,
    pub step_bet: u64,
    pub default_bet_level: u64,
    pub bet_levels: Vec<u64>,
    pub bet_modes: BTreeMap<String, BetModeConfig>,
    pub jurisdiction: JurisdictionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        let mut bet_modes = BTreeMap::new();
        bet_modes.insert(
            BASE_MODE.to_string(),
            BetModeConfig {
                cost_multiplier: 1.0,
                feature: false,
            },
        );
        bet_modes.insert(
            "BONUS".to_string(),
            BetModeConfig {
                cost_multiplier: 100.0,
                feature: true,
            },
        );

        Self {
            min_bet: 100_000,
            max_bet: 1_000 * MINOR_UNITS,
            step_bet: 10_000,
            default_bet_level: MINOR_UNITS,
            bet_levels: vec![
                100_000,
                200_000,
                400_000,
                600_000,
                800_000,
                1_000_000,
                2_000_000,
                4_000_000,
                10_000_000,
                20_000_000,
                50_000_000,
                100_000_000,
                1_000_000_000,
            ],
            bet_modes,
            jurisdiction: JurisdictionConfig::default(),
        }
    }
}

/// Where books come from and whether outcomes are pinned
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogueConfig {
    /// JSON books file; the embedded fixture is used when unset
    pub books_path: Option<String>,
    /// Cycle through these book ids instead of choosing at random
    pub forced_books: Vec<u64>,
}

impl RgsConfig {
    /// Configuration that refuses overdrafts and bets over an unsettled bonus
    pub fn strict() -> Self {
        Self {
            session: SessionConfig {
                overdraft: OverdraftPolicy::Reject,
                unclosed_round: UnclosedRoundPolicy::Reject,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> ConfigResult<()> {
        let game = &self.game;

        if game.step_bet == 0 {
            return Err(invalid("game.step_bet", &game.step_bet, "must be > 0"));
        }
        if game.min_bet == 0 || game.min_bet > game.max_bet {
            return Err(invalid(
                "game.min_bet",
                &game.min_bet,
                "must be > 0 and <= max_bet",
            ));
        }
        if game.bet_levels.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "game.bet_levels must not be empty".to_string(),
            ));
        }
        if let Some(level) = game
            .bet_levels
            .iter()
            .find(|l| **l < game.min_bet || **l > game.max_bet)
        {
            return Err(invalid("game.bet_levels", level, "outside [min_bet, max_bet]"));
        }
        if !game.bet_levels.contains(&game.default_bet_level) {
            return Err(invalid(
                "game.default_bet_level",
                &game.default_bet_level,
                "not one of bet_levels",
            ));
        }
        if !game.bet_modes.contains_key(BASE_MODE) {
            return Err(ConfigError::ValidationFailed(format!(
                "game.bet_modes must define {}",
                BASE_MODE
            )));
        }
        for (mode, entry) in &game.bet_modes {
            if !(entry.cost_multiplier.is_finite() && entry.cost_multiplier > 0.0) {
                return Err(invalid(
                    &format!("game.bet_modes.{}.cost_multiplier", mode),
                    &entry.cost_multiplier,
                    "must be positive",
                ));
            }
        }

        if self.session.currency.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "session.currency must not be empty".to_string(),
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(invalid(
                "server.request_timeout_secs",
                &self.server.request_timeout_secs,
                "must be > 0",
            ));
        }

        Ok(())
    }

}

fn invalid(field: &str, value: &dyn std::fmt::Display, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load from file (or defaults) and apply environment overrides.
    /// Validation is left to the caller so CLI flags can be applied first.
    pub fn load(&self) -> ConfigResult<RgsConfig> {
        let mut config = match &self.config_path {
            Some(path) => Self::load_from_file(path)?,
            None => RgsConfig::default(),
        };
        apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    fn load_from_file(path: &Path) -> ConfigResult<RgsConfig> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}

/// Apply `RGS_*` overrides using `lookup` to resolve variables
pub fn apply_overrides<F>(config: &mut RgsConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("RGS_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("RGS_PORT") {
        config.server.port = parse_var("RGS_PORT", &port)?;
    }
    if let Some(balance) = lookup("RGS_STARTING_BALANCE") {
        config.session.starting_balance = parse_var("RGS_STARTING_BALANCE", &balance)?;
    }
    if let Some(currency) = lookup("RGS_CURRENCY") {
        config.session.currency = currency;
    }
    if let Some(path) = lookup("RGS_BOOKS_PATH") {
        config.catalogue.books_path = Some(path);
    }
    if let Some(isolate) = lookup("RGS_ISOLATE_SESSIONS") {
        config.session.isolate_sessions = parse_var("RGS_ISOLATE_SESSIONS", &isolate)?;
    }
    Ok(())
}

fn parse_var<T>(key: &str, raw: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        field: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
