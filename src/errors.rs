//! Error types for the RGS emulator
//!
//! Domain errors raised by the settlement core and configuration errors that
//! are fatal at startup.

use thiserror::Error;

/// Errors raised by the ledger, the round controller and session handling
#[derive(Debug, Error)]
pub enum RgsError {
    /// Debit refused under the strict overdraft policy
    #[error("Insufficient balance: balance {balance}, requested {requested}")]
    InsufficientBalance { balance: i64, requested: u64 },

    /// Balance arithmetic left the representable range
    #[error("Balance overflow applying {amount}")]
    BalanceOverflow { amount: u64 },

    /// New bet refused because an active round is still open
    #[error("Round {round_id} is still active")]
    RoundInProgress { round_id: u64 },

    /// Payout computation overflowed the minor-unit range
    #[error("Payout overflow for bet {bet}")]
    PayoutOverflow { bet: u64 },

    /// Session lock was poisoned by a panicking holder
    #[error("Session state poisoned")]
    StatePoisoned,
}

impl RgsError {
    /// Short protocol error code reported to clients
    pub fn code(&self) -> &'static str {
        match self {
            RgsError::InsufficientBalance { .. } => "ERR_IPB",
            RgsError::RoundInProgress { .. } => "ERR_RIP",
            RgsError::BalanceOverflow { .. }
            | RgsError::PayoutOverflow { .. }
            | RgsError::StatePoisoned => "ERR_GEN",
        }
    }

    /// Whether the error is a policy rejection rather than a server fault
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RgsError::InsufficientBalance { .. } | RgsError::RoundInProgress { .. }
        )
    }
}

/// Configuration and catalogue loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse books: {0}")]
    Books(#[from] serde_json::Error),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid catalogue: {0}")]
    InvalidCatalogue(String),
}

pub type RgsResult<T> = Result<T, RgsError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = RgsError::InsufficientBalance {
            balance: 5,
            requested: 10,
        };
        assert!(err.to_string().contains("balance 5"));
        assert!(err.to_string().contains("requested 10"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(RgsError::RoundInProgress { round_id: 3 }.code(), "ERR_RIP");
        assert_eq!(RgsError::StatePoisoned.code(), "ERR_GEN");
        assert!(RgsError::RoundInProgress { round_id: 3 }.is_rejection());
        assert!(!RgsError::StatePoisoned.is_rejection());
    }

    #[test]
    fn test_config_error_source() {
        let err = ConfigError::Read {
            path: "missing.toml".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing.toml"));
    }
}
