//! RGS Emulator - wallet protocol server for slot-machine clients
//!
//! Plays pre-recorded outcome books against a single tracked balance.
//! Simple wins settle at bet time; bonus outcomes settle when the client
//! closes the round.

pub mod api;
pub mod config;
pub mod errors;
pub mod games;

pub use config::RgsConfig;
pub use errors::{ConfigError, RgsError};
