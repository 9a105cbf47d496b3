//! Wallet protocol HTTP layer
//!
//! Translates the RGS wallet endpoints into session operations and encodes
//! the results as JSON. No settlement logic lives here.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use server::{build_app, ApiServer};
