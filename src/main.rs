//! RGS Emulator Binary
//!
//! Local wallet server for slot-machine client development.

use clap::Parser;
use rgs_emulator::{
    api::{ApiServer, AppState},
    config::ConfigLoader,
    games::{
        catalogue::{missing_ids, Catalogue},
        BookSelector, ScriptedSelector, SessionRegistry, UniformSelector,
    },
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rgs-emulator")]
#[command(about = "Remote game server wallet emulator", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// API server host
    #[arg(long)]
    host: Option<String>,

    /// API server port
    #[arg(long)]
    port: Option<u16>,

    /// JSON books file (defaults to the bundled fixtures)
    #[arg(long)]
    books: Option<String>,

    /// Allowed CORS origins (comma-separated, use * for all)
    #[arg(long)]
    cors_origins: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Cycle through these book ids instead of random selection (comma-separated)
    #[arg(long, value_delimiter = ',')]
    force_book: Vec<u64>,

    /// Give each session id its own wallet
    #[arg(long)]
    isolate_sessions: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rgs_emulator=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(origins) = args.cors_origins {
        config.server.allowed_origins = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();
    }
    if let Some(timeout) = args.timeout {
        config.server.request_timeout_secs = timeout;
    }
    if let Some(books) = args.books {
        config.catalogue.books_path = Some(books);
    }
    if !args.force_book.is_empty() {
        config.catalogue.forced_books = args.force_book;
    }
    if args.isolate_sessions {
        config.session.isolate_sessions = true;
    }
    config.validate()?;

    let catalogue = match &config.catalogue.books_path {
        Some(path) => Catalogue::load(path)?,
        None => Catalogue::embedded()?,
    };

    let missing = missing_ids(&catalogue, &config.catalogue.forced_books);
    if !missing.is_empty() {
        return Err(format!("--force-book ids not in catalogue: {:?}", missing).into());
    }

    let selector: Arc<dyn BookSelector> = if config.catalogue.forced_books.is_empty() {
        Arc::new(UniformSelector)
    } else {
        Arc::new(ScriptedSelector::new(config.catalogue.forced_books.clone()))
    };

    info!("Starting RGS emulator");

    let state = Arc::new(AppState {
        sessions: SessionRegistry::new(Arc::new(catalogue), selector, config.session.clone()),
        game: config.game.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    ApiServer::new(config, state).run().await
}
