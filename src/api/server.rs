//! API Server
//!
//! Binds the listener, attaches the middleware stack and shuts down cleanly on
//! Ctrl+C or SIGTERM.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::config::{RgsConfig, ServerConfig};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Router with the full middleware stack
pub fn build_app(state: Arc<AppState>, config: &ServerConfig) -> axum::Router {
    create_router(state)
        // Request ID middleware (first for tracing)
        .layer(axum::middleware::from_fn(request_id_middleware))
        // A panicking handler becomes a generic 500
        .layer(CatchPanicLayer::new())
        // CORS layer (before timeout to handle preflight)
        .layer(create_cors_layer(config.allowed_origins.clone()))
        .layer(TimeoutLayer::new(config.request_timeout()))
        // Tracing layer (last for complete request tracing)
        .layer(TraceLayer::new_for_http())
}

pub struct ApiServer {
    config: RgsConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: RgsConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Start the API server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = build_app(self.state.clone(), &self.config.server);
        let addr = self.get_socket_addr()?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Listening on http://{}", addr);
        self.log_server_info();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("RGS emulator stopped");
        Ok(())
    }

    fn get_socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.server.host.parse::<std::net::IpAddr>()?,
            self.config.server.port,
        )))
    }

    fn log_server_info(&self) {
        let session = &self.config.session;
        let catalogue = self.state.sessions.catalogue();

        info!("Version: {}", self.state.version);
        info!("CORS: {:?}", self.config.server.allowed_origins);
        info!("Request timeout: {:?}", self.config.server.request_timeout());
        info!(
            "Books: {} ({} bonus)",
            catalogue.len(),
            catalogue.bonus_count()
        );
        info!(
            "Starting balance: {} {}",
            session.starting_balance, session.currency
        );
        info!(
            "Policies: overdraft={:?} unclosed_round={:?} isolate_sessions={}",
            session.overdraft, session.unclosed_round, session.isolate_sessions
        );
        if !self.config.catalogue.forced_books.is_empty() {
            warn!(
                "Outcomes pinned to books {:?}",
                self.config.catalogue.forced_books
            );
        }

        info!("Endpoints:");
        info!("   POST /wallet/authenticate");
        info!("   POST /wallet/play");
        info!("   POST /wallet/end-round");
        info!("   POST /wallet/balance");
        info!("   POST /bet/event");
        info!("   POST /bet/replay");
        info!("   GET  /health");
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
