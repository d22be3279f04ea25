//! Listener setup and graceful shutdown.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use orbit_config::Settings;
use orbit_sim::EngineHandle;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::router::build_router;
use crate::state::AppState;

/// Failures bringing up or running the listener.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid listen host `{host}`")]
    InvalidAddress { host: String },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serve the observer API until the shutdown signal flips.
///
/// Streaming sessions watch the same signal, so shutdown cancels them
/// rather than waiting out long-lived sockets.
pub async fn serve(
    settings: Arc<Settings>,
    engine: EngineHandle,
    shutdown: watch::Receiver<bool>,
) -> Result<(), ServerError> {
    let host: IpAddr =
        settings
            .server
            .host
            .parse()
            .map_err(|_| ServerError::InvalidAddress {
                host: settings.server.host.clone(),
            })?;
    let addr = SocketAddr::new(host, settings.server.port);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(%addr, "orbit engine server listening");

    let state = AppState::new(engine, settings, shutdown.clone());
    let app = build_router(state);

    let mut signal = shutdown;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // Either a flipped flag or a dropped sender ends the server.
            while signal.changed().await.is_ok() {
                if *signal.borrow() {
                    break;
                }
            }
        })
        .await?;
    tracing::info!("orbit engine server stopped");
    Ok(())
}
