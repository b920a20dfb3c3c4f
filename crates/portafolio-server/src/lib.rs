//! HTTP front of the portfolio: the streaming chat proxy and the locale
//! dictionaries.

pub mod config;
pub mod error;
pub mod routes;

pub use config::ServerConfig;
pub use error::ProxyError;
pub use routes::{router, AppState};

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Bind `config.bind` and serve until ctrl-c.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    let state = Arc::new(AppState::new(config)?);
    serve_on(listener, state, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    info!(
        addr = %listener.local_addr()?,
        upstream = %state.config.upstream_url,
        "portfolio server listening"
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("portfolio server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler the server runs until killed
        std::future::pending::<()>().await;
    }
}
