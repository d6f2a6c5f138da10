//! HTTP server lifecycle — bind, serve, graceful shutdown.
//!
//! Pattern: bind → spawn background task → return handle with shutdown
//! channel. The binary calls [`serve_forever`]; tests and embedders use
//! [`start_server`] to get a handle with the bound address.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::state::AppState;

/// Handle to a running API server.
pub struct ApiServer {
    pub local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl ApiServer {
    /// Signal the server to stop accepting connections and wait for it.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }
}

/// Bind the listener and spawn the server in a background task.
pub async fn start_server(
    state: Arc<AppState>,
    addr: SocketAddr,
) -> Result<ApiServer, std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    let app = api_router(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let serve = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = serve.await {
            tracing::error!("API server error: {e}");
        }
    });

    tracing::info!("API server listening on {local_addr}");
    Ok(ApiServer { local_addr, shutdown_tx: Some(shutdown_tx), task })
}

/// Run the server on the current task until the process is stopped.
pub async fn serve_forever(state: Arc<AppState>, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", listener.local_addr()?);
    axum::serve(listener, api_router(state)).await
}
