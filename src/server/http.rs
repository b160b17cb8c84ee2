//! HTTP server adapter. Requires the `http` feature.
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use event_relay::server::{Hub, HttpServer};
//!
//! let router = Router::new().route("/health", get(|| async { "ok" }));
//! let server = HttpServer::bind("0.0.0.0:3000", router)?;
//!
//! let hub = Hub::new();
//! hub.add_server(server);
//! hub.run()?;
//! ```

use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use tokio::sync::Notify;

use super::{Server, ServerError};

/// Serves an axum [`Router`] on its own tokio runtime until stopped.
///
/// The socket is bound in [`bind`](Self::bind), so the address (including an
/// OS-assigned port) is known before the hub starts serving.
pub struct HttpServer {
    local_addr: SocketAddr,
    parts: Mutex<Option<(TcpListener, Router)>>,
    shutdown: Arc<Notify>,
}

impl HttpServer {
    pub fn bind(addr: &str, router: Router) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        let local_addr = listener.local_addr()?;

        Ok(HttpServer {
            local_addr,
            parts: Mutex::new(Some((listener, router))),
            shutdown: Arc::new(Notify::new()),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Server for HttpServer {
    fn serve(&self) -> Result<(), ServerError> {
        let (listener, router) = self
            .parts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ServerError::AlreadyServed)?;
        listener.set_nonblocking(true)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let shutdown = Arc::clone(&self.shutdown);
        let addr = self.local_addr;

        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener)?;
            tracing::info!(%addr, "HTTP server started");
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.notified().await })
                .await
        })?;

        tracing::info!(%addr, "HTTP server stopped");
        Ok(())
    }

    fn stop(&self) -> Result<(), ServerError> {
        // Leaves a permit when serve() has not reached the await yet.
        self.shutdown.notify_one();
        Ok(())
    }
}
