//! gRPC server adapter. Requires the `grpc` feature.
//!
//! ```ignore
//! use event_relay::server::{GrpcServer, Hub};
//! use tonic::transport::Server;
//!
//! let router = Server::builder().add_service(my_service);
//! let hub = Hub::new();
//! hub.add_server(GrpcServer::new(router, "0.0.0.0:50051".parse()?));
//! hub.run()?;
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;
use tonic::transport::server::Router;

use super::{Server, ServerError};

/// Serves a tonic [`Router`] until stopped, draining in-flight calls first.
pub struct GrpcServer {
    addr: SocketAddr,
    router: Mutex<Option<Router>>,
    shutdown: Arc<Notify>,
}

impl GrpcServer {
    pub fn new(router: Router, addr: SocketAddr) -> Self {
        GrpcServer {
            addr,
            router: Mutex::new(Some(router)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Server for GrpcServer {
    fn serve(&self) -> Result<(), ServerError> {
        let router = self
            .router
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ServerError::AlreadyServed)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let shutdown = Arc::clone(&self.shutdown);
        let addr = self.addr;

        tracing::info!(%addr, "gRPC server started");
        runtime
            .block_on(router.serve_with_shutdown(addr, async move { shutdown.notified().await }))
            .map_err(|err| ServerError::Runtime(format!("failed to serve gRPC on {addr}: {err}")))?;

        tracing::info!(%addr, "gRPC server stopped");
        Ok(())
    }

    fn stop(&self) -> Result<(), ServerError> {
        self.shutdown.notify_one();
        Ok(())
    }
}
