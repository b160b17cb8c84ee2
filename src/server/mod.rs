//! Lifecycle hub - runs the process's server loops and tears them down together.
//!
//! Every [`Server`] added to a [`Hub`] gets its own thread running
//! `serve()`. [`Hub::run`] blocks until the first server returns or an
//! external stop arrives through a [`StopHandle`], then calls `stop()` on
//! every server exactly once and waits for all of them to finish.
//!
//! ```text
//!   add_server ──► thread: serve() ──result──┐ (first one only)
//!   add_server ──► thread: serve() ──result──┤
//!   StopHandle::stop() ──────────────────────┤
//!                                            ▼
//!                               run(): stop every server, join, return
//! ```
//!
//! ## Example
//!
//! ```
//! use event_relay::server::{FuncServer, Hub, HubError};
//! use std::sync::mpsc;
//! use std::sync::Mutex;
//!
//! let hub = Hub::new();
//! let (done_tx, done_rx) = mpsc::channel::<()>();
//! let done_rx = Mutex::new(done_rx);
//!
//! hub.add_server(FuncServer::new(
//!     move || {
//!         // Blocks until stop() below fires.
//!         let _ = done_rx.lock().unwrap().recv();
//!         Ok(())
//!     },
//!     move || {
//!         let _ = done_tx.send(());
//!         Ok(())
//!     },
//! ));
//!
//! hub.stop_handle().stop();
//! assert!(matches!(hub.run(), Err(HubError::Stopped)));
//! ```

mod error;
#[cfg(feature = "grpc")]
mod grpc;
#[cfg(feature = "http")]
mod http;
mod hub;
mod server;

pub use error::{HubError, ServerError};
#[cfg(feature = "grpc")]
pub use grpc::GrpcServer;
#[cfg(feature = "http")]
pub use http::HttpServer;
pub use hub::{Hub, HubState, StopHandle};
pub use server::{FuncServer, Server};
