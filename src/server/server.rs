use super::ServerError;

/// A long-running network endpoint (gRPC, HTTP, a queue consumer).
///
/// `serve` blocks until the server fails or is stopped. `stop` asks a running
/// `serve` to return; the hub calls it at most once per server, but it may
/// arrive before `serve` has started or after it has returned.
pub trait Server: Send + Sync {
    fn serve(&self) -> Result<(), ServerError>;

    fn stop(&self) -> Result<(), ServerError>;
}

/// A [`Server`] assembled from two closures.
pub struct FuncServer<S, T> {
    serve: S,
    stop: T,
}

impl<S, T> FuncServer<S, T>
where
    S: Fn() -> Result<(), ServerError> + Send + Sync,
    T: Fn() -> Result<(), ServerError> + Send + Sync,
{
    pub fn new(serve: S, stop: T) -> Self {
        FuncServer { serve, stop }
    }
}

impl<S, T> Server for FuncServer<S, T>
where
    S: Fn() -> Result<(), ServerError> + Send + Sync,
    T: Fn() -> Result<(), ServerError> + Send + Sync,
{
    fn serve(&self) -> Result<(), ServerError> {
        (self.serve)()
    }

    fn stop(&self) -> Result<(), ServerError> {
        (self.stop)()
    }
}
