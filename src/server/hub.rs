use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError};
use std::thread::{self, JoinHandle};

use super::{HubError, Server, ServerError};

const CREATED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Lifecycle of a [`Hub`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    Created,
    Running,
    Stopped,
}

impl HubState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            CREATED => HubState::Created,
            RUNNING => HubState::Running,
            _ => HubState::Stopped,
        }
    }
}

enum Signal {
    Exited(Result<(), ServerError>),
    StopRequested,
}

/// Delivers an external stop request to a [`Hub`]. Cheap to clone; wire it
/// to a shutdown signal handler.
#[derive(Clone)]
pub struct StopHandle {
    tx: Sender<Signal>,
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    /// Ask the hub to stop. Calling it again, or after `run` returned, does nothing.
    pub fn stop(&self) {
        if self.requested.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.tx.send(Signal::StopRequested);
    }
}

/// Runs any number of [`Server`]s and shuts all of them down on the first exit.
///
/// Only the first server result reaches [`run`](Self::run); the ones that
/// follow, which are usually the consequence of the shutdown itself, are
/// dropped.
pub struct Hub {
    state: Arc<AtomicU8>,
    servers: Mutex<Vec<Arc<dyn Server>>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    report_once: Arc<Once>,
    stop_requested: Arc<AtomicBool>,
    tx: Sender<Signal>,
    rx: Mutex<Receiver<Signal>>,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Hub {
            state: Arc::new(AtomicU8::new(CREATED)),
            servers: Mutex::new(Vec::new()),
            threads: Mutex::new(Vec::new()),
            report_once: Arc::new(Once::new()),
            stop_requested: Arc::new(AtomicBool::new(false)),
            tx,
            rx: Mutex::new(rx),
        }
    }

    pub fn state(&self) -> HubState {
        HubState::from_raw(self.state.load(Ordering::SeqCst))
    }

    /// Number of servers registered so far, started or not.
    pub fn servers(&self) -> usize {
        lock(&self.servers).len()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.tx.clone(),
            requested: Arc::clone(&self.stop_requested),
        }
    }

    /// Register `server` and start serving it on its own thread.
    ///
    /// Once the hub has stopped the server is accepted but never started.
    pub fn add_server<S>(&self, server: S)
    where
        S: Server + 'static,
    {
        let server: Arc<dyn Server> = Arc::new(server);

        // Holding the list lock orders this against the stop sweep.
        let mut servers = lock(&self.servers);
        let _ = self
            .state
            .compare_exchange(CREATED, RUNNING, Ordering::SeqCst, Ordering::SeqCst);
        servers.push(Arc::clone(&server));
        if self.state.load(Ordering::SeqCst) == STOPPED {
            tracing::warn!("hub already stopped, server will not be started");
            return;
        }

        let state = Arc::clone(&self.state);
        let report_once = Arc::clone(&self.report_once);
        let tx = self.tx.clone();
        let handle = thread::spawn(move || {
            let result = server.serve();
            if let Err(err) = &result {
                tracing::debug!(error = %err, "server exited with error");
            }
            if state.load(Ordering::SeqCst) == STOPPED {
                return;
            }
            report_once.call_once(|| {
                let _ = tx.send(Signal::Exited(result));
            });
        });
        lock(&self.threads).push(handle);
    }

    /// Block until the first server exits or a stop is requested, stop every
    /// server and wait for all of them.
    ///
    /// Returns the first server's error, `Ok(())` when it returned cleanly,
    /// [`HubError::Stopped`] for a requested stop, or [`HubError::Stop`] when
    /// stopping a server failed.
    pub fn run(&self) -> Result<(), HubError> {
        if self.state() == HubState::Stopped {
            self.join_all();
            return Err(HubError::Stopped);
        }

        tracing::info!("hub running");
        let signal = lock(&self.rx).recv();

        let result = match signal {
            Ok(Signal::Exited(exit)) => {
                if let Some(err) = self.stop() {
                    tracing::warn!(error = %err, "failed to stop server");
                }
                match exit {
                    Err(err) => Err(HubError::Server(err)),
                    Ok(()) if self.stop_requested.load(Ordering::SeqCst) => Err(HubError::Stopped),
                    Ok(()) => Ok(()),
                }
            }
            Ok(Signal::StopRequested) | Err(_) => match self.stop() {
                Some(err) => Err(HubError::Stop(err)),
                None => Err(HubError::Stopped),
            },
        };

        self.join_all();
        tracing::info!("hub stopped");
        result
    }

    // Only the caller that moves the state to Stopped stops the servers.
    fn stop(&self) -> Option<ServerError> {
        let servers = {
            let servers = lock(&self.servers);
            let won = [CREATED, RUNNING].into_iter().any(|from| {
                self.state
                    .compare_exchange(from, STOPPED, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            });
            if !won {
                return None;
            }
            servers.clone()
        };

        let mut first = None;
        for server in servers {
            if let Err(err) = server.stop() {
                if first.is_none() {
                    first = Some(err);
                } else {
                    tracing::warn!(error = %err, "failed to stop server");
                }
            }
        }
        first
    }

    fn join_all(&self) {
        loop {
            let handles: Vec<_> = lock(&self.threads).drain(..).collect();
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if handle.join().is_err() {
                    tracing::error!("server thread panicked");
                }
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
