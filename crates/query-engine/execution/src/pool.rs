//! A fixed-size pool of backend connections.
//!
//! The first connection is opened synchronously so that bad credentials fail fast. The rest
//! are opened with non-blocking handshakes which the owner drives with
//! [`Pool::poll_status`] until the pool is `Connected` or `FailedConnection`.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use query_engine_sql::sql::ErrorCode;
use tracing::{debug, error, info, info_span, warn};

use crate::backend::{Backend, BackendError, Credentials, HandshakePoll};
use crate::metrics::Metrics;

/// Attempts made by [`Pool::acquire`] before giving up.
pub const ACQUIRE_RETRIES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    NotConnected,
    Connecting,
    Connected,
    FailedConnection,
    /// The pool was destroyed and cannot be connected again.
    Invalid,
}

impl PoolStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PoolStatus::Connecting)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),
    #[error("unable to connect to the database: {0}")]
    Connection(#[from] BackendError),
    #[error("the pool is already connecting")]
    AlreadyConnecting,
    #[error("the pool has been destroyed")]
    Destroyed,
}

impl PoolError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PoolError::InvalidConfig(_) | PoolError::Destroyed => ErrorCode::InvalidDb,
            PoolError::Connection(_) => ErrorCode::ConnectionError,
            PoolError::AlreadyConnecting => ErrorCode::Processing,
        }
    }
}

struct PoolState<B: Backend> {
    status: PoolStatus,
    idle: Vec<B::Connection>,
    pending: Vec<B::Handshake>,
    /// Connections that completed their handshake and belong to the pool, lent out or not.
    established: usize,
    /// `connect` is opening the first connection without holding the lock.
    opening_first: bool,
}

/// A pool of `capacity` connections to one database.
pub struct Pool<B: Backend> {
    backend: B,
    credentials: Credentials,
    capacity: usize,
    state: Mutex<PoolState<B>>,
    metrics: Option<Metrics>,
}

impl<B: Backend> Pool<B> {
    /// Validate the settings. No connection is opened until [`Pool::connect`].
    pub fn create(backend: B, capacity: usize, credentials: Credentials) -> Result<Self, PoolError> {
        if capacity < 1 {
            return Err(PoolError::InvalidConfig(
                "at least one connection is required".to_string(),
            ));
        }
        let missing = credentials.missing_fields();
        if !missing.is_empty() {
            return Err(PoolError::InvalidConfig(format!(
                "missing connection settings: {}",
                missing.join(", ")
            )));
        }

        Ok(Pool {
            backend,
            credentials,
            capacity,
            state: Mutex::new(PoolState {
                status: PoolStatus::NotConnected,
                idle: Vec::with_capacity(capacity),
                pending: Vec::new(),
                established: 0,
                opening_first: false,
            }),
            metrics: None,
        })
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        metrics.record_pool(self.capacity, self.available());
        self.metrics = Some(metrics);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    /// Connections that are established and not lent out.
    pub fn available(&self) -> usize {
        self.lock().idle.len()
    }

    pub fn status(&self) -> PoolStatus {
        self.lock().status
    }

    /// Open the first connection, then start handshakes for the others.
    pub fn connect(&self) -> Result<(), PoolError> {
        let span = info_span!(
            "connect pool",
            backend = self.backend.name(),
            capacity = self.capacity,
        );
        let _enter = span.enter();

        {
            let mut state = self.lock();
            match state.status {
                PoolStatus::Connected => return Ok(()),
                PoolStatus::Connecting => return Err(PoolError::AlreadyConnecting),
                PoolStatus::Invalid => return Err(PoolError::Destroyed),
                PoolStatus::NotConnected | PoolStatus::FailedConnection => {}
            }
            self.close_idle(&mut state);
            state.status = PoolStatus::Connecting;
            state.opening_first = true;
        }

        let first = match self.backend.connect(&self.credentials) {
            Ok(connection) => connection,
            Err(error) => {
                error!(%error, address = %self.credentials.address(), "first connection failed");
                let mut state = self.lock();
                state.opening_first = false;
                if state.status != PoolStatus::Invalid {
                    state.status = PoolStatus::FailedConnection;
                }
                return Err(PoolError::Connection(error));
            }
        };

        let mut pending = Vec::with_capacity(self.capacity - 1);
        let mut handshake_error = None;
        for _ in 1..self.capacity {
            match self.backend.start_handshake(&self.credentials) {
                Ok(handshake) => pending.push(handshake),
                Err(error) => {
                    error!(%error, "could not start a connection handshake");
                    handshake_error = Some(error);
                    break;
                }
            }
        }

        let mut state = self.lock();
        state.opening_first = false;
        if state.status == PoolStatus::Invalid {
            // destroyed meanwhile, the started handshakes are abandoned with `pending`
            drop(state);
            self.backend.close(first);
            return Err(PoolError::Destroyed);
        }
        state.idle.push(first);
        state.established = 1;
        if let Some(error) = handshake_error {
            state.status = PoolStatus::FailedConnection;
            self.record(&state);
            return Err(PoolError::Connection(error));
        }
        state.pending = pending;
        state.status = if state.pending.is_empty() {
            PoolStatus::Connected
        } else {
            PoolStatus::Connecting
        };
        info!(status = ?state.status, "first connection established");
        self.record(&state);
        Ok(())
    }

    /// Advance every pending handshake and report the pool status.
    ///
    /// The pool is `Connected` once every handshake has succeeded. A single failure makes the
    /// whole pool `FailedConnection`.
    pub fn poll_status(&self) -> PoolStatus {
        let mut state = self.lock();
        if state.status != PoolStatus::Connecting || state.opening_first {
            return state.status;
        }

        let mut failed = false;
        let mut still_pending = Vec::with_capacity(state.pending.len());
        for mut handshake in std::mem::take(&mut state.pending) {
            match self.backend.poll_handshake(&mut handshake) {
                HandshakePoll::Pending => still_pending.push(handshake),
                HandshakePoll::Ready(connection) => {
                    state.idle.push(connection);
                    state.established += 1;
                }
                HandshakePoll::Failed(error) => {
                    error!(%error, "connection handshake failed");
                    failed = true;
                }
            }
        }

        if failed {
            // abandoned handshakes close their connection when they finish
            state.status = PoolStatus::FailedConnection;
        } else if still_pending.is_empty() {
            info!(connections = state.established, "pool connected");
            state.status = PoolStatus::Connected;
        } else {
            state.pending = still_pending;
        }
        self.record(&state);
        state.status
    }

    /// Take an idle connection, retrying a bounded number of times without sleeping.
    pub fn acquire(&self) -> Option<PooledConnection<'_, B>> {
        for attempt in 1..=ACQUIRE_RETRIES {
            {
                let mut state = self.lock();
                if let Some(connection) = state.idle.pop() {
                    debug!(attempt, available = state.idle.len(), "connection acquired");
                    self.record(&state);
                    return Some(PooledConnection {
                        pool: self,
                        connection: Some(connection),
                    });
                }
            }
            std::thread::yield_now();
        }

        warn!(
            retries = ACQUIRE_RETRIES,
            capacity = self.capacity,
            "no connection available in the pool"
        );
        if let Some(metrics) = &self.metrics {
            metrics.acquire_failures_total.inc();
        }
        None
    }

    /// Close every established connection that is not lent out. Connections still lent out
    /// are closed when they are released. The pool cannot be used afterwards.
    pub fn destroy(&self) {
        let mut state = self.lock();
        if state.status == PoolStatus::Invalid {
            return;
        }
        self.close_idle(&mut state);
        state.pending.clear();
        state.status = PoolStatus::Invalid;
        self.record(&state);
        info!(backend = self.backend.name(), "pool destroyed");
    }

    fn release(&self, connection: B::Connection) {
        let mut state = self.lock();
        if state.status == PoolStatus::Invalid {
            state.established = state.established.saturating_sub(1);
            drop(state);
            self.backend.close(connection);
            return;
        }
        if state.idle.len() >= self.capacity {
            warn!(capacity = self.capacity, "released more connections than the pool holds");
            drop(state);
            self.backend.close(connection);
            return;
        }
        state.idle.push(connection);
        debug!(available = state.idle.len(), "connection released");
        self.record(&state);
    }

    fn close_idle(&self, state: &mut PoolState<B>) {
        let closing = state.idle.len();
        for connection in state.idle.drain(..) {
            self.backend.close(connection);
        }
        state.established = state.established.saturating_sub(closing);
    }

    fn record(&self, state: &PoolState<B>) {
        if let Some(metrics) = &self.metrics {
            metrics.record_pool(self.capacity, state.idle.len());
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: Backend> Drop for Pool<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<B: Backend> std::fmt::Debug for Pool<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Pool")
            .field("backend", &self.backend.name())
            .field("capacity", &self.capacity)
            .field("status", &state.status)
            .field("available", &state.idle.len())
            .finish_non_exhaustive()
    }
}

/// A connection lent out by a [`Pool`]. It goes back to the pool when dropped.
pub struct PooledConnection<'pool, B: Backend> {
    pool: &'pool Pool<B>,
    connection: Option<B::Connection>,
}

impl<B: Backend> PooledConnection<'_, B> {
    /// Give the connection back to the pool now.
    pub fn release(self) {
        drop(self);
    }
}

impl<B: Backend> Deref for PooledConnection<'_, B> {
    type Target = B::Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection is present until dropped")
    }
}

impl<B: Backend> DerefMut for PooledConnection<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection is present until dropped")
    }
}

impl<B: Backend> Drop for PooledConnection<'_, B> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(connection);
        }
    }
}
