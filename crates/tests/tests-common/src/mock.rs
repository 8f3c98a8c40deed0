//! An in-memory [`Backend`] whose handshakes and query results are scripted by the test.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use query_engine_execution::{Backend, BackendError, Credentials, HandshakePoll};
use query_engine_sql::sql::{ErrorCode, ResultSet};
use query_engine_translation::translation::params::WireParam;

pub const MOCK_VENDOR: &str = "Mock 1";

type Handler = dyn Fn(&str, &[WireParam]) -> ResultSet + Send + Sync;

/// How one non-blocking handshake plays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeScript {
    /// Ready after this many `Pending` polls.
    SucceedAfter(usize),
    /// Failed after this many `Pending` polls.
    FailAfter(usize),
}

/// A query the backend was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedQuery {
    pub connection: usize,
    pub query: String,
    pub params: Vec<WireParam>,
}

#[derive(Debug)]
pub struct MockConnection {
    pub id: usize,
}

#[derive(Debug)]
pub struct MockHandshake {
    remaining_polls: usize,
    outcome: Option<Result<MockConnection, BackendError>>,
}

/// A blocking connect held open by the test. See [`MockBackend::hold_next_connect`].
pub struct HeldConnect {
    started: Receiver<()>,
    release: Sender<()>,
}

impl HeldConnect {
    /// Block until the backend is inside `connect`.
    pub fn wait_until_started(&self) {
        let _ = self.started.recv();
    }

    /// Let the connect finish.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

struct MockState {
    fail_connect: AtomicBool,
    connect_hold: Mutex<Option<(Sender<()>, Receiver<()>)>>,
    next_id: AtomicUsize,
    open: AtomicUsize,
    closed: AtomicUsize,
    active: Mutex<HashSet<usize>>,
    max_concurrent: AtomicUsize,
    double_checkouts: AtomicUsize,
    query_delay: Mutex<Option<Duration>>,
    handshakes: Mutex<VecDeque<HandshakeScript>>,
    executed: Mutex<Vec<ExecutedQuery>>,
    handler: Mutex<Arc<Handler>>,
}

/// Cloning shares the script and the counters, so a test can keep a handle on a backend it
/// moved into a pool.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<MockState>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Every connection succeeds at once and every query returns an empty `Ok` result.
    pub fn new() -> Self {
        MockBackend {
            state: Arc::new(MockState {
                fail_connect: AtomicBool::new(false),
                connect_hold: Mutex::new(None),
                next_id: AtomicUsize::new(0),
                open: AtomicUsize::new(0),
                closed: AtomicUsize::new(0),
                active: Mutex::new(HashSet::new()),
                max_concurrent: AtomicUsize::new(0),
                double_checkouts: AtomicUsize::new(0),
                query_delay: Mutex::new(None),
                handshakes: Mutex::new(VecDeque::new()),
                executed: Mutex::new(Vec::new()),
                handler: Mutex::new(Arc::new(|_: &str, _: &[WireParam]| {
                    ResultSet::new(ErrorCode::Ok, format!("Query executed successfully. ({MOCK_VENDOR})"))
                })),
            }),
        }
    }

    /// Make the blocking connect fail.
    pub fn fail_connect(&self) {
        self.state.fail_connect.store(true, Ordering::SeqCst);
    }

    /// Make the next blocking connect wait until the returned hold is released.
    pub fn hold_next_connect(&self) -> HeldConnect {
        let (started_sender, started) = mpsc::channel();
        let (release, release_receiver) = mpsc::channel();
        *lock(&self.state.connect_hold) = Some((started_sender, release_receiver));
        HeldConnect { started, release }
    }

    /// Queue scripts for the next handshakes. Unscripted handshakes succeed immediately.
    pub fn script_handshakes(&self, scripts: impl IntoIterator<Item = HandshakeScript>) {
        lock(&self.state.handshakes).extend(scripts);
    }

    /// Answer queries with `handler`.
    pub fn respond_with<F>(&self, handler: F)
    where
        F: Fn(&str, &[WireParam]) -> ResultSet + Send + Sync + 'static,
    {
        *lock(&self.state.handler) = Arc::new(handler);
    }

    /// Hold each connection for `delay` while executing, to widen race windows.
    pub fn slow_queries(&self, delay: Duration) {
        *lock(&self.state.query_delay) = Some(delay);
    }

    /// Connections opened and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.state.open.load(Ordering::SeqCst)
    }

    pub fn closed_connections(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// The most connections that were ever executing at once.
    pub fn max_concurrent(&self) -> usize {
        self.state.max_concurrent.load(Ordering::SeqCst)
    }

    /// Times a connection was used while another caller was already using it.
    pub fn double_checkouts(&self) -> usize {
        self.state.double_checkouts.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<ExecutedQuery> {
        lock(&self.state.executed).clone()
    }

    fn open_connection(&self) -> MockConnection {
        self.state.open.fetch_add(1, Ordering::SeqCst);
        MockConnection {
            id: self.state.next_id.fetch_add(1, Ordering::SeqCst),
        }
    }
}

impl Backend for MockBackend {
    type Connection = MockConnection;
    type Handshake = MockHandshake;

    fn name(&self) -> &'static str {
        MOCK_VENDOR
    }

    fn connect(&self, credentials: &Credentials) -> Result<MockConnection, BackendError> {
        let hold = lock(&self.state.connect_hold).take();
        if let Some((started, release)) = hold {
            let _ = started.send(());
            let _ = release.recv();
        }
        if self.state.fail_connect.load(Ordering::SeqCst) {
            return Err(BackendError::Authentication(format!(
                "password authentication failed for user \"{}\"",
                credentials.user
            )));
        }
        Ok(self.open_connection())
    }

    fn start_handshake(&self, _credentials: &Credentials) -> Result<MockHandshake, BackendError> {
        let script = lock(&self.state.handshakes)
            .pop_front()
            .unwrap_or(HandshakeScript::SucceedAfter(0));
        let handshake = match script {
            HandshakeScript::SucceedAfter(polls) => MockHandshake {
                remaining_polls: polls,
                outcome: Some(Ok(self.open_connection())),
            },
            HandshakeScript::FailAfter(polls) => MockHandshake {
                remaining_polls: polls,
                outcome: Some(Err(BackendError::Server("the database system is starting up".to_string()))),
            },
        };
        Ok(handshake)
    }

    fn poll_handshake(&self, handshake: &mut MockHandshake) -> HandshakePoll<MockConnection> {
        if handshake.remaining_polls > 0 {
            handshake.remaining_polls -= 1;
            return HandshakePoll::Pending;
        }
        match handshake.outcome.take() {
            Some(Ok(connection)) => HandshakePoll::Ready(connection),
            Some(Err(error)) => HandshakePoll::Failed(error),
            None => HandshakePoll::Failed(BackendError::Protocol("handshake already completed".to_string())),
        }
    }

    fn execute(&self, connection: &mut MockConnection, query: &str, params: &[WireParam]) -> ResultSet {
        {
            let mut active = lock(&self.state.active);
            if !active.insert(connection.id) {
                self.state.double_checkouts.fetch_add(1, Ordering::SeqCst);
            }
            self.state.max_concurrent.fetch_max(active.len(), Ordering::SeqCst);
        }

        lock(&self.state.executed).push(ExecutedQuery {
            connection: connection.id,
            query: query.to_string(),
            params: params.to_vec(),
        });

        let delay = *lock(&self.state.query_delay);
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let handler = Arc::clone(&lock(&self.state.handler));
        let result = handler(query, params);

        lock(&self.state.active).remove(&connection.id);
        tracing::debug!(connection = connection.id, query, code = %result.code(), "mock query");
        result
    }

    fn close(&self, _connection: MockConnection) {
        self.state.open.fetch_sub(1, Ordering::SeqCst);
        self.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Credentials that pass validation. The mock ignores them.
pub fn credentials() -> Credentials {
    Credentials {
        host: "localhost".to_string(),
        port: 5432,
        database: "ledger".to_string(),
        user: "admin".to_string(),
        password: "password".to_string(),
        role: String::new(),
        connect_timeout: None,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
