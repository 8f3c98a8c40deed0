//! The capabilities a database vendor provides to the pool and the execution engine.

use std::time::Duration;

use query_engine_sql::sql::ResultSet;
use query_engine_translation::translation::params::WireParam;

/// Everything needed to open a session with the database.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Role assumed right after connecting. Empty for the login role.
    pub role: String,
    pub connect_timeout: Option<Duration>,
}

impl Credentials {
    /// Names of the required fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("host", &self.host),
            ("database", &self.database),
            ("user", &self.user),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// keep the password out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Progress of a non-blocking handshake.
#[derive(Debug)]
pub enum HandshakePoll<C> {
    Pending,
    Ready(C),
    Failed(BackendError),
}

/// A database vendor.
///
/// The pool only ever talks to connections through this trait, so a new vendor needs no
/// change to the pool or to the execution engine.
pub trait Backend: Send + Sync {
    type Connection: Send;
    type Handshake: Send;

    /// Name used in result messages, e.g. `Postgres 15`.
    fn name(&self) -> &'static str;

    /// Open a connection, blocking until it is usable or has failed.
    fn connect(&self, credentials: &Credentials) -> Result<Self::Connection, BackendError>;

    /// Start opening a connection without waiting for it.
    fn start_handshake(&self, credentials: &Credentials) -> Result<Self::Handshake, BackendError>;

    fn poll_handshake(&self, handshake: &mut Self::Handshake) -> HandshakePoll<Self::Connection>;

    /// Run a query with positional parameters. Failures are reported in the result set.
    fn execute(
        &self,
        connection: &mut Self::Connection,
        query: &str,
        params: &[WireParam],
    ) -> ResultSet;

    fn close(&self, connection: Self::Connection);
}

/// Failure to open or use a connection.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("could not connect to {address}: {source}")]
    Connect {
        address: String,
        source: std::io::Error,
    },
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("{0}")]
    Server(String),
    #[error("the handshake thread panicked")]
    HandshakePanicked,
    #[error("connection is broken")]
    Broken,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// The message format shared by every result: a summary, the vendor and the vendor's own text.
pub fn vendor_message(summary: &str, vendor: &str, detail: &str) -> String {
    if detail.is_empty() {
        format!("{summary}. ({vendor})")
    } else {
        format!("{summary}. ({vendor}): {detail}")
    }
}
