//! The Postgres backend.

pub mod connection;
pub mod status;

use query_engine_sql::sql::{ErrorCode, ResultSet};
use query_engine_translation::translation::params::WireParam;

use crate::backend::{vendor_message, Backend, BackendError, Credentials, HandshakePoll};
use crate::handshake::BackgroundHandshake;
use connection::PgConnection;

pub const VENDOR_NAME: &str = "Postgres 15";
pub const DEFAULT_PORT: u16 = 5432;

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresBackend;

impl Backend for PostgresBackend {
    type Connection = PgConnection;
    type Handshake = BackgroundHandshake<PgConnection>;

    fn name(&self) -> &'static str {
        VENDOR_NAME
    }

    fn connect(&self, credentials: &Credentials) -> Result<PgConnection, BackendError> {
        PgConnection::connect(credentials)
    }

    fn start_handshake(&self, credentials: &Credentials) -> Result<Self::Handshake, BackendError> {
        let credentials = credentials.clone();
        BackgroundHandshake::spawn("postgres-handshake", move || {
            PgConnection::connect(&credentials)
        })
    }

    fn poll_handshake(&self, handshake: &mut Self::Handshake) -> HandshakePoll<PgConnection> {
        handshake.poll()
    }

    fn execute(
        &self,
        connection: &mut PgConnection,
        query: &str,
        params: &[WireParam],
    ) -> ResultSet {
        match connection.query(query, params) {
            Ok(raw) => status::to_result_set(VENDOR_NAME, raw),
            Err(error @ (BackendError::Io(_) | BackendError::Broken)) => ResultSet::new(
                ErrorCode::ConnectionError,
                vendor_message(
                    "Connection to the database failed",
                    VENDOR_NAME,
                    &error.to_string(),
                ),
            ),
            Err(error) => ResultSet::new(
                ErrorCode::Fatal,
                vendor_message("Fatal error", VENDOR_NAME, &error.to_string()),
            ),
        }
    }

    fn close(&self, connection: PgConnection) {
        connection.close();
    }
}
