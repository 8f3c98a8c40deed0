//! A synchronous Postgres session speaking the v3 frontend/backend protocol.
//!
//! Queries go through the extended protocol with every parameter and every result column in
//! text format, which is what the tagged value marshaling works with.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::{BufMut, BytesMut};
use fallible_iterator::FallibleIterator;
use postgres_protocol::authentication::{self, sasl};
use postgres_protocol::message::backend::{ErrorFields, Message};
use postgres_protocol::message::frontend;
use postgres_protocol::{IsNull, Oid};
use tracing::{debug, warn};

use query_engine_translation::translation::params::WireParam;

use crate::backend::{BackendError, Credentials};

const APPLICATION_NAME: &str = "ledger";
const READ_CHUNK: usize = 8 * 1024;

/// Outcome class of one query, in the terms libpq uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    EmptyQuery,
    CommandOk,
    TuplesOk,
    CopyOut,
    CopyIn,
    BadResponse,
    NonfatalError,
    FatalError,
}

/// The fields of an ErrorResponse or NoticeResponse that we report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbError {
    pub severity: String,
    /// The SQLSTATE code.
    pub code: String,
    pub message: String,
    pub detail: Option<String>,
    pub hint: Option<String>,
}

impl DbError {
    fn parse(mut fields: ErrorFields<'_>) -> io::Result<Self> {
        let mut error = DbError::default();
        let mut localized_severity = None;
        while let Some(field) = fields.next()? {
            let value = String::from_utf8_lossy(field.value_bytes()).into_owned();
            match field.type_() {
                b'S' => localized_severity = Some(value),
                b'V' => error.severity = value,
                b'C' => error.code = value,
                b'M' => error.message = value,
                b'D' => error.detail = Some(value),
                b'H' => error.hint = Some(value),
                _ => {}
            }
        }
        if error.severity.is_empty() {
            error.severity = localized_severity.unwrap_or_default();
        }
        Ok(error)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity.as_str(), "ERROR" | "FATAL" | "PANIC")
    }
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:  {}", self.severity, self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\nDETAIL:  {detail}")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\nHINT:  {hint}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    pub name: String,
    pub type_oid: Oid,
}

/// Everything the server sent back for one query, undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    pub status: ExecStatus,
    pub fields: Vec<FieldDescription>,
    pub rows: Vec<Vec<Option<Vec<u8>>>>,
    pub error: Option<DbError>,
}

pub struct PgConnection {
    stream: TcpStream,
    read_buffer: BytesMut,
    write_buffer: BytesMut,
    broken: bool,
}

impl PgConnection {
    /// Connect, authenticate and assume the configured role.
    pub fn connect(credentials: &Credentials) -> Result<Self, BackendError> {
        let address = credentials.address();
        let stream = open_stream(credentials).map_err(|source| BackendError::Connect {
            address: address.clone(),
            source,
        })?;
        stream.set_nodelay(true)?;

        let mut connection = PgConnection {
            stream,
            read_buffer: BytesMut::with_capacity(READ_CHUNK),
            write_buffer: BytesMut::with_capacity(READ_CHUNK),
            broken: false,
        };
        connection.startup(credentials)?;

        if !credentials.role.is_empty() {
            let statement = format!("SET ROLE {}", quote_identifier(&credentials.role));
            let result = connection.query(&statement, &[])?;
            if let Some(error) = result.error {
                return Err(BackendError::Server(error.to_string()));
            }
        }

        debug!(%address, database = %credentials.database, "connection established");
        Ok(connection)
    }

    /// Run one query through Parse, Bind, Describe, Execute and Sync.
    ///
    /// An `Err` means the session itself failed, and the connection is marked broken when the
    /// failure happened on the socket.
    pub fn query(&mut self, query: &str, params: &[WireParam]) -> Result<RawResult, BackendError> {
        if self.broken {
            return Err(BackendError::Broken);
        }
        if let Err(error) = self.encode_query(query, params) {
            self.write_buffer.clear();
            return Err(error);
        }
        let result = self.flush().and_then(|()| self.read_result());
        if matches!(result, Err(BackendError::Io(_))) {
            self.broken = true;
        }
        result
    }

    /// Say goodbye to the server. Errors are irrelevant at this point.
    pub fn close(mut self) {
        if self.broken {
            return;
        }
        frontend::terminate(&mut self.write_buffer);
        if let Err(error) = self.flush() {
            debug!(%error, "could not send terminate");
        }
    }

    fn startup(&mut self, credentials: &Credentials) -> Result<(), BackendError> {
        frontend::startup_message(
            [
                ("user", credentials.user.as_str()),
                ("database", credentials.database.as_str()),
                ("application_name", APPLICATION_NAME),
                ("client_encoding", "UTF8"),
            ],
            &mut self.write_buffer,
        )?;
        self.flush()?;

        let mut scram: Option<sasl::ScramSha256> = None;
        loop {
            match self.read_message()? {
                Message::AuthenticationOk => {}
                Message::AuthenticationCleartextPassword => {
                    frontend::password_message(
                        credentials.password.as_bytes(),
                        &mut self.write_buffer,
                    )?;
                    self.flush()?;
                }
                Message::AuthenticationMd5Password(body) => {
                    let hash = authentication::md5_hash(
                        credentials.user.as_bytes(),
                        credentials.password.as_bytes(),
                        body.salt(),
                    );
                    frontend::password_message(hash.as_bytes(), &mut self.write_buffer)?;
                    self.flush()?;
                }
                Message::AuthenticationSasl(body) => {
                    let mut mechanisms = body.mechanisms();
                    let mut supported = false;
                    while let Some(mechanism) = mechanisms.next()? {
                        supported |= mechanism == sasl::SCRAM_SHA_256;
                    }
                    if !supported {
                        return Err(BackendError::Authentication(
                            "the server offers no supported SASL mechanism".to_string(),
                        ));
                    }
                    let exchange = sasl::ScramSha256::new(
                        credentials.password.as_bytes(),
                        sasl::ChannelBinding::unsupported(),
                    );
                    frontend::sasl_initial_response(
                        sasl::SCRAM_SHA_256,
                        exchange.message(),
                        &mut self.write_buffer,
                    )?;
                    self.flush()?;
                    scram = Some(exchange);
                }
                Message::AuthenticationSaslContinue(body) => {
                    let exchange = scram.as_mut().ok_or_else(|| {
                        BackendError::Protocol("SASL continue without SASL start".to_string())
                    })?;
                    exchange
                        .update(body.data())
                        .map_err(|error| BackendError::Authentication(error.to_string()))?;
                    frontend::sasl_response(exchange.message(), &mut self.write_buffer)?;
                    self.flush()?;
                }
                Message::AuthenticationSaslFinal(body) => {
                    let exchange = scram.as_mut().ok_or_else(|| {
                        BackendError::Protocol("SASL final without SASL start".to_string())
                    })?;
                    exchange
                        .finish(body.data())
                        .map_err(|error| BackendError::Authentication(error.to_string()))?;
                }
                Message::ParameterStatus(_) | Message::BackendKeyData(_) => {}
                Message::NoticeResponse(body) => {
                    let notice = DbError::parse(body.fields())?;
                    warn!(%notice, "notice during startup");
                }
                Message::ErrorResponse(body) => {
                    let error = DbError::parse(body.fields())?;
                    return Err(BackendError::Authentication(error.to_string()));
                }
                Message::ReadyForQuery(_) => return Ok(()),
                _ => {
                    return Err(BackendError::Protocol(
                        "unexpected message during startup".to_string(),
                    ))
                }
            }
        }
    }

    fn encode_query(&mut self, query: &str, params: &[WireParam]) -> Result<(), BackendError> {
        frontend::parse("", query, std::iter::empty::<Oid>(), &mut self.write_buffer)?;
        frontend::bind(
            "",
            "",
            std::iter::empty::<i16>(),
            params,
            |param, buffer| match param {
                WireParam::Null => Ok(IsNull::Yes),
                WireParam::Text(text) => {
                    buffer.put_slice(text.as_bytes());
                    Ok(IsNull::No)
                }
            },
            std::iter::empty::<i16>(),
            &mut self.write_buffer,
        )
        .map_err(|error| match error {
            frontend::BindError::Conversion(error) => BackendError::Protocol(error.to_string()),
            frontend::BindError::Serialization(error) => BackendError::Io(error),
        })?;
        frontend::describe(b'P', "", &mut self.write_buffer)?;
        frontend::execute("", 0, &mut self.write_buffer)?;
        frontend::sync(&mut self.write_buffer);
        Ok(())
    }

    fn read_result(&mut self) -> Result<RawResult, BackendError> {
        let mut result = RawResult {
            status: ExecStatus::CommandOk,
            fields: Vec::new(),
            rows: Vec::new(),
            error: None,
        };
        let mut described = false;
        let mut copying = false;

        loop {
            match self.read_message()? {
                Message::ParseComplete
                | Message::BindComplete
                | Message::NoData
                | Message::ParameterStatus(_)
                | Message::NotificationResponse(_)
                | Message::CopyData(_)
                | Message::CopyDone => {}
                Message::RowDescription(body) => {
                    described = true;
                    result.fields = body
                        .fields()
                        .map(|field| {
                            Ok(FieldDescription {
                                name: field.name().to_string(),
                                type_oid: field.type_oid(),
                            })
                        })
                        .collect::<Vec<_>>()?;
                }
                Message::DataRow(body) => {
                    let buffer = body.buffer();
                    let row: Vec<Option<Vec<u8>>> = body
                        .ranges()
                        .map(|range| Ok(range.map(|range| buffer[range].to_vec())))
                        .collect()?;
                    result.rows.push(row);
                }
                Message::CommandComplete(_) => {
                    if !copying && result.error.is_none() {
                        result.status = if described {
                            ExecStatus::TuplesOk
                        } else {
                            ExecStatus::CommandOk
                        };
                    }
                }
                Message::EmptyQueryResponse => result.status = ExecStatus::EmptyQuery,
                Message::CopyInResponse(_) => {
                    copying = true;
                    result.status = ExecStatus::CopyIn;
                    // the Sync sent with the query was ignored in copy-in mode
                    frontend::copy_fail("COPY is not supported", &mut self.write_buffer)?;
                    frontend::sync(&mut self.write_buffer);
                    self.flush()?;
                }
                Message::CopyOutResponse(_) => {
                    copying = true;
                    result.status = ExecStatus::CopyOut;
                }
                Message::ErrorResponse(body) => {
                    let error = DbError::parse(body.fields())?;
                    if !copying {
                        result.status = if error.is_error() {
                            ExecStatus::FatalError
                        } else {
                            ExecStatus::NonfatalError
                        };
                    }
                    result.error = Some(error);
                }
                Message::NoticeResponse(body) => {
                    let notice = DbError::parse(body.fields())?;
                    warn!(%notice, "server notice");
                }
                Message::ReadyForQuery(_) => return Ok(result),
                _ => result.status = ExecStatus::BadResponse,
            }
        }
    }

    fn read_message(&mut self) -> Result<Message, BackendError> {
        loop {
            if let Some(message) = Message::parse(&mut self.read_buffer)? {
                return Ok(message);
            }
            let mut chunk = [0_u8; READ_CHUNK];
            let read = self.stream.read(&mut chunk)?;
            if read == 0 {
                return Err(BackendError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "the server closed the connection",
                )));
            }
            self.read_buffer.extend_from_slice(&chunk[..read]);
        }
    }

    fn flush(&mut self) -> Result<(), BackendError> {
        self.stream.write_all(&self.write_buffer)?;
        self.stream.flush()?;
        self.write_buffer.clear();
        Ok(())
    }
}

impl std::fmt::Debug for PgConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnection")
            .field("peer", &self.stream.peer_addr().ok())
            .field("broken", &self.broken)
            .finish_non_exhaustive()
    }
}

fn open_stream(credentials: &Credentials) -> io::Result<TcpStream> {
    let Some(timeout) = credentials.connect_timeout else {
        return TcpStream::connect((credentials.host.as_str(), credentials.port));
    };

    let mut last_error = None;
    for address in (credentials.host.as_str(), credentials.port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&address, timeout) {
            Ok(stream) => return Ok(stream),
            Err(error) => last_error = Some(error),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
    }))
}

/// Quote an identifier, doubling embedded quotes.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
