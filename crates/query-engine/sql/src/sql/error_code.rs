//! The vendor independent status taxonomy attached to every result set.

use serde::Serialize;

/// Status of a query, or of a pool operation, in terms every backend maps into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, enum_iterator::Sequence,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Ok,
    UniqueConstraintViolation,
    InvalidType,
    InvalidRange,
    /// The backend is still working on something (a copy, a pipeline sync, a pending handshake).
    Processing,
    /// A non fatal notice from the backend.
    Info,
    Fatal,
    ConnectionError,
    Unknown,
    /// The configuration cannot describe a usable database.
    InvalidDb,
}

impl ErrorCode {
    /// Codes that carry no usable rows.
    pub fn is_error(self) -> bool {
        !matches!(self, ErrorCode::Ok | ErrorCode::Info | ErrorCode::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Ok => "ok",
            ErrorCode::UniqueConstraintViolation => "unique_constraint_violation",
            ErrorCode::InvalidType => "invalid_type",
            ErrorCode::InvalidRange => "invalid_range",
            ErrorCode::Processing => "processing",
            ErrorCode::Info => "info",
            ErrorCode::Fatal => "fatal",
            ErrorCode::ConnectionError => "connection_error",
            ErrorCode::Unknown => "unknown",
            ErrorCode::InvalidDb => "invalid_db",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
