//! Classify Postgres outcomes into the portable error taxonomy and decode their rows.

use query_engine_metadata::metadata::postgres::POSTGRES_TYPES;
use query_engine_sql::sql::{ErrorCode, Kind, ResultSet};
use query_engine_translation::translation::cells;

use super::connection::{DbError, ExecStatus, RawResult};
use crate::backend::vendor_message;

const UNIQUE_VIOLATION: &str = "23505";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

pub fn map_status(status: ExecStatus) -> ErrorCode {
    match status {
        ExecStatus::EmptyQuery | ExecStatus::CommandOk | ExecStatus::TuplesOk => ErrorCode::Ok,
        ExecStatus::CopyOut | ExecStatus::CopyIn => ErrorCode::Processing,
        ExecStatus::BadResponse | ExecStatus::FatalError => ErrorCode::Fatal,
        ExecStatus::NonfatalError => ErrorCode::Info,
    }
}

/// Refine a fatal error using its SQLSTATE, then its text.
///
/// This is best effort. The text rules depend on the server's wording and locale, so an error
/// reported in another language may stay a generic `Fatal`.
pub fn refine_fatal(error: Option<&DbError>) -> (ErrorCode, &'static str) {
    let Some(error) = error else {
        return (ErrorCode::Fatal, "Fatal error");
    };

    match error.code.as_str() {
        UNIQUE_VIOLATION => return (ErrorCode::UniqueConstraintViolation, "Entry already in database"),
        INVALID_TEXT_REPRESENTATION => return (ErrorCode::InvalidType, "Query has invalid param syntax"),
        STRING_DATA_RIGHT_TRUNCATION | NUMERIC_VALUE_OUT_OF_RANGE => {
            return (ErrorCode::InvalidRange, "Invalid range for field")
        }
        _ => {}
    }

    let message = error.message.as_str();
    if message.contains("invalid input syntax") {
        (ErrorCode::InvalidType, "Query has invalid param syntax")
    } else if message.contains("violates unique constraint") {
        (ErrorCode::UniqueConstraintViolation, "Entry already in database")
    } else if message.contains("too long") || message.contains("too short") {
        (ErrorCode::InvalidRange, "Invalid range for field")
    } else {
        (ErrorCode::Fatal, "Fatal error")
    }
}

/// Turn what the server sent into a result set. Rows are only decoded on success.
pub fn to_result_set(vendor: &str, raw: RawResult) -> ResultSet {
    let detail = raw.error.as_ref().map(ToString::to_string).unwrap_or_default();

    let (code, summary) = match map_status(raw.status) {
        ErrorCode::Ok => (ErrorCode::Ok, "Query executed successfully"),
        ErrorCode::Fatal => refine_fatal(raw.error.as_ref()),
        ErrorCode::Processing => (ErrorCode::Processing, "Query is still processing"),
        ErrorCode::Info => (ErrorCode::Info, "Query returned a notice"),
        other => (other, "Unknown query status"),
    };
    let message = vendor_message(summary, vendor, &detail);

    if code != ErrorCode::Ok {
        return ResultSet::new(code, message);
    }

    let kinds: Vec<Kind> = raw
        .fields
        .iter()
        .map(|field| POSTGRES_TYPES.kind_for(field.type_oid))
        .collect();
    let names = raw.fields.into_iter().map(|field| field.name).collect();

    let mut result = ResultSet::with_fields(names, code, message);
    for row in raw.rows {
        let cells = row
            .iter()
            .zip(&kinds)
            .map(|(cell, kind)| cells::decode_cell(*kind, cell.as_deref()))
            .collect();
        result.push_row(cells);
    }
    result
}
