//! Errors raised by the ledger service.

use query_engine_sql::sql::{ErrorCode, ResultSet};

use crate::transaction::InvalidTransaction;

/// A storage call whose result carried an error status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct StorageError {
    pub code: ErrorCode,
    pub message: String,
}

impl StorageError {
    /// Pass through results that succeeded and turn the others into errors.
    pub fn check(result: ResultSet) -> Result<ResultSet, StorageError> {
        if result.code().is_error() {
            Err(StorageError {
                code: result.code(),
                message: result.message().to_string(),
            })
        } else {
            Ok(result)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("account {0} does not exist")]
    UnknownAccount(i64),
    #[error("invalid transaction: {0}")]
    InvalidTransaction(#[from] InvalidTransaction),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}
