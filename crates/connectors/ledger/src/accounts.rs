//! Accounts and their rows in storage.

use query_engine_execution::{execute, Backend, Pool};
use query_engine_sql::sql::{ResultSet, Value};
use serde::Serialize;
use tracing::warn;

use crate::error::StorageError;

pub const LOAD_ACCOUNTS: &str = "select id, account_limit, balance from accounts";
pub const SETTLE_BALANCE: &str = "call settle_balance($1, $2)";

/// An account id known to be inside the ledger's range. Obtained from
/// [`crate::cache::Ledger::account_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AccountId(i64);

impl AccountId {
    pub(crate) fn new_unchecked(id: i64) -> Self {
        AccountId(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The cached state of one account. `balance >= -limit` once loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccountState {
    pub limit: i64,
    pub balance: i64,
}

/// One row of the accounts table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRow {
    pub id: i64,
    pub state: AccountState,
}

/// Read every account row. Rows that cannot be read are logged and skipped.
pub fn load<B: Backend>(pool: &Pool<B>) -> Result<Vec<AccountRow>, StorageError> {
    let result = StorageError::check(execute(pool, LOAD_ACCOUNTS, &[]))?;
    Ok((0..result.row_count())
        .filter_map(|row| {
            let account = read_row(&result, row);
            if account.is_none() {
                warn!(row, "skipping an unreadable account row");
            }
            account
        })
        .collect())
}

fn read_row(result: &ResultSet, row: usize) -> Option<AccountRow> {
    Some(AccountRow {
        id: result.get(row, 0).as_int()?,
        state: AccountState {
            limit: result.get(row, 1).as_int()?,
            balance: result.get(row, 2).as_int()?,
        },
    })
}

/// Persist the balance of an account.
pub fn settle<B: Backend>(pool: &Pool<B>, id: AccountId, balance: i64) -> Result<(), StorageError> {
    StorageError::check(execute(
        pool,
        SETTLE_BALANCE,
        &[Value::Int(id.get()), Value::Int(balance)],
    ))?;
    Ok(())
}
