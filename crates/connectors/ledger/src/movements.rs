//! Movements recorded against an account.

use query_engine_execution::{execute, Backend, Pool};
use query_engine_sql::sql::{ResultSet, Value};
use serde::Serialize;
use tracing::warn;

use crate::accounts::AccountId;
use crate::error::StorageError;
use crate::transaction::{Direction, Movement};

pub const RECORD_MOVEMENT: &str = "call record_movement($1, $2, $3, $4)";
pub const RECENT_MOVEMENTS: &str =
    "select amount, is_credit, description, performed_at from recent_movements($1, $2)";

/// A movement as stored, newest first in a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementRecord {
    pub amount: i64,
    pub direction: Direction,
    pub description: String,
    pub performed_at: String,
}

/// Append a movement to the account's history.
pub fn record<B: Backend>(pool: &Pool<B>, id: AccountId, movement: &Movement) -> Result<(), StorageError> {
    StorageError::check(execute(
        pool,
        RECORD_MOVEMENT,
        &[
            Value::Int(id.get()),
            Value::Bool(movement.direction().is_credit()),
            Value::Int(movement.amount()),
            Value::from(movement.description()),
        ],
    ))?;
    Ok(())
}

/// The latest `limit` movements of an account, newest first.
pub fn recent<B: Backend>(
    pool: &Pool<B>,
    id: AccountId,
    limit: i64,
) -> Result<Vec<MovementRecord>, StorageError> {
    let result = StorageError::check(execute(
        pool,
        RECENT_MOVEMENTS,
        &[Value::Int(id.get()), Value::Int(limit)],
    ))?;
    Ok((0..result.row_count())
        .filter_map(|row| {
            let record = read_row(&result, row);
            if record.is_none() {
                warn!(row, account = %id, "skipping an unreadable movement row");
            }
            record
        })
        .collect())
}

fn read_row(result: &ResultSet, row: usize) -> Option<MovementRecord> {
    Some(MovementRecord {
        amount: result.get(row, 0).as_int()?,
        direction: Direction::from_credit_flag(result.get(row, 1).as_bool()?),
        description: result.get(row, 2).as_str()?.to_string(),
        performed_at: result.get(row, 3).as_str()?.to_string(),
    })
}
