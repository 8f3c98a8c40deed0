//! The bank: the ledger together with the storage that backs it.

use chrono::{DateTime, Utc};
use query_engine_execution::{Backend, Pool};
use serde::Serialize;
use tracing::{error, info_span, warn};

use crate::accounts::AccountId;
use crate::cache::{write_back, DebitOutcome, Ledger};
use crate::error::ServiceError;
use crate::movements::{self, MovementRecord};
use crate::transaction::{Direction, Movement};

/// The balance of an account after a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub limit: i64,
    pub balance: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    Completed(Balance),
    /// The debit would have exceeded the overdraft limit.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementSummary {
    pub balance: i64,
    pub limit: i64,
    pub taken_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub summary: StatementSummary,
    pub movements: Vec<MovementRecord>,
}

/// Owns the pool and the ledger. One instance is built at startup and shared by reference.
pub struct Bank<B: Backend> {
    pool: Pool<B>,
    ledger: Ledger,
    statement_limit: i64,
}

impl<B: Backend> Bank<B> {
    pub fn new(pool: Pool<B>, ledger: Ledger, statement_limit: i64) -> Self {
        Bank {
            pool,
            ledger,
            statement_limit,
        }
    }

    pub fn pool(&self) -> &Pool<B> {
        &self.pool
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn account_id(&self, id: i64) -> Result<AccountId, ServiceError> {
        self.ledger
            .account_id(id)
            .ok_or(ServiceError::UnknownAccount(id))
    }

    /// Apply a movement and persist it.
    ///
    /// The ledger lock is held until both the new balance and the movement are stored. The
    /// balance is settled first. If the movement cannot be recorded afterwards, the previous
    /// balance is settled again, so stored movements always add up to the stored balance.
    /// On any storage failure the cached account is restored and the error is returned.
    pub fn transact(&self, id: AccountId, movement: &Movement) -> Result<TransactionOutcome, ServiceError> {
        let span = info_span!("transact", account = %id, direction = ?movement.direction());
        let _enter = span.enter();

        let mut accounts = self.ledger.lock();
        let before = accounts.read(id);
        let amount = movement.amount().unsigned_abs();
        let balance = match movement.direction() {
            Direction::Credit => accounts.credit(id, amount),
            Direction::Debit => match accounts.debit(id, amount) {
                DebitOutcome::Committed(balance) => balance,
                DebitOutcome::Rejected => return Ok(TransactionOutcome::Rejected),
            },
        };

        let persisted = write_back(&self.pool, id, balance).and_then(|()| {
            movements::record(&self.pool, id, movement).map_err(|error| {
                if let Err(undo) = write_back(&self.pool, id, before.balance) {
                    error!(%undo, "could not settle the previous balance, storage is ahead of the movements");
                }
                error
            })
        });
        if let Err(error) = persisted {
            warn!(%error, "could not persist the transaction, reverting the ledger");
            accounts.restore(id, before);
            return Err(error.into());
        }

        Ok(TransactionOutcome::Completed(Balance {
            limit: before.limit,
            balance,
        }))
    }

    /// Read an account, write its balance back to storage and list its latest movements.
    pub fn statement(&self, id: AccountId) -> Result<Statement, ServiceError> {
        let span = info_span!("statement", account = %id);
        let _enter = span.enter();

        let summary = {
            let accounts = self.ledger.lock();
            let state = accounts.read(id);
            write_back(&self.pool, id, state.balance)?;
            StatementSummary {
                balance: state.balance,
                limit: state.limit,
                taken_at: Utc::now(),
            }
        };

        let movements = movements::recent(&self.pool, id, self.statement_limit)?;
        Ok(Statement { summary, movements })
    }
}
