//! The in-memory balance ledger.
//!
//! Every account lives behind one lock. Credits and debits are read-modify-write operations
//! done while holding it, so operations on the same account are totally ordered and a debit
//! can never take a balance below `-limit`.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use query_engine_execution::{Backend, Pool};
use tracing::{error, info, warn};

use crate::accounts::{self, AccountId, AccountState};
use crate::error::StorageError;

/// The outcome of a debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// The debit was applied. Carries the new balance.
    Committed(i64),
    /// The debit would have broken the overdraft limit. Nothing changed.
    Rejected,
}

/// Balances for the accounts `1..=max_account_id`.
#[derive(Debug)]
pub struct Ledger {
    max_account_id: i64,
    accounts: Mutex<BTreeMap<AccountId, AccountState>>,
}

impl Ledger {
    /// A ledger where every account has a zero limit and a zero balance.
    pub fn new(max_account_id: i64) -> Self {
        let accounts = (1..=max_account_id)
            .map(|id| (AccountId::new_unchecked(id), AccountState::default()))
            .collect();
        Ledger {
            max_account_id,
            accounts: Mutex::new(accounts),
        }
    }

    pub fn max_account_id(&self) -> i64 {
        self.max_account_id
    }

    /// Check that `id` names an account of this ledger.
    pub fn account_id(&self, id: i64) -> Option<AccountId> {
        (1..=self.max_account_id)
            .contains(&id)
            .then(|| AccountId::new_unchecked(id))
    }

    /// Seed the ledger from storage and return how many accounts were loaded.
    ///
    /// A failing load is logged and returned, and leaves the ledger as it was. Accounts that
    /// were not loaded keep a zero limit and balance.
    pub fn init<B: Backend>(&self, pool: &Pool<B>) -> Result<usize, StorageError> {
        let rows = accounts::load(pool).map_err(|error| {
            error!(%error, "could not load the accounts");
            error
        })?;

        let mut guard = self.lock();
        let mut loaded = 0;
        for row in rows {
            match self.account_id(row.id) {
                Some(id) => {
                    guard.accounts.insert(id, row.state);
                    loaded += 1;
                }
                None => warn!(id = row.id, max = self.max_account_id, "ignoring an account outside the ledger range"),
            }
        }
        if loaded < guard.accounts.len() {
            warn!(
                loaded,
                expected = guard.accounts.len(),
                "some accounts were never loaded and start with a zero limit"
            );
        }
        info!(loaded, "ledger initialized");
        Ok(loaded)
    }

    /// Take the ledger lock to run several operations atomically.
    pub fn lock(&self) -> LedgerGuard<'_> {
        LedgerGuard {
            accounts: self.accounts.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    pub fn read(&self, id: AccountId) -> AccountState {
        self.lock().read(id)
    }

    pub fn credit(&self, id: AccountId, amount: u64) -> i64 {
        self.lock().credit(id, amount)
    }

    pub fn debit(&self, id: AccountId, amount: u64) -> DebitOutcome {
        self.lock().debit(id, amount)
    }
}

/// Exclusive access to the ledger, released when dropped.
pub struct LedgerGuard<'a> {
    accounts: MutexGuard<'a, BTreeMap<AccountId, AccountState>>,
}

impl LedgerGuard<'_> {
    pub fn read(&self, id: AccountId) -> AccountState {
        self.accounts.get(&id).copied().unwrap_or_default()
    }

    /// Add `amount` to the balance. Credits have no ceiling.
    pub fn credit(&mut self, id: AccountId, amount: u64) -> i64 {
        let account = self.accounts.entry(id).or_default();
        account.balance = account.balance.saturating_add_unsigned(amount);
        account.balance
    }

    /// Subtract `amount` from the balance unless that would go below `-limit`.
    pub fn debit(&mut self, id: AccountId, amount: u64) -> DebitOutcome {
        let account = self.accounts.entry(id).or_default();
        match account.balance.checked_sub_unsigned(amount) {
            Some(balance) if balance >= account.limit.saturating_neg() => {
                account.balance = balance;
                DebitOutcome::Committed(balance)
            }
            _ => DebitOutcome::Rejected,
        }
    }

    /// Put back a state read earlier, undoing the changes made since.
    pub fn restore(&mut self, id: AccountId, state: AccountState) {
        self.accounts.insert(id, state);
    }
}

/// Persist the cached balance of an account.
pub fn write_back<B: Backend>(pool: &Pool<B>, id: AccountId, balance: i64) -> Result<(), StorageError> {
    accounts::settle(pool, id, balance)
}
