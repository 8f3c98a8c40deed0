//! A fake ledger database answering the queries the service sends.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use ledger::accounts::{LOAD_ACCOUNTS, SETTLE_BALANCE};
use ledger::cache::Ledger;
use ledger::movements::{RECENT_MOVEMENTS, RECORD_MOVEMENT};
use ledger::service::Bank;
use query_engine_execution::{Pool, PoolStatus};
use query_engine_sql::sql::{ErrorCode, ResultSet, Value};
use query_engine_translation::translation::params::WireParam;
use tests_common::mock::{credentials, MockBackend};

pub const LIMITS: [i64; 5] = [100_000, 80_000, 1_000_000, 10_000_000, 500_000];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMovement {
    pub account: i64,
    pub is_credit: bool,
    pub amount: i64,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct FakeDatabase {
    /// id to (limit, balance)
    pub accounts: BTreeMap<i64, (i64, i64)>,
    pub movements: Vec<StoredMovement>,
    /// Queries containing this text fail with a fatal status.
    pub failing: Option<&'static str>,
}

impl FakeDatabase {
    pub fn seeded() -> Self {
        FakeDatabase {
            accounts: (1..=5).zip(LIMITS).map(|(id, limit)| (id, (limit, 0))).collect(),
            ..FakeDatabase::default()
        }
    }

    fn answer(&mut self, query: &str, params: &[WireParam]) -> ResultSet {
        if let Some(failing) = self.failing {
            if query.contains(failing) {
                return ResultSet::new(
                    ErrorCode::Fatal,
                    "Fatal error. (Mock 1): ERROR:  canceling statement due to user request",
                );
            }
        }

        let text = |index: usize| params[index].as_text().unwrap_or_default().to_string();
        let int = |index: usize| text(index).parse::<i64>().unwrap();
        let ok = "Query executed successfully. (Mock 1)";

        match query {
            LOAD_ACCOUNTS => {
                let mut result = ResultSet::with_fields(
                    vec!["id".into(), "account_limit".into(), "balance".into()],
                    ErrorCode::Ok,
                    ok,
                );
                for (id, (limit, balance)) in &self.accounts {
                    result.push_row(vec![Value::Int(*id), Value::Int(*limit), Value::Int(*balance)]);
                }
                result
            }
            SETTLE_BALANCE => {
                if let Some(account) = self.accounts.get_mut(&int(0)) {
                    account.1 = int(1);
                }
                ResultSet::new(ErrorCode::Ok, ok)
            }
            RECORD_MOVEMENT => {
                self.movements.push(StoredMovement {
                    account: int(0),
                    is_credit: text(1) == "true",
                    amount: int(2),
                    description: text(3),
                });
                ResultSet::new(ErrorCode::Ok, ok)
            }
            RECENT_MOVEMENTS => {
                let account = int(0);
                let limit = usize::try_from(int(1)).unwrap();
                let mut result = ResultSet::with_fields(
                    vec![
                        "amount".into(),
                        "is_credit".into(),
                        "description".into(),
                        "performed_at".into(),
                    ],
                    ErrorCode::Ok,
                    ok,
                );
                let rows = self
                    .movements
                    .iter()
                    .enumerate()
                    .rev()
                    .filter(|(_, movement)| movement.account == account)
                    .take(limit);
                for (sequence, movement) in rows {
                    result.push_row(vec![
                        Value::Int(movement.amount),
                        Value::Bool(movement.is_credit),
                        Value::String(movement.description.clone()),
                        Value::String(format!("2024-02-01 12:00:{sequence:02}+00")),
                    ]);
                }
                result
            }
            _ => ResultSet::new(
                ErrorCode::Fatal,
                format!("Fatal error. (Mock 1): ERROR:  unexpected query {query}"),
            ),
        }
    }
}

/// A mock backend answering from `database`.
pub fn backend(database: &Arc<Mutex<FakeDatabase>>) -> MockBackend {
    let backend = MockBackend::new();
    let database = Arc::clone(database);
    backend.respond_with(move |query, params| {
        database
            .lock()
            .unwrap()
            .answer(query, params)
    });
    backend
}

pub fn connected_pool(backend: MockBackend, capacity: usize) -> Pool<MockBackend> {
    let pool = Pool::create(backend, capacity, credentials()).unwrap();
    pool.connect().unwrap();
    while !pool.poll_status().is_terminal() {
        std::thread::yield_now();
    }
    assert_eq!(pool.status(), PoolStatus::Connected);
    pool
}

/// A bank over a seeded fake database, with its ledger loaded.
pub fn bank(database: &Arc<Mutex<FakeDatabase>>, capacity: usize) -> Bank<MockBackend> {
    tests_common::init_logging();
    let pool = connected_pool(backend(database), capacity);
    let ledger = Ledger::new(5);
    ledger.init(&pool).unwrap();
    Bank::new(pool, ledger, 10)
}
