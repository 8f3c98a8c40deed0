//! The ledger cache seeded from storage and used from many threads.

pub mod common;

use std::sync::{Arc, Mutex};

use similar_asserts::assert_eq;

use ledger::accounts::AccountState;
use ledger::cache::{DebitOutcome, Ledger};

use common::{backend, connected_pool, FakeDatabase, LIMITS};

#[test]
fn init_loads_every_account() {
    tests_common::init_logging();
    let database = Arc::new(Mutex::new(FakeDatabase::seeded()));
    database.lock().unwrap().accounts.insert(2, (80_000, -500));
    let pool = connected_pool(backend(&database), 1);

    let ledger = Ledger::new(5);
    assert_eq!(ledger.init(&pool), Ok(5));

    let id = ledger.account_id(2).unwrap();
    assert_eq!(ledger.read(id), AccountState { limit: 80_000, balance: -500 });
}

#[test]
fn init_ignores_accounts_outside_the_range() {
    let mut database = FakeDatabase::seeded();
    database.accounts.insert(9, (1, 1));
    database.accounts.remove(&4);
    let database = Arc::new(Mutex::new(database));
    let pool = connected_pool(backend(&database), 1);

    let ledger = Ledger::new(5);
    assert_eq!(ledger.init(&pool), Ok(4));

    // never loaded, so it cannot be debited
    let missing = ledger.account_id(4).unwrap();
    assert_eq!(ledger.read(missing), AccountState::default());
    assert_eq!(ledger.debit(missing, 1), DebitOutcome::Rejected);
}

#[test]
fn a_failed_load_is_reported_and_leaves_the_ledger_empty() {
    let database = Arc::new(Mutex::new(FakeDatabase {
        failing: Some("from accounts"),
        ..FakeDatabase::seeded()
    }));
    let pool = connected_pool(backend(&database), 1);

    let ledger = Ledger::new(5);
    let error = ledger.init(&pool).unwrap_err();
    assert!(error.code.is_error());

    let id = ledger.account_id(1).unwrap();
    assert_eq!(ledger.read(id), AccountState::default());
}

#[test]
fn concurrent_movements_are_never_lost() {
    let ledger = Ledger::new(5);
    let id = ledger.account_id(1).unwrap();
    ledger.lock().restore(id, AccountState { limit: LIMITS[0], balance: 0 });

    let (credited, debited) = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let ledger = &ledger;
                scope.spawn(move || {
                    let mut credited = 0;
                    let mut debited = 0;
                    for step in 0..500_u64 {
                        let amount = 1 + (step * 7 + worker) % 97;
                        if (step + worker) % 3 == 0 {
                            ledger.credit(id, amount);
                            credited += amount;
                        } else if let DebitOutcome::Committed(balance) = ledger.debit(id, amount) {
                            assert!(balance >= -LIMITS[0]);
                            debited += amount;
                        }
                    }
                    (credited, debited)
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .fold((0, 0), |(c, d), (wc, wd)| (c + wc, d + wd))
    });

    let expected = i64::try_from(credited).unwrap() - i64::try_from(debited).unwrap();
    let state = ledger.read(id);
    assert_eq!(state.balance, expected);
    assert!(state.balance >= -state.limit);
}

#[test]
fn debits_race_for_the_last_of_the_limit() {
    let ledger = Ledger::new(1);
    let id = ledger.account_id(1).unwrap();
    ledger.lock().restore(id, AccountState { limit: 100, balance: 0 });

    let committed = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..16)
            .map(|_| scope.spawn(|| ledger.debit(id, 10)))
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .filter(|outcome| matches!(outcome, DebitOutcome::Committed(_)))
            .count()
    });

    assert_eq!(committed, 10);
    assert_eq!(ledger.read(id).balance, -100);
}
