//! Pool lifecycle against a scripted backend.

use std::time::Duration;

use query_engine_execution::{Pool, PoolError, PoolStatus};
use query_engine_sql::sql::ErrorCode;
use similar_asserts::assert_eq;
use tests_common::logging::init_logging;
use tests_common::mock::{credentials, HandshakeScript, MockBackend};

fn poll_until_terminal(pool: &Pool<MockBackend>) -> PoolStatus {
    for _ in 0..1_000 {
        let status = pool.poll_status();
        if status.is_terminal() {
            return status;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    pool.status()
}

#[test]
fn create_rejects_an_empty_pool() {
    let error = Pool::create(MockBackend::new(), 0, credentials()).unwrap_err();
    assert!(matches!(error, PoolError::InvalidConfig(_)));
    assert_eq!(error.code(), ErrorCode::InvalidDb);
}

#[test]
fn create_rejects_missing_settings() {
    let mut credentials = credentials();
    credentials.host = String::new();
    credentials.user = String::new();
    let error = Pool::create(MockBackend::new(), 2, credentials).unwrap_err();
    assert_eq!(
        error.to_string(),
        "invalid pool configuration: missing connection settings: host, user"
    );
}

#[test]
fn create_opens_nothing() {
    let backend = MockBackend::new();
    let pool = Pool::create(backend.clone(), 3, credentials()).unwrap();
    assert_eq!(pool.status(), PoolStatus::NotConnected);
    assert_eq!(pool.available(), 0);
    assert_eq!(backend.open_connections(), 0);
    assert!(pool.acquire().is_none());
}

#[test]
fn single_connection_pool_is_connected_at_once() {
    init_logging();
    let pool = Pool::create(MockBackend::new(), 1, credentials()).unwrap();
    pool.connect().unwrap();
    assert_eq!(pool.status(), PoolStatus::Connected);
    assert_eq!(pool.available(), 1);
}

#[test]
fn remaining_connections_arrive_through_polling() {
    init_logging();
    let backend = MockBackend::new();
    backend.script_handshakes([
        HandshakeScript::SucceedAfter(2),
        HandshakeScript::SucceedAfter(0),
        HandshakeScript::SucceedAfter(5),
    ]);
    let pool = Pool::create(backend.clone(), 4, credentials()).unwrap();

    pool.connect().unwrap();
    assert_eq!(pool.status(), PoolStatus::Connecting);
    assert_eq!(pool.available(), 1);
    assert!(matches!(pool.connect(), Err(PoolError::AlreadyConnecting)));

    assert_eq!(pool.poll_status(), PoolStatus::Connecting);
    assert_eq!(pool.available(), 2);

    assert_eq!(poll_until_terminal(&pool), PoolStatus::Connected);
    assert_eq!(pool.available(), 4);
    assert_eq!(backend.open_connections(), 4);

    // connecting again is a no-op
    pool.connect().unwrap();
    assert_eq!(backend.open_connections(), 4);
}

#[test]
fn connections_are_usable_while_connecting() {
    let backend = MockBackend::new();
    backend.script_handshakes([HandshakeScript::SucceedAfter(100)]);
    let pool = Pool::create(backend, 2, credentials()).unwrap();
    pool.connect().unwrap();

    assert_eq!(pool.status(), PoolStatus::Connecting);
    assert!(pool.acquire().is_some());
}

#[test]
fn one_failed_handshake_fails_the_pool() {
    init_logging();
    let backend = MockBackend::new();
    backend.script_handshakes([
        HandshakeScript::SucceedAfter(0),
        HandshakeScript::FailAfter(1),
    ]);
    let pool = Pool::create(backend, 3, credentials()).unwrap();
    pool.connect().unwrap();

    assert_eq!(poll_until_terminal(&pool), PoolStatus::FailedConnection);
    assert_eq!(pool.poll_status(), PoolStatus::FailedConnection);
}

#[test]
fn failed_first_connection_is_reported() {
    init_logging();
    let backend = MockBackend::new();
    backend.fail_connect();
    let pool = Pool::create(backend.clone(), 2, credentials()).unwrap();

    let error = pool.connect().unwrap_err();
    assert_eq!(error.code(), ErrorCode::ConnectionError);
    assert!(error.to_string().contains("password authentication failed"));
    assert_eq!(pool.status(), PoolStatus::FailedConnection);
    assert_eq!(backend.open_connections(), 0);
}

#[test]
fn exhausted_pool_hands_out_nothing() {
    init_logging();
    let pool = Pool::create(MockBackend::new(), 2, credentials()).unwrap();
    pool.connect().unwrap();
    assert_eq!(poll_until_terminal(&pool), PoolStatus::Connected);

    let first = pool.acquire().unwrap();
    let second = pool.acquire().unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(pool.available(), 0);
    assert!(pool.acquire().is_none());

    first.release();
    assert_eq!(pool.available(), 1);
    let third = pool.acquire().unwrap();
    assert_ne!(third.id, second.id);
}

#[test]
fn destroy_closes_idle_connections_and_late_releases() {
    init_logging();
    let backend = MockBackend::new();
    let pool = Pool::create(backend.clone(), 3, credentials()).unwrap();
    pool.connect().unwrap();
    assert_eq!(poll_until_terminal(&pool), PoolStatus::Connected);

    let held = pool.acquire().unwrap();
    pool.destroy();
    assert_eq!(pool.status(), PoolStatus::Invalid);
    assert_eq!(pool.available(), 0);
    assert_eq!(backend.open_connections(), 1);

    drop(held);
    assert_eq!(backend.open_connections(), 0);
    assert_eq!(pool.available(), 0);

    assert!(matches!(pool.connect(), Err(PoolError::Destroyed)));
    // destroying twice is harmless
    pool.destroy();
    assert_eq!(backend.closed_connections(), 3);
}

#[test]
fn dropping_the_pool_closes_its_connections() {
    let backend = MockBackend::new();
    {
        let pool = Pool::create(backend.clone(), 2, credentials()).unwrap();
        pool.connect().unwrap();
        assert_eq!(poll_until_terminal(&pool), PoolStatus::Connected);
    }
    assert_eq!(backend.open_connections(), 0);
}

#[test]
fn pool_stays_connecting_until_the_first_connection_is_open() {
    init_logging();
    let backend = MockBackend::new();
    let held = backend.hold_next_connect();
    let pool = Pool::create(backend.clone(), 1, credentials()).unwrap();

    std::thread::scope(|scope| {
        let connecting = scope.spawn(|| pool.connect());
        held.wait_until_started();
        assert_eq!(pool.poll_status(), PoolStatus::Connecting);
        assert!(matches!(pool.connect(), Err(PoolError::AlreadyConnecting)));
        assert!(pool.acquire().is_none());
        held.release();
        connecting.join().unwrap().unwrap();
    });

    assert_eq!(pool.poll_status(), PoolStatus::Connected);
    assert_eq!(pool.available(), 1);
}

#[test]
fn destroy_during_the_first_connection_wins() {
    init_logging();
    let backend = MockBackend::new();
    let held = backend.hold_next_connect();
    let pool = Pool::create(backend.clone(), 3, credentials()).unwrap();

    let result = std::thread::scope(|scope| {
        let connecting = scope.spawn(|| pool.connect());
        held.wait_until_started();
        pool.destroy();
        held.release();
        connecting.join().unwrap()
    });

    assert!(matches!(result, Err(PoolError::Destroyed)));
    assert_eq!(pool.status(), PoolStatus::Invalid);
    assert_eq!(pool.available(), 0);
    assert_eq!(backend.closed_connections(), 1);
}
