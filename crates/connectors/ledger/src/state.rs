//! Transient state used by the service.
//!
//! This is initialized on startup.

use std::time::Instant;

use thiserror::Error;
use tracing::{error, info, info_span};

use ledger_configuration::Configuration;
use query_engine_execution::metrics::Metrics;
use query_engine_execution::{Backend, Pool, PoolError, PoolStatus};
use query_engine_sql::sql::ErrorCode;

use crate::cache::Ledger;
use crate::service::Bank;

/// Exit code for a configuration that cannot work.
pub const EXIT_INVALID_CONFIGURATION: u8 = 2;
/// Exit code for a database that cannot be reached.
pub const EXIT_CONNECTION_FAILED: u8 = 1;

/// State for our service.
pub struct State<B: Backend> {
    pub bank: Bank<B>,
    pub metrics: Metrics,
}

/// Create a connection pool, wait for it to connect and seed the ledger.
///
/// A ledger that fails to load is logged and the service starts anyway.
pub fn create_state<B: Backend>(
    backend: B,
    configuration: &Configuration,
    metrics_registry: &mut prometheus::Registry,
) -> Result<State<B>, InitializationError> {
    let metrics = {
        let _enter = info_span!("Setup metrics").entered();
        Metrics::initialize(metrics_registry).map_err(InitializationError::MetricsError)?
    };

    let pool = {
        let _enter = info_span!("Create connection pool").entered();
        let pool = Pool::create(
            backend,
            configuration.pool_settings.connections,
            configuration.credentials.clone(),
        )?
        .with_metrics(metrics.clone());
        pool.connect()?;
        wait_for_connections(&pool, configuration)?;
        pool
    };

    let ledger = Ledger::new(configuration.ledger.max_account_id);
    if let Err(error) = ledger.init(&pool) {
        error!(%error, "starting with an empty ledger");
    }

    Ok(State {
        bank: Bank::new(pool, ledger, configuration.ledger.statement_limit),
        metrics,
    })
}

fn wait_for_connections<B: Backend>(
    pool: &Pool<B>,
    configuration: &Configuration,
) -> Result<(), InitializationError> {
    let settings = &configuration.pool_settings;
    let deadline = Instant::now() + settings.handshake_timeout();
    loop {
        match pool.poll_status() {
            PoolStatus::Connected => {
                info!(connections = pool.capacity(), "connections up");
                return Ok(());
            }
            PoolStatus::Connecting if Instant::now() < deadline => {
                std::thread::sleep(settings.poll_interval());
            }
            PoolStatus::Connecting => {
                return Err(InitializationError::ConnectTimeout(settings.handshake_timeout_ms));
            }
            status => return Err(InitializationError::UnableToConnect(status)),
        }
    }
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("unable to initialize connection pool: {0}")]
    UnableToCreatePool(#[from] PoolError),
    #[error("error initializing metrics: {0}")]
    MetricsError(prometheus::Error),
    #[error("the connection pool ended in state {0:?}")]
    UnableToConnect(PoolStatus),
    #[error("the connection pool was not connected after {0}ms")]
    ConnectTimeout(u64),
}

impl InitializationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            InitializationError::UnableToCreatePool(error) => error.code(),
            InitializationError::MetricsError(_) => ErrorCode::Fatal,
            InitializationError::UnableToConnect(PoolStatus::Invalid) => ErrorCode::InvalidDb,
            InitializationError::UnableToConnect(_) | InitializationError::ConnectTimeout(_) => {
                ErrorCode::ConnectionError
            }
        }
    }

    pub fn exit_code(&self) -> u8 {
        if self.code() == ErrorCode::InvalidDb {
            EXIT_INVALID_CONFIGURATION
        } else {
            EXIT_CONNECTION_FAILED
        }
    }
}
