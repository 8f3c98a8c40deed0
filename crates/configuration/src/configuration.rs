//! Configuration for the ledger service.

use query_engine_execution::Credentials;

use crate::values::{LedgerSettings, PoolSettings, Vendor};

/// The 'Configuration' type collects all the information necessary to serve requests at runtime.
///
/// Values of this type are produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration', which resolves every secret against an environment.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub vendor: Vendor,
    pub credentials: Credentials,
    pub pool_settings: PoolSettings,
    pub ledger: LedgerSettings,
}
