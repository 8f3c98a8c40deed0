mod ledger_settings;
mod pool_settings;
mod secret;
mod vendor;

pub use ledger_settings::{LedgerSettings, MAX_ACCOUNT_ID_LIMIT};
pub use pool_settings::PoolSettings;
pub use secret::Secret;
pub use vendor::Vendor;
