use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Largest `maxAccountId` accepted. The ledger keeps every account in memory.
pub const MAX_ACCOUNT_ID_LIMIT: i64 = 10_000;

/// Settings for the account ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSettings {
    /// Accounts are numbered from 1 up to this id, inclusive.
    #[serde(default = "max_account_id_default")]
    pub max_account_id: i64,
    /// Number of movements listed in a statement.
    #[serde(default = "statement_limit_default")]
    pub statement_limit: i64,
}

impl LedgerSettings {
    pub fn is_default(&self) -> bool {
        self == &LedgerSettings::default()
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            max_account_id: max_account_id_default(),
            statement_limit: statement_limit_default(),
        }
    }
}

fn max_account_id_default() -> i64 {
    5
}

fn statement_limit_default() -> i64 {
    10
}
