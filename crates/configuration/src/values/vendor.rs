use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use query_engine_execution::postgres;

/// The database products we can talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Vendor {
    #[default]
    #[serde(alias = "postgres15")]
    Postgres,
}

impl Vendor {
    pub fn default_port(self) -> u16 {
        match self {
            Vendor::Postgres => postgres::DEFAULT_PORT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Vendor::Postgres => postgres::VENDOR_NAME,
        }
    }
}
