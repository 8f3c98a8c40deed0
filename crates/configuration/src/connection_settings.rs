//! Database connection settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::values::Secret;

pub const DEFAULT_HOST_VARIABLE: &str = "DB_HOST";
pub const DEFAULT_PORT_VARIABLE: &str = "DB_PORT";
pub const DEFAULT_DATABASE_VARIABLE: &str = "DB_DATABASE";
pub const DEFAULT_USER_VARIABLE: &str = "DB_USER";
pub const DEFAULT_PASSWORD_VARIABLE: &str = "DB_PASSWORD";
pub const DEFAULT_ROLE_VARIABLE: &str = "DB_ROLE";

/// Database connection settings.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConnectionSettings {
    /// Host name or address of the database server.
    pub host: Secret,
    /// Port of the database server. Defaults to the vendor's port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Secret>,
    /// Name of the database.
    pub database: Secret,
    /// Login user.
    pub user: Secret,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    /// Role to assume after logging in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Secret>,
}

impl DatabaseConnectionSettings {
    /// Read every setting from the `DB_*` environment variables.
    pub fn empty() -> Self {
        Self {
            host: Secret::from_environment(DEFAULT_HOST_VARIABLE),
            port: Some(Secret::from_environment(DEFAULT_PORT_VARIABLE)),
            database: Secret::from_environment(DEFAULT_DATABASE_VARIABLE),
            user: Secret::from_environment(DEFAULT_USER_VARIABLE),
            password: Some(Secret::from_environment(DEFAULT_PASSWORD_VARIABLE)),
            role: Some(Secret::from_environment(DEFAULT_ROLE_VARIABLE)),
        }
    }
}
