//! Convert a parsed configuration into the one used at runtime.

use query_engine_execution::Credentials;

use crate::configuration::Configuration;
use crate::environment::Environment;
use crate::error::MakeRuntimeConfigurationError;
use crate::values::{Secret, MAX_ACCOUNT_ID_LIMIT};
use crate::version1::ParsedConfiguration;

/// Resolve every secret and check the values that can be checked without a database.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    let connection = &parsed_config.connection;
    let host = required(&connection.host, "connection.host", &environment)?;
    let database = required(&connection.database, "connection.database", &environment)?;
    let user = required(&connection.user, "connection.user", &environment)?;
    let password = optional(connection.password.as_ref(), "connection.password", &environment)?;
    let role = optional(connection.role.as_ref(), "connection.role", &environment)?;

    let port = match optional(connection.port.as_ref(), "connection.port", &environment)? {
        Some(port) if !port.is_empty() => {
            port.parse::<u16>()
                .map_err(|error| MakeRuntimeConfigurationError::InvalidValue {
                    attribute: "connection.port",
                    message: format!("{port:?}: {error}"),
                })?
        }
        _ => parsed_config.vendor.default_port(),
    };

    let pool_settings = parsed_config.pool_settings;
    if pool_settings.connections < 1 {
        return Err(MakeRuntimeConfigurationError::InvalidValue {
            attribute: "poolSettings.connections",
            message: "at least one connection is required".to_string(),
        });
    }
    let ledger = parsed_config.ledger;
    if ledger.max_account_id < 1 || ledger.statement_limit < 1 {
        return Err(MakeRuntimeConfigurationError::InvalidValue {
            attribute: "ledger",
            message: "maxAccountId and statementLimit must be positive".to_string(),
        });
    }
    if ledger.max_account_id > MAX_ACCOUNT_ID_LIMIT {
        return Err(MakeRuntimeConfigurationError::InvalidValue {
            attribute: "ledger.maxAccountId",
            message: format!(
                "{} is more accounts than the ledger holds, the limit is {MAX_ACCOUNT_ID_LIMIT}",
                ledger.max_account_id
            ),
        });
    }

    Ok(Configuration {
        vendor: parsed_config.vendor,
        credentials: Credentials {
            host,
            port,
            database,
            user,
            password: password.unwrap_or_default(),
            role: role.unwrap_or_default(),
            connect_timeout: Some(pool_settings.connect_timeout()),
        },
        pool_settings,
        ledger,
    })
}

fn required(
    secret: &Secret,
    attribute: &'static str,
    environment: impl Environment,
) -> Result<String, MakeRuntimeConfigurationError> {
    secret.resolve(environment).map_err(|source| {
        MakeRuntimeConfigurationError::MissingEnvironmentVariable { attribute, source }
    })
}

fn optional(
    secret: Option<&Secret>,
    attribute: &'static str,
    environment: impl Environment,
) -> Result<Option<String>, MakeRuntimeConfigurationError> {
    match secret {
        None => Ok(None),
        Some(secret) => secret.resolve_optional(environment).map_err(|source| {
            MakeRuntimeConfigurationError::MissingEnvironmentVariable { attribute, source }
        }),
    }
}
