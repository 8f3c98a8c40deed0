//! The version 1 configuration format and its files on disk.

use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::connection_settings::DatabaseConnectionSettings;
use crate::error::{ParseConfigurationError, WriteParsedConfigurationError};
use crate::values::{LedgerSettings, PoolSettings, Vendor};

const CURRENT_VERSION: u32 = 1;
pub const CONFIGURATION_FILENAME: &str = "configuration.json";
const CONFIGURATION_JSONSCHEMA_FILENAME: &str = "schema.json";

/// Initial configuration, just enough to connect to a database and serve the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    // Which version of the configuration format are we using
    pub version: u32,
    #[serde(default)]
    pub vendor: Vendor,
    pub connection: DatabaseConnectionSettings,
    #[serde(skip_serializing_if = "PoolSettings::is_default")]
    #[serde(default)]
    pub pool_settings: PoolSettings,
    #[serde(skip_serializing_if = "LedgerSettings::is_default")]
    #[serde(default)]
    pub ledger: LedgerSettings,
}

impl ParsedConfiguration {
    /// A configuration that reads its connection settings from the `DB_*` variables.
    pub fn initial() -> Self {
        ParsedConfiguration {
            version: CURRENT_VERSION,
            vendor: Vendor::default(),
            connection: DatabaseConnectionSettings::empty(),
            pool_settings: PoolSettings::default(),
            ledger: LedgerSettings::default(),
        }
    }
}

/// Parse the configuration format from a directory.
pub fn parse_configuration(
    configuration_dir: impl AsRef<Path>,
) -> Result<ParsedConfiguration, ParseConfigurationError> {
    let configuration_file = configuration_dir.as_ref().join(CONFIGURATION_FILENAME);

    let configuration_file_contents = fs::read_to_string(&configuration_file).map_err(|err| {
        ParseConfigurationError::IoErrorButStringified(format!(
            "{}: {}",
            &configuration_file.display(),
            err
        ))
    })?;

    let parsed_config: ParsedConfiguration = serde_json::from_str(&configuration_file_contents)
        .map_err(|error| ParseConfigurationError::ParseError {
            file_path: configuration_file.clone(),
            line: error.line(),
            column: error.column(),
            message: error.to_string(),
        })?;

    if parsed_config.version != CURRENT_VERSION {
        return Err(ParseConfigurationError::UnsupportedVersion(
            parsed_config.version,
        ));
    }

    Ok(parsed_config)
}

/// Write the parsed configuration, and the JSON schema describing it, into a directory on disk.
pub fn write_parsed_configuration(
    parsed_config: &ParsedConfiguration,
    out_dir: impl AsRef<Path>,
) -> Result<(), WriteParsedConfigurationError> {
    let configuration_file = out_dir.as_ref().join(CONFIGURATION_FILENAME);
    fs::create_dir_all(out_dir.as_ref())?;

    fs::write(
        configuration_file,
        serde_json::to_string_pretty(parsed_config)
            .map_err(|e| WriteParsedConfigurationError::IoError(e.into()))?
            + "\n",
    )?;

    let configuration_jsonschema_file_path =
        out_dir.as_ref().join(CONFIGURATION_JSONSCHEMA_FILENAME);
    fs::write(
        &configuration_jsonschema_file_path,
        serde_json::to_string_pretty(&generate_configuration_schema())
            .map_err(|e| WriteParsedConfigurationError::IoError(e.into()))?
            + "\n",
    )?;

    Ok(())
}

/// The JSON schema of the configuration file.
pub fn generate_configuration_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(ParsedConfiguration)
}
