//! Errors that can be thrown when processing configuration.

use std::path::PathBuf;

use crate::environment;

/// The errors that can be thrown when parsing a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {file_path}:{line}:{column}: {message}")]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("unsupported configuration version {0}")]
    UnsupportedVersion(u32),
    #[error("I/O error: {0}")]
    IoErrorButStringified(String),
}

/// The errors that can be thrown when writing a configuration directory.
#[derive(Debug, thiserror::Error)]
pub enum WriteParsedConfigurationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// The errors that can be thrown when turning a parsed configuration into a runtime one.
#[derive(Debug, thiserror::Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("missing environment variable when processing {attribute}: {source}")]
    MissingEnvironmentVariable {
        attribute: &'static str,
        #[source]
        source: environment::Error,
    },
    #[error("invalid value for {attribute}: {message}")]
    InvalidValue {
        attribute: &'static str,
        message: String,
    },
}
