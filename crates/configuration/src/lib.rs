pub mod configuration;
pub mod connection_settings;
pub mod environment;
pub mod error;
pub mod to_runtime_configuration;
pub mod values;
pub mod version1;

pub use configuration::Configuration;
pub use version1::{
    generate_configuration_schema, parse_configuration, write_parsed_configuration,
    ParsedConfiguration,
};

pub use to_runtime_configuration::make_runtime_configuration;
