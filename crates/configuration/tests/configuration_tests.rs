//! Reading and writing configuration directories.

use std::collections::HashMap;

use similar_asserts::assert_eq;

use ledger_configuration::environment::Variable;
use ledger_configuration::error::ParseConfigurationError;
use ledger_configuration::values::Secret;
use ledger_configuration::{
    make_runtime_configuration, parse_configuration, write_parsed_configuration,
    ParsedConfiguration,
};
use tests_common::deployment::get_path_from_project_root;

const STATIC_CONFIGURATION_PATH: &str = "static";

#[test]
fn checked_in_configuration_parses() {
    let parsed = parse_configuration(get_path_from_project_root(STATIC_CONFIGURATION_PATH))
        .expect("parse_configuration");

    assert_eq!(parsed.connection.database, Secret::Plain("ledger".to_string()));
    assert_eq!(parsed.pool_settings.connections, 8);

    let environment = HashMap::from([
        (Variable::from("DB_HOST"), "localhost".to_string()),
        (Variable::from("DB_USER"), "admin".to_string()),
    ]);
    let configuration =
        make_runtime_configuration(parsed, &environment).expect("make_runtime_configuration");
    assert_eq!(configuration.credentials.port, 5432);
    assert_eq!(configuration.credentials.password, "");
    assert_eq!(configuration.ledger.statement_limit, 10);
}

#[test]
fn written_configuration_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut parsed = ParsedConfiguration::initial();
    parsed.connection.host = "db.internal".into();
    parsed.pool_settings.connections = 16;

    write_parsed_configuration(&parsed, dir.path()).unwrap();

    assert!(dir.path().join("schema.json").exists());
    assert_eq!(parse_configuration(dir.path()).unwrap(), parsed);
}

#[test]
fn parse_errors_point_at_the_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("configuration.json"),
        "{\n  \"version\": 1,\n  \"connection\": 7\n}\n",
    )
    .unwrap();

    match parse_configuration(dir.path()) {
        Err(ParseConfigurationError::ParseError {
            file_path, line, ..
        }) => {
            assert!(file_path.ends_with("configuration.json"));
            assert_eq!(line, 3);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn other_versions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut value = serde_json::to_value(ParsedConfiguration::initial()).unwrap();
    value["version"] = serde_json::json!(2);
    std::fs::write(dir.path().join("configuration.json"), value.to_string()).unwrap();

    assert!(matches!(
        parse_configuration(dir.path()),
        Err(ParseConfigurationError::UnsupportedVersion(2))
    ));
}

#[test]
fn missing_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = parse_configuration(dir.path().join("nowhere"));
    assert!(matches!(
        result,
        Err(ParseConfigurationError::IoErrorButStringified(_))
    ));
}
