use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ledger::service::TransactionOutcome;
use ledger::state::{self, EXIT_INVALID_CONFIGURATION};
use ledger::transaction::Movement;
use ledger_configuration::environment::ProcessEnvironment;
use ledger_configuration::error::{MakeRuntimeConfigurationError, ParseConfigurationError};
use ledger_configuration::values::Vendor;
use ledger_configuration::{
    generate_configuration_schema, make_runtime_configuration, parse_configuration,
    write_parsed_configuration, Configuration, ParsedConfiguration,
};
use query_engine_execution::postgres::PostgresBackend;
use query_engine_execution::Backend;
use query_engine_sql::sql::Value;

const SQL_SCHEMA: &str = include_str!("../sql/schema.sql");

/// Exit code for a debit refused by the overdraft limit.
const EXIT_REJECTED: u8 = 3;

/// Query a ledger database and move money between its accounts.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory holding configuration.json. Without it, every setting comes from DB_* variables.
    #[arg(long, env = "LEDGER_CONFIGURATION")]
    configuration: Option<PathBuf>,
    /// Number of connections to open, overriding the configuration.
    #[arg(long, env = "SERVER_DB_CONNS")]
    connections: Option<usize>,
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
    /// Print the Prometheus metrics to stderr before exiting.
    #[arg(long)]
    metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the balance and the latest movements of an account.
    Statement { account: i64 },
    /// Apply a JSON transaction such as {"amount": 100, "direction": "d", "description": "rent"}.
    Transact { account: i64, body: String },
    /// Run a query with positional string parameters.
    Query {
        sql: String,
        params: Vec<String>,
        /// Print the rows as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Write an initial configuration directory.
    InitConfig { dir: PathBuf },
    /// Print the JSON schema of the configuration file.
    ConfigSchema,
    /// Print the SQL the ledger expects to find in the database.
    SqlSchema,
}

pub fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::from(exit_code_for(&error))
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn exit_code_for(error: &anyhow::Error) -> u8 {
    if let Some(error) = error.downcast_ref::<state::InitializationError>() {
        error.exit_code()
    } else if error.is::<ParseConfigurationError>() || error.is::<MakeRuntimeConfigurationError>() {
        EXIT_INVALID_CONFIGURATION
    } else {
        1
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Command::InitConfig { dir } => {
            write_parsed_configuration(&ParsedConfiguration::initial(), dir)
                .with_context(|| format!("writing {}", dir.display()))?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::ConfigSchema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&generate_configuration_schema())?
            );
            return Ok(ExitCode::SUCCESS);
        }
        Command::SqlSchema => {
            print!("{SQL_SCHEMA}");
            return Ok(ExitCode::SUCCESS);
        }
        Command::Statement { .. } | Command::Transact { .. } | Command::Query { .. } => {}
    }

    let configuration = load_configuration(&cli)?;
    info!(vendor = configuration.vendor.name(), "using database vendor");
    match configuration.vendor {
        Vendor::Postgres => run_against(PostgresBackend, cli, &configuration),
    }
}

fn run_against<B: Backend>(
    backend: B,
    cli: Cli,
    configuration: &Configuration,
) -> anyhow::Result<ExitCode> {
    let mut registry = prometheus::Registry::new();
    let state = state::create_state(backend, configuration, &mut registry)?;
    let bank = &state.bank;

    let code = match cli.command {
        Command::Statement { account } => {
            let statement = bank.statement(bank.account_id(account)?)?;
            println!("{}", serde_json::to_string_pretty(&statement)?);
            ExitCode::SUCCESS
        }
        Command::Transact { account, body } => {
            let id = bank.account_id(account)?;
            let movement: Movement = body.parse()?;
            match bank.transact(id, &movement)? {
                TransactionOutcome::Completed(balance) => {
                    println!("{}", serde_json::to_string_pretty(&balance)?);
                    ExitCode::SUCCESS
                }
                TransactionOutcome::Rejected => {
                    eprintln!("transaction rejected: the overdraft limit would be exceeded");
                    ExitCode::from(EXIT_REJECTED)
                }
            }
        }
        Command::Query { sql, params, json } => {
            let params: Vec<Value> = params.into_iter().map(Value::String).collect();
            let result = query_engine_execution::execute(bank.pool(), &sql, &params);
            if json {
                let output = serde_json::json!({
                    "code": result.code(),
                    "message": result.message(),
                    "fields": result.fields(),
                    "rows": result.to_json_rows(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{result}");
            }
            if result.code().is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Command::InitConfig { .. } | Command::ConfigSchema | Command::SqlSchema => ExitCode::SUCCESS,
    };

    if cli.metrics {
        let metrics = prometheus::TextEncoder::new().encode_to_string(&registry.gather())?;
        eprint!("{metrics}");
    }
    Ok(code)
}

fn load_configuration(cli: &Cli) -> anyhow::Result<Configuration> {
    let mut parsed = match &cli.configuration {
        Some(dir) => parse_configuration(dir)?,
        None => ParsedConfiguration::initial(),
    };
    if let Some(connections) = cli.connections {
        parsed.pool_settings.connections = connections;
    }
    Ok(make_runtime_configuration(parsed, ProcessEnvironment)?)
}
