//! user-events-logs operator CLI.
//!
//! ## Subcommands
//!
//! - `config show|json|defaults|validate` - Inspect configuration
//! - `tracepoints` - List the tracepoint names that will be registered
//! - `emit` - Dry-run a record through the export path and print the event,
//!   or write it to the kernel tracepoint with `--live`

use std::process::ExitCode;

use user_events_logs::cli::{config_cmd, run_emit, run_tracepoints};
use user_events_logs::config;
use user_events_logs::telemetry::{self, metrics};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    let env = config::load();
    if let Err(e) = telemetry::init_logging(&env.logging) {
        eprintln!("Logging disabled: {}", e);
    }
    metrics::describe_metrics();

    match command {
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    config_cmd::run_show();
                    ExitCode::SUCCESS
                }
                "json" => ExitCode::from(config_cmd::run_show_json() as u8),
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => ExitCode::from(config_cmd::run_validate() as u8),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_usage();
                    ExitCode::FAILURE
                }
            }
        }
        "tracepoints" => ExitCode::from(run_tracepoints() as u8),
        "emit" => ExitCode::from(run_emit(&args[2..]) as u8),
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("user-events-logs {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "user-events-logs v{}

USAGE:
    user-events-logs-cli [COMMAND] [OPTIONS]

COMMANDS:
    config       Show or validate configuration (show, json, defaults, validate)
    tracepoints  List tracepoint names for the configured provider
    emit         Dry-run one record and print the written event
    version      Show version information
    help         Show this help message

EMIT OPTIONS:
    -l, --level LEVEL     verbose, info, warn, error or critical (default: info)
    -m, --message TEXT    Record body (required)
    --name NAME           Event name (default: Log)
    --attr KEY=VALUE      Attribute, may be repeated
    --live                Write to the kernel tracepoint (Linux) and print the report

ENVIRONMENT:
    USER_EVENTS_PROVIDER_NAME        Provider / tracepoint prefix (default: opentelemetry_logs)
    USER_EVENTS_SHUTDOWN_TIMEOUT_MS  Shutdown timeout (default: 5000)
    USER_EVENTS_LOG_LEVEL            Diagnostics filter (default: warn)
    USER_EVENTS_LOG_FORMAT           json or pretty (default: json)
    USER_EVENTS_LOG_FILE             Append diagnostics to a file (default: stderr)

EXIT CODES:
    0  Success
    1  Failure
    2  Usage error",
        version
    );
}
