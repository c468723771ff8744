// Copyright 2024-2026 user-events-logs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.
//!
//! These commands read configuration directly from environment variables.

use crate::config::{self, EffectiveConfig, DEFAULT_PROVIDER_NAME, DEFAULT_SHUTDOWN_TIMEOUT_MS};
use crate::provider::validate_provider_name;
use crate::telemetry::LogConfig;

/// Print effective config as key-value pairs to stdout.
pub fn run_show() {
    let cfg = config::load().effective_config();
    print_config(&cfg);
}

/// Print effective config as JSON to stdout.
pub fn run_show_json() -> i32 {
    let cfg = config::load().effective_config();
    match serde_json::to_string_pretty(&cfg) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
            1
        }
    }
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    let log = LogConfig::default();
    println!("USER_EVENTS_PROVIDER_NAME={}", DEFAULT_PROVIDER_NAME);
    println!("USER_EVENTS_SHUTDOWN_TIMEOUT_MS={}", DEFAULT_SHUTDOWN_TIMEOUT_MS);
    println!("USER_EVENTS_LOG_LEVEL={}", log.level);
    println!("USER_EVENTS_LOG_FORMAT={}", log.format.as_str());
    println!("USER_EVENTS_LOG_FILE=");
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let cfg = config::load().effective_config();
    let warnings = validate(&cfg);
    for warning in &warnings {
        eprintln!("WARNING: {}", warning);
    }
    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

/// Collect human-readable problems with an effective configuration.
pub fn validate(cfg: &EffectiveConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Err(e) = validate_provider_name(&cfg.provider_name) {
        warnings.push(format!("USER_EVENTS_PROVIDER_NAME: {}", e));
    }

    if cfg.shutdown_timeout_ms == 0 {
        warnings.push("USER_EVENTS_SHUTDOWN_TIMEOUT_MS is 0".to_string());
    }

    if tracing_subscriber::EnvFilter::try_new(&cfg.log_level).is_err() {
        warnings.push(format!("USER_EVENTS_LOG_LEVEL is not a valid filter: {}", cfg.log_level));
    }

    warnings
}

fn print_config(cfg: &EffectiveConfig) {
    println!("USER_EVENTS_PROVIDER_NAME={}", cfg.provider_name);
    println!("USER_EVENTS_SHUTDOWN_TIMEOUT_MS={}", cfg.shutdown_timeout_ms);
    println!("USER_EVENTS_LOG_LEVEL={}", cfg.log_level);
    println!("USER_EVENTS_LOG_FORMAT={}", cfg.log_format);
    println!("USER_EVENTS_LOG_FILE={}", cfg.log_file.as_deref().unwrap_or(""));
    for tracepoint in &cfg.tracepoints {
        println!("tracepoint={}", tracepoint);
    }
}
