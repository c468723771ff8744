// Copyright 2024-2026 user-events-logs Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for the exporter's operator commands.
//!
//! Nothing here talks to a running process. Commands read configuration
//! from the environment and, for `emit`, run a dry export through the
//! in-process provider.
//!
//! ## Usage
//!
//! ```bash
//! user-events-logs-cli config show     # Effective configuration
//! user-events-logs-cli tracepoints     # Channel names that will be registered
//! user-events-logs-cli emit --level error --message "boom"
//! ```

pub mod config_cmd;
pub mod emit_cmd;

pub use emit_cmd::{parse_emit_args, run_emit, run_tracepoints, EmitArgs};
