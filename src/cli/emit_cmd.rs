// Copyright 2024-2026 user-events-logs Contributors
// SPDX-License-Identifier: Apache-2.0

//! `tracepoints` and `emit` subcommands.
//!
//! `emit` pushes a single record through the full export path using the
//! in-process provider with the target channel enabled, then prints the
//! event that was written. Useful to check what a consumer would receive.
//! With `--live` (Linux only) the record goes to the kernel tracepoint
//! instead and the batch report is printed.

use crate::config;
use crate::exporter::UserEventsExporter;
use crate::provider::{MemoryProvider, Provider};
use crate::record::event::TraceEvent;
use crate::record::LogRecord;
use crate::severity::Level;

/// Parsed arguments of `emit`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitArgs {
    pub level: Level,
    pub message: String,
    pub event_name: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub live: bool,
}

/// Parse `emit` arguments:
/// `--level L --message M [--name N] [--attr k=v]... [--live]`.
pub fn parse_emit_args(args: &[String]) -> Result<EmitArgs, String> {
    let mut level = None;
    let mut message = None;
    let mut event_name = None;
    let mut attributes = Vec::new();
    let mut live = false;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        if flag == "--live" {
            live = true;
            continue;
        }
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} requires a value", flag))
        };
        match flag.as_str() {
            "--level" | "-l" => {
                let raw = value()?;
                level = Some(raw.parse::<Level>().map_err(|e| e.to_string())?);
            }
            "--message" | "-m" => message = Some(value()?),
            "--name" => event_name = Some(value()?),
            "--attr" => {
                let raw = value()?;
                let (k, v) = raw
                    .split_once('=')
                    .ok_or_else(|| format!("attribute must be key=value, got {}", raw))?;
                attributes.push((k.to_string(), v.to_string()));
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }

    Ok(EmitArgs {
        level: level.unwrap_or(Level::Informational),
        message: message.ok_or_else(|| "--message is required".to_string())?,
        event_name,
        attributes,
        live,
    })
}

fn fill_record(record: &mut LogRecord, args: &EmitArgs) {
    record
        .set_level(args.level)
        .set_body(args.message.as_str())
        .set_timestamp(chrono::Utc::now());
    if let Some(name) = &args.event_name {
        record.set_event_name(name.as_str());
    }
    for (k, v) in &args.attributes {
        record.add_attribute(k.as_str(), v.as_str());
    }
}

/// Export one record through an in-process provider and return the event
/// that was written.
pub fn dry_run(provider_name: &str, args: &EmitArgs) -> Result<TraceEvent, String> {
    let provider = MemoryProvider::open(provider_name).map_err(|e| e.to_string())?;
    let options = config::ExporterOptions::new(provider_name);
    let exporter = UserEventsExporter::with_provider(options, provider);

    let channel = exporter.registry().handle(args.level);
    channel.set_enabled(true);

    let mut record = exporter.make_record();
    fill_record(&mut record, args);

    exporter
        .export(&mut vec![record])
        .map_err(|e| e.to_string())?;

    channel
        .events()
        .into_iter()
        .next()
        .ok_or_else(|| "no event was written".to_string())
}

/// Export one record to the kernel tracepoint for its level.
#[cfg(target_os = "linux")]
pub fn live_run(
    options: &config::ExporterOptions,
    args: &EmitArgs,
) -> Result<crate::exporter::ExportReport, String> {
    use crate::provider::UserEventsProvider;

    let exporter: UserEventsExporter<UserEventsProvider> =
        UserEventsExporter::new(options.clone()).map_err(|e| e.to_string())?;
    let mut record = exporter.make_record();
    fill_record(&mut record, args);

    let report = exporter
        .export(&mut vec![record])
        .map_err(|e| e.to_string());
    exporter.shutdown_with_configured_timeout();
    report
}

#[cfg(not(target_os = "linux"))]
pub fn live_run(
    _options: &config::ExporterOptions,
    _args: &EmitArgs,
) -> Result<crate::exporter::ExportReport, String> {
    Err("--live needs Linux user_events".to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            1
        }
    }
}

/// Print the tracepoint names for the configured provider.
pub fn run_tracepoints() -> i32 {
    let cfg = config::load();
    for level in Level::ALL {
        println!("{:<14} {}", level, level.channel_name(&cfg.exporter.provider_name));
    }
    0
}

/// Run `emit` and print the decoded event as JSON.
pub fn run_emit(args: &[String]) -> i32 {
    let parsed = match parse_emit_args(args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    let cfg = config::load();
    let result = if parsed.live {
        live_run(&cfg.exporter, &parsed).map(|report| print_json(&report))
    } else {
        dry_run(&cfg.exporter.provider_name, &parsed).map(|event| print_json(&event))
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Emit failed: {}", e);
            1
        }
    }
}
