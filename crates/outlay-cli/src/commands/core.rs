//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Resolve and validate the engine configuration
//! - `load_transactions` - Read a snapshot file
//! - `resolve_reference_date` - Parse `--date` or fall back to today
//! - `print_json` - Pretty JSON output for `--json`, written to the given sink

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use outlay_core::{load_snapshot, AggregationEngine, ConfigSource, EngineConfig, Transaction};
use serde::Serialize;
use tracing::debug;

/// Load config from `--config`, the user override, or built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<(EngineConfig, ConfigSource)> {
    EngineConfig::load(path).context("Failed to load configuration")
}

/// Build an engine, validating any command-line overrides applied to `config`
pub fn build_engine(config: EngineConfig) -> Result<AggregationEngine> {
    AggregationEngine::new(config).context("Invalid engine settings")
}

/// Read a transaction snapshot; malformed records are kept and skipped per view
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open snapshot {}", path.display()))?;
    let transactions = load_snapshot(BufReader::new(file))
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    debug!(
        count = transactions.len(),
        "Loaded snapshot {}",
        path.display()
    );
    Ok(transactions)
}

/// Parse `--date` (YYYY-MM-DD) or use today's local date
pub fn resolve_reference_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("Invalid --date '{}' (use YYYY-MM-DD)", d)),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    writeln!(out, "{}", json)?;
    Ok(())
}
