//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use outlay_core::BudgetPeriod;

/// Outlay - Spending dashboard from a transaction snapshot
#[derive(Parser)]
#[command(name = "outlay")]
#[command(about = "Spending dashboard views from a transaction snapshot", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.config/outlay/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print views as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Snapshot input shared by every view command
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Transaction snapshot (JSON array, or {"transactions": [...]})
    #[arg(short, long)]
    pub file: PathBuf,

    /// Reference date as YYYY-MM-DD (defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show every dashboard view
    Summary {
        #[command(flatten)]
        input: SnapshotArgs,
    },

    /// Spend per category
    Categories {
        #[command(flatten)]
        input: SnapshotArgs,
    },

    /// Monthly inflow/outflow trend
    Trend {
        #[command(flatten)]
        input: SnapshotArgs,

        /// Show the last N months ending at the reference date
        #[arg(long, conflicts_with = "fixed")]
        rolling: Option<u32>,

        /// Show the fixed Jan..Jun window
        #[arg(long)]
        fixed: bool,
    },

    /// Spend against the budget limit
    Budget {
        #[command(flatten)]
        input: SnapshotArgs,

        /// Budget limit (overrides config)
        #[arg(short, long)]
        limit: Option<f64>,

        /// Budget period: lifetime, current-month
        #[arg(short, long)]
        period: Option<BudgetPeriod>,
    },

    /// Daily spending heatmap for the last five weeks
    Heatmap {
        #[command(flatten)]
        input: SnapshotArgs,
    },

    /// Income split into needs, wants and savings
    Flow {
        #[command(flatten)]
        input: SnapshotArgs,

        /// Monthly income (defaults to config, then the budget limit)
        #[arg(short, long)]
        income: Option<f64>,
    },

    /// Project the monthly trend forward
    Forecast {
        #[command(flatten)]
        input: SnapshotArgs,

        /// Months to project
        #[arg(long)]
        horizon: Option<usize>,

        /// Risk factor 0-100 (0 = wide band, 100 = narrow band)
        #[arg(short, long)]
        risk: Option<u8>,
    },

    /// List expenses, filtered by text and category
    Expenses {
        /// Transaction snapshot (JSON array, or {"transactions": [...]})
        #[arg(short, long)]
        file: PathBuf,

        /// Case-insensitive text to find in the description or merchant
        #[arg(short, long)]
        search: Option<String>,

        /// Only this category ("all" for every category)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Review a CSV statement and print the approved rows as transactions
    Import {
        /// CSV statement to import
        #[arg(short, long)]
        file: PathBuf,

        /// Row ids to reject (repeatable)
        #[arg(short, long)]
        reject: Vec<u32>,
    },

    /// Show the effective configuration
    Config,
}
