//! Outlay CLI - Spending dashboard views
//!
//! Usage:
//!   outlay summary --file snapshot.json          All views as of today
//!   outlay budget --file snapshot.json -l 2800   Budget gauge with a custom limit
//!   outlay expenses --file snapshot.json -s cafe  Expenses mentioning "cafe"
//!   outlay import --file statement.csv -r 3      Review a statement, reject row 3
//!   outlay config                                Show effective configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let (config, source) = commands::load_config(cli.config.as_deref())?;
    let json = cli.json;
    let mut out = std::io::stdout().lock();
    let out = &mut out;

    match cli.command {
        Commands::Summary { input } => commands::cmd_summary(out, config, &input, json),
        Commands::Categories { input } => commands::cmd_categories(out, config, &input, json),
        Commands::Trend {
            input,
            rolling,
            fixed,
        } => commands::cmd_trend(out, config, &input, rolling, fixed, json),
        Commands::Budget {
            input,
            limit,
            period,
        } => commands::cmd_budget(out, config, &input, limit, period, json),
        Commands::Heatmap { input } => commands::cmd_heatmap(out, config, &input, json),
        Commands::Flow { input, income } => commands::cmd_flow(out, config, &input, income, json),
        Commands::Forecast {
            input,
            horizon,
            risk,
        } => commands::cmd_forecast(out, config, &input, horizon, risk, json),
        Commands::Expenses {
            file,
            search,
            category,
        } => commands::cmd_expenses(
            out,
            config,
            &file,
            search.as_deref(),
            category.as_deref(),
            json,
        ),
        Commands::Import { file, reject } => commands::cmd_import(out, &config, &file, &reject, json),
        Commands::Config => commands::cmd_config(out, &config, &source, json),
    }
}
