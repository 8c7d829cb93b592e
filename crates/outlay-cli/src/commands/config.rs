//! Configuration display command

use std::io::Write;

use anyhow::Result;
use outlay_core::{ConfigSource, EngineConfig, TrendWindow};
use serde_json::json;

use super::print_json;

pub fn cmd_config(
    out: &mut impl Write,
    config: &EngineConfig,
    source: &ConfigSource,
    json: bool,
) -> Result<()> {
    if json {
        return print_json(out, &json!({
            "source": source.to_string(),
            "config": config,
        }));
    }

    let window = match config.trend_window {
        TrendWindow::FixedFirstHalf => "fixed (Jan..Jun)".to_string(),
        TrendWindow::Rolling { months } => format!("rolling, {} months", months),
    };
    let income = match config.income {
        Some(income) => format!("${:.2}", income),
        None => format!("${:.2} (budget limit)", config.effective_income()),
    };

    writeln!(out)?;
    writeln!(out, "⚙️  Configuration")?;
    writeln!(out, "   Source: {}", source)?;
    writeln!(out, "   ─────────────────────────────────────────────────────────────")?;
    writeln!(out, "   Budget limit:      ${:.2}", config.budget_limit)?;
    writeln!(out, "   Budget period:     {}", config.budget_period)?;
    writeln!(out, "   Trend window:      {}", window)?;
    writeln!(out, "   Inflow multiplier: {}", config.inflow_multiplier)?;
    writeln!(out, "   Default category:  {}", config.default_category)?;
    writeln!(out, "   Needs:             {}", config.needs_categories.join(", "))?;
    writeln!(out, "   Income:            {}", income)?;
    writeln!(
        out,
        "   Forecast:          {} months, risk {}",
        config.forecast_horizon, config.risk_factor
    )?;

    if config.rules.is_empty() {
        writeln!(out, "   Rules:             none")?;
    } else {
        writeln!(out, "   Rules:")?;
        for rule in &config.rules {
            writeln!(out, "     {:30} → {}", rule.pattern, rule.category)?;
        }
    }

    Ok(())
}
