//! Dashboard view commands
//!
//! Each command renders into `out` so callers (and tests) choose the sink.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use outlay_core::{
    BudgetPeriod, BudgetUsage, CategoryTotals, DailyHeatmap, EngineConfig, ExpenseList, Forecast,
    MoneyFlow, MonthlySeries, TrendWindow,
};

use super::{build_engine, load_transactions, print_json, resolve_reference_date, truncate};
use crate::cli::SnapshotArgs;

/// Heatmap cell glyphs, indexed by severity level
const HEAT_GLYPHS: [&str; 5] = ["·", "░", "▒", "▓", "█"];

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

pub fn cmd_summary(
    out: &mut impl Write,
    config: EngineConfig,
    input: &SnapshotArgs,
    json: bool,
) -> Result<()> {
    let engine = build_engine(config)?;
    let transactions = load_transactions(&input.file)?;
    let reference = resolve_reference_date(input.date.as_deref())?;
    let dashboard = engine.dashboard(&transactions, reference)?;

    if json {
        return print_json(out, &dashboard);
    }

    writeln!(out)?;
    writeln!(out, "📊 Spending Dashboard")?;
    writeln!(
        out,
        "   As of {} · {} records",
        dashboard.reference_date, dashboard.transaction_count
    )?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "   Net liquidity: ${:.2}", dashboard.net_liquidity)?;

    print_categories(out, &dashboard.category)?;
    print_trend(out, &dashboard.monthly)?;
    print_budget(out, &dashboard.budget, engine.config().budget_period)?;
    print_heatmap(out, &dashboard.heatmap)?;
    print_flow(out, &dashboard.flow)?;
    print_forecast(out, &dashboard.forecast)?;

    Ok(())
}

pub fn cmd_categories(
    out: &mut impl Write,
    config: EngineConfig,
    input: &SnapshotArgs,
    json: bool,
) -> Result<()> {
    let engine = build_engine(config)?;
    let transactions = load_transactions(&input.file)?;
    let totals = engine.category_totals(&transactions);

    if json {
        return print_json(out, &totals);
    }
    print_categories(out, &totals)
}

pub fn cmd_trend(
    out: &mut impl Write,
    mut config: EngineConfig,
    input: &SnapshotArgs,
    rolling: Option<u32>,
    fixed: bool,
    json: bool,
) -> Result<()> {
    if fixed {
        config.trend_window = TrendWindow::FixedFirstHalf;
    } else if let Some(months) = rolling {
        config.trend_window = TrendWindow::Rolling { months };
    }

    let engine = build_engine(config)?;
    let transactions = load_transactions(&input.file)?;
    let reference = resolve_reference_date(input.date.as_deref())?;
    let series = engine.monthly_series(&transactions, reference)?;

    if json {
        return print_json(out, &series);
    }
    print_trend(out, &series)
}

pub fn cmd_budget(
    out: &mut impl Write,
    mut config: EngineConfig,
    input: &SnapshotArgs,
    limit: Option<f64>,
    period: Option<BudgetPeriod>,
    json: bool,
) -> Result<()> {
    if let Some(limit) = limit {
        config.budget_limit = limit;
    }
    if let Some(period) = period {
        config.budget_period = period;
    }

    let engine = build_engine(config)?;
    let transactions = load_transactions(&input.file)?;
    let reference = resolve_reference_date(input.date.as_deref())?;
    let usage = engine.budget_usage(&transactions, reference)?;

    if json {
        return print_json(out, &usage);
    }
    print_budget(out, &usage, engine.config().budget_period)
}

pub fn cmd_heatmap(
    out: &mut impl Write,
    config: EngineConfig,
    input: &SnapshotArgs,
    json: bool,
) -> Result<()> {
    let engine = build_engine(config)?;
    let transactions = load_transactions(&input.file)?;
    let reference = resolve_reference_date(input.date.as_deref())?;
    let heatmap = engine.daily_heatmap(&transactions, reference);

    if json {
        return print_json(out, &heatmap);
    }
    print_heatmap(out, &heatmap)
}

pub fn cmd_flow(
    out: &mut impl Write,
    mut config: EngineConfig,
    input: &SnapshotArgs,
    income: Option<f64>,
    json: bool,
) -> Result<()> {
    if income.is_some() {
        config.income = income;
    }

    let engine = build_engine(config)?;
    let transactions = load_transactions(&input.file)?;
    let flow = engine.money_flow(&transactions)?;

    if json {
        return print_json(out, &flow);
    }
    print_flow(out, &flow)
}

pub fn cmd_forecast(
    out: &mut impl Write,
    mut config: EngineConfig,
    input: &SnapshotArgs,
    horizon: Option<usize>,
    risk: Option<u8>,
    json: bool,
) -> Result<()> {
    if let Some(horizon) = horizon {
        config.forecast_horizon = horizon;
    }
    if let Some(risk) = risk {
        config.risk_factor = risk;
    }

    let engine = build_engine(config)?;
    let transactions = load_transactions(&input.file)?;
    let reference = resolve_reference_date(input.date.as_deref())?;
    let forecast = engine.forecast(&transactions, reference)?;

    if json {
        return print_json(out, &forecast);
    }
    print_forecast(out, &forecast)
}

/// List records matching a search term and category
pub fn cmd_expenses(
    out: &mut impl Write,
    config: EngineConfig,
    file: &Path,
    search: Option<&str>,
    category: Option<&str>,
    json: bool,
) -> Result<()> {
    let engine = build_engine(config)?;
    let transactions = load_transactions(file)?;
    let list = engine.expenses(&transactions, search, category);

    if json {
        return print_json(out, &list);
    }
    print_expenses(out, &list, engine.config().default_category.as_str())
}

fn print_categories(out: &mut impl Write, totals: &CategoryTotals) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "🏷️  Spending by Category")?;
    writeln!(out, "{}", RULE)?;

    if totals.is_empty() {
        writeln!(out, "   No spending found.")?;
        return Ok(());
    }

    writeln!(out, "   {:25} │ {:>10} │ {:>6}", "Category", "Amount", "%")?;
    writeln!(out, "   ──────────────────────────┼────────────┼───────")?;
    for (label, value) in totals.ranked() {
        writeln!(
            out,
            "   {:25} │ {:>10.2} │ {:>5.1}%",
            truncate(label, 25),
            value,
            totals.percentage(label).unwrap_or(0.0)
        )?;
    }
    writeln!(out, "   ──────────────────────────┼────────────┼───────")?;
    writeln!(out, "   {:25} │ {:>10.2} │", "Total", totals.total)?;
    Ok(())
}

fn print_trend(out: &mut impl Write, series: &MonthlySeries) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "📈 Monthly Trend")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "   {:>5} │ {:>10} │ {:>10}", "Month", "Outflow", "Inflow*")?;
    writeln!(out, "   ──────┼────────────┼───────────")?;
    for ((label, outflow), inflow) in series.labels.iter().zip(&series.outflow).zip(&series.inflow)
    {
        writeln!(out, "   {:>5} │ {:>10.0} │ {:>10.2}", label, outflow, inflow)?;
    }
    writeln!(out)?;
    writeln!(out, "   * Estimated from outflow")?;
    Ok(())
}

fn print_budget(out: &mut impl Write, usage: &BudgetUsage, period: BudgetPeriod) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "🎯 Budget ({})", period)?;
    writeln!(out, "{}", RULE)?;

    const WIDTH: usize = 40;
    let filled = (((usage.percentage / 100.0) * WIDTH as f64).round() as usize).min(WIDTH);
    writeln!(
        out,
        "   [{}{}] {:.1}%",
        "█".repeat(filled),
        " ".repeat(WIDTH - filled),
        usage.percentage
    )?;
    writeln!(
        out,
        "   Spent ${:.2} of ${:.2} · ${:.2} left",
        usage.current,
        usage.limit,
        usage.remaining()
    )?;
    if usage.is_danger() {
        writeln!(out, "   ⚠️  Over 85% of the budget is used")?;
    }
    Ok(())
}

fn print_heatmap(out: &mut impl Write, heatmap: &DailyHeatmap) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "🔥 Daily Heatmap (last {} days)", heatmap.days.len())?;
    writeln!(out, "{}", RULE)?;
    for week in heatmap.weeks() {
        let Some(first) = week.first() else {
            continue;
        };
        let cells: Vec<&str> = week
            .iter()
            .map(|d| HEAT_GLYPHS[usize::from(d.level.min(4))])
            .collect();
        let spent: f64 = week.iter().map(|d| d.total).sum();
        writeln!(out, "   {:>6}  {}  ${:.2}", first.label, cells.join(" "), spent)?;
    }
    writeln!(out)?;
    writeln!(out, "   · none  ░ $10+  ▒ $20+  ▓ $30+  █ $40+")?;
    Ok(())
}

fn print_flow(out: &mut impl Write, flow: &MoneyFlow) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "💸 Money Flow (income ${:.2})", flow.income)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "   {:8} │ {:>10} │ {:>6}", "", "Amount", "%")?;
    writeln!(out, "   ─────────┼────────────┼───────")?;
    for (label, amount, share) in [
        ("Needs", flow.needs, flow.needs_share),
        ("Wants", flow.wants, flow.wants_share),
        ("Savings", flow.savings, flow.savings_share),
    ] {
        writeln!(out, "   {:8} │ {:>10.2} │ {:>5.1}%", label, amount, share)?;
    }
    if flow.is_overspent() {
        writeln!(
            out,
            "   ⚠️  Spending exceeds income by ${:.2}",
            flow.outflow() - flow.income
        )?;
    }
    Ok(())
}

fn print_forecast(out: &mut impl Write, forecast: &Forecast) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "🔮 Forecast")?;
    writeln!(out, "{}", RULE)?;
    writeln!(
        out,
        "   {:>5} │ {:>10} │ {:>10} │ {:>10}",
        "Month", "Value", "Low", "High"
    )?;
    writeln!(out, "   ──────┼────────────┼────────────┼───────────")?;
    for point in &forecast.points {
        let marker = if point.projected { "~" } else { " " };
        writeln!(
            out,
            "   {:>5} │ {:>9.0}{} │ {:>10.0} │ {:>10.0}",
            point.label, point.value, marker, point.lower, point.upper
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "   Trend {:+.2}/month · axis 0..{:.0} (ticks {:.0}, {:.0})",
        forecast.slope, forecast.axis.max, forecast.axis.step_low, forecast.axis.step_high
    )?;
    Ok(())
}

fn print_expenses(out: &mut impl Write, list: &ExpenseList, default_category: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "🧾 Expenses ({} shown)", list.len())?;
    writeln!(out, "{}", RULE)?;

    if list.is_empty() {
        writeln!(out, "   No matching expenses.")?;
    } else {
        writeln!(
            out,
            "   {:10} │ {:28} │ {:15} │ {:>10}",
            "Date", "Description", "Category", "Amount"
        )?;
        writeln!(out, "   ───────────┼──────────────────────────────┼─────────────────┼───────────")?;
        for tx in &list.rows {
            let text = tx
                .description
                .as_deref()
                .or(tx.merchant.as_deref())
                .unwrap_or("");
            let amount = match tx.amount {
                Some(a) if a.is_finite() && a >= 0.0 => format!("{:.2}", a),
                _ => "invalid".to_string(),
            };
            writeln!(
                out,
                "   {:10} │ {:28} │ {:15} │ {:>10}",
                tx.expense_date.as_deref().unwrap_or("-"),
                truncate(text, 28),
                truncate(tx.category_or(default_category), 15),
                amount
            )?;
        }
    }
    writeln!(out, "   Total: ${:.2}", list.total)?;
    writeln!(out, "   Categories: {}", list.categories.join(", "))?;
    Ok(())
}
