//! Outlay Core Library
//!
//! Shared functionality for the Outlay spending dashboard:
//! - Transaction model and snapshot loading
//! - Aggregation engine for dashboard views (categories, monthly trend,
//!   budget gauge, spending heatmap, money flow, expense list)
//! - Linear liquidity forecast
//! - Intake of manual entries and uploaded statements
//! - TOML configuration with embedded defaults

pub mod aggregate;
pub mod config;
pub mod error;
pub mod forecast;
pub mod intake;
pub mod models;

/// Shared fixtures for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{
    compute_budget_usage, compute_category_totals, compute_daily_heatmap, compute_monthly_series,
    filter_transactions, net_liquidity, AggregationEngine, BudgetPeriod, BudgetUsage,
    CategoryTotals, DailyHeatmap, Dashboard, ExpenseList, HeatmapDay, MoneyFlow, MonthWindow,
    MonthlySeries,
};
pub use config::{ConfigSource, EngineConfig, TrendWindow};
pub use error::{Error, Result};
pub use forecast::{Forecast, ForecastPoint};
pub use intake::{
    manual_transactions, CategoryClassifier, IdAllocator, ManualEntry, ReviewBatch, ReviewField,
    ReviewTransaction,
};
pub use models::{load_snapshot, parse_snapshot, DataIssue, Transaction};
