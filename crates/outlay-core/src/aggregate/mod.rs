//! Aggregation Engine - derived dashboard views
//!
//! Turns a snapshot of expense records into the views the dashboard renders:
//!
//! - **Category totals** - spend per category plus grand total
//! - **Monthly series** - outflow per month with an estimated inflow line
//! - **Budget usage** - spend against a configured ceiling
//! - **Daily heatmap** - 35 day buckets with a 0-4 severity level
//! - **Money flow** - income split into needs, wants and savings
//! - **Expense list** - search and category filter with a running total
//!
//! Every view is a pure function of the input slice. Nothing is cached and the
//! input is never modified, so the functions can run in any order or in
//! parallel. Records with a missing or invalid field are skipped only for the
//! views that need that field.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use outlay_core::{AggregationEngine, EngineConfig};
//!
//! let engine = AggregationEngine::new(EngineConfig::default())?;
//! let dashboard = engine.dashboard(&transactions, today)?;
//! ```

pub mod budget;
pub mod category;
pub mod expenses;
pub mod flow;
pub mod heatmap;
pub mod monthly;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::forecast::{self, Forecast};
use crate::models::{amount_for, Transaction};

pub use budget::{compute_budget_usage, compute_budget_usage_for, BudgetPeriod, BudgetUsage};
pub use category::{compute_category_totals, compute_category_totals_with, CategoryTotals};
pub use expenses::{filter_transactions, filter_transactions_with, ExpenseList};
pub use flow::{compute_money_flow, MoneyFlow};
pub use heatmap::{compute_daily_heatmap, severity_level, DailyHeatmap, HeatmapDay};
pub use monthly::{
    compute_monthly_series, compute_monthly_series_with, estimate_inflow, FixedMultiplier,
    InflowEstimator, MonthWindow, MonthlySeries,
};

/// Sum of every valid amount (the dashboard header figure)
pub fn net_liquidity(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter_map(|tx| amount_for(tx, "liquidity"))
        .sum()
}

/// Every view for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub reference_date: NaiveDate,
    pub transaction_count: usize,
    pub net_liquidity: f64,
    pub category: CategoryTotals,
    pub monthly: MonthlySeries,
    pub budget: BudgetUsage,
    pub heatmap: DailyHeatmap,
    pub flow: MoneyFlow,
    pub forecast: Forecast,
}

/// Configured entry point for all views
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    config: EngineConfig,
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }
}

impl AggregationEngine {
    /// Create an engine, rejecting an invalid configuration up front
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn category_totals(&self, transactions: &[Transaction]) -> CategoryTotals {
        compute_category_totals_with(transactions, &self.config.default_category)
    }

    pub fn monthly_series(
        &self,
        transactions: &[Transaction],
        reference: NaiveDate,
    ) -> Result<MonthlySeries> {
        compute_monthly_series_with(
            transactions,
            self.config.trend_window.at(reference),
            &FixedMultiplier(self.config.inflow_multiplier),
        )
    }

    pub fn budget_usage(
        &self,
        transactions: &[Transaction],
        reference: NaiveDate,
    ) -> Result<BudgetUsage> {
        compute_budget_usage_for(
            transactions,
            self.config.budget_limit,
            self.config.budget_period,
            reference,
        )
    }

    pub fn daily_heatmap(&self, transactions: &[Transaction], reference: NaiveDate) -> DailyHeatmap {
        compute_daily_heatmap(transactions, reference)
    }

    pub fn money_flow(&self, transactions: &[Transaction]) -> Result<MoneyFlow> {
        compute_money_flow(
            transactions,
            self.config.effective_income(),
            &self.config.needs_categories,
        )
    }

    pub fn expenses(
        &self,
        transactions: &[Transaction],
        search: Option<&str>,
        category: Option<&str>,
    ) -> ExpenseList {
        filter_transactions_with(
            transactions,
            search,
            category,
            &self.config.default_category,
        )
    }

    pub fn forecast(&self, transactions: &[Transaction], reference: NaiveDate) -> Result<Forecast> {
        let series = self.monthly_series(transactions, reference)?;
        forecast::forecast(
            &series,
            self.config.forecast_horizon,
            self.config.risk_factor,
        )
    }

    /// Compute every view for `transactions` as of `reference`
    pub fn dashboard(&self, transactions: &[Transaction], reference: NaiveDate) -> Result<Dashboard> {
        let monthly = self.monthly_series(transactions, reference)?;
        let forecast = forecast::forecast(
            &monthly,
            self.config.forecast_horizon,
            self.config.risk_factor,
        )?;

        let dashboard = Dashboard {
            reference_date: reference,
            transaction_count: transactions.len(),
            net_liquidity: net_liquidity(transactions),
            category: self.category_totals(transactions),
            budget: self.budget_usage(transactions, reference)?,
            heatmap: self.daily_heatmap(transactions, reference),
            flow: self.money_flow(transactions)?,
            monthly,
            forecast,
        };

        debug!(
            transactions = transactions.len(),
            reference = %reference,
            "Built dashboard"
        );
        Ok(dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrendWindow;
    use crate::test_utils::{date, sample_transactions, tx};

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AggregationEngine>();
        assert_send_sync::<Dashboard>();
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig {
            budget_limit: 0.0,
            ..EngineConfig::default()
        };
        assert!(AggregationEngine::new(config).is_err());
    }

    #[test]
    fn test_net_liquidity_skips_malformed() {
        let mut bad = tx("x", 0.0, "Food", "2024-01-01");
        bad.amount = None;
        let txns = vec![tx("1", 10.0, "Food", "2024-01-01"), bad];
        assert_eq!(net_liquidity(&txns), 10.0);
        assert_eq!(net_liquidity(&[]), 0.0);
    }

    #[test]
    fn test_dashboard_uses_config() {
        let config = EngineConfig {
            budget_limit: 2800.0,
            trend_window: TrendWindow::FixedFirstHalf,
            default_category: "Misc".into(),
            ..EngineConfig::default()
        };
        let engine = AggregationEngine::new(config).unwrap();
        let mut uncategorized = tx("u", 5.0, "", "2024-02-02");
        uncategorized.category = None;
        let txns = vec![tx("1", 2450.0, "Housing", "2024-01-15"), uncategorized];

        let dashboard = engine.dashboard(&txns, date(2024, 2, 10)).unwrap();
        assert_eq!(dashboard.budget.limit, 2800.0);
        assert_eq!(dashboard.budget.current, 2455.0);
        assert_eq!(dashboard.monthly.labels[0], "Jan");
        assert_eq!(dashboard.monthly.outflow[0], 2450.0);
        assert_eq!(dashboard.category.labels, vec!["Housing", "Misc"]);
        assert_eq!(dashboard.flow.income, 2800.0);
        assert_eq!(dashboard.transaction_count, 2);
    }

    #[test]
    fn test_expenses_use_configured_default_category() {
        let engine = AggregationEngine::new(EngineConfig {
            default_category: "Misc".into(),
            ..EngineConfig::default()
        })
        .unwrap();
        let txns = vec![
            tx("1", 5.0, "", "2024-02-02").with_description("Parking"),
            tx("2", 7.0, "Food", "2024-02-03").with_description("Parking snack"),
        ];

        let list = engine.expenses(&txns, Some("PARKING"), Some("Misc"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.total, 5.0);
        assert_eq!(list.categories, vec!["Food", "Misc"]);
    }

    #[test]
    fn test_dashboard_is_idempotent_and_leaves_input_untouched() {
        let engine = AggregationEngine::default();
        let txns = sample_transactions();
        let before = txns.clone();
        let reference = date(2024, 6, 30);

        let first = engine.dashboard(&txns, reference).unwrap();
        let second = engine.dashboard(&txns, reference).unwrap();

        assert_eq!(first, second);
        assert_eq!(txns, before);
    }

    #[test]
    fn test_views_can_run_in_parallel() {
        let engine = AggregationEngine::default();
        let txns = sample_transactions();
        let reference = date(2024, 6, 30);

        let (categories, heatmap) = std::thread::scope(|s| {
            let a = s.spawn(|| engine.category_totals(&txns));
            let b = s.spawn(|| engine.daily_heatmap(&txns, reference));
            (a.join().unwrap(), b.join().unwrap())
        });

        assert_eq!(categories, engine.category_totals(&txns));
        assert_eq!(heatmap, engine.daily_heatmap(&txns, reference));
    }
}
