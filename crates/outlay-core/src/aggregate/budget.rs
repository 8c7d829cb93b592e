//! Budget usage (gauge)

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{amount_for, dated_amount_for, Transaction};

/// Usage strictly above this percentage is the danger state
pub const DANGER_THRESHOLD: f64 = 85.0;

/// Which transactions count against the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetPeriod {
    /// Every transaction ever recorded
    Lifetime,
    /// Only the calendar month of the reference date
    CurrentMonth,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Lifetime => "lifetime",
            BudgetPeriod::CurrentMonth => "current-month",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lifetime" => Ok(BudgetPeriod::Lifetime),
            "current-month" | "current_month" | "month" => Ok(BudgetPeriod::CurrentMonth),
            _ => Err(format!(
                "Unknown budget period: {} (valid: lifetime, current-month)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetUsage {
    pub current: f64,
    pub limit: f64,
    /// `current / limit × 100`, capped at 100
    pub percentage: f64,
}

impl BudgetUsage {
    pub fn is_danger(&self) -> bool {
        self.percentage > DANGER_THRESHOLD
    }

    /// Budget left before the limit, never negative
    pub fn remaining(&self) -> f64 {
        (self.limit - self.current).max(0.0)
    }
}

fn check_limit(limit: f64) -> Result<()> {
    if !limit.is_finite() || limit <= 0.0 {
        return Err(Error::Configuration(format!(
            "budget limit must be positive, got {}",
            limit
        )));
    }
    Ok(())
}

fn usage(current: f64, limit: f64) -> BudgetUsage {
    let percentage = (current / limit * 100.0).min(100.0);
    debug!(current, limit, percentage, "Computed budget usage");
    BudgetUsage {
        current,
        limit,
        percentage,
    }
}

/// Lifetime spend against `limit`.
///
/// Fails with [`Error::Configuration`] when `limit` is zero, negative or not
/// finite.
pub fn compute_budget_usage(transactions: &[Transaction], limit: f64) -> Result<BudgetUsage> {
    check_limit(limit)?;
    let current = transactions
        .iter()
        .filter_map(|tx| amount_for(tx, "budget"))
        .sum();
    Ok(usage(current, limit))
}

/// Spend for `period` against `limit`; `reference` picks the current month
pub fn compute_budget_usage_for(
    transactions: &[Transaction],
    limit: f64,
    period: BudgetPeriod,
    reference: NaiveDate,
) -> Result<BudgetUsage> {
    match period {
        BudgetPeriod::Lifetime => compute_budget_usage(transactions, limit),
        BudgetPeriod::CurrentMonth => {
            check_limit(limit)?;
            let current = transactions
                .iter()
                .filter_map(|tx| dated_amount_for(tx, "budget"))
                .filter(|(date, _)| {
                    date.year() == reference.year() && date.month() == reference.month()
                })
                .map(|(_, amount)| amount)
                .sum();
            Ok(usage(current, limit))
        }
    }
}
