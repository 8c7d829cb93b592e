//! Money flow: income split into needs, wants and savings

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{amount_for, Transaction, DEFAULT_CATEGORY};

/// Categories counted as needs unless configured otherwise
pub const DEFAULT_NEEDS: [&str; 4] = ["Food", "Housing", "Utilities", "Transport"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoneyFlow {
    pub income: f64,
    pub needs: f64,
    pub wants: f64,
    /// Income left after all spend, never negative
    pub savings: f64,
    /// Percentages of `needs + wants + savings`
    pub needs_share: f64,
    pub wants_share: f64,
    pub savings_share: f64,
}

impl MoneyFlow {
    pub fn outflow(&self) -> f64 {
        self.needs + self.wants
    }

    pub fn is_overspent(&self) -> bool {
        self.outflow() > self.income
    }
}

/// Split spend into needs (categories in `needs_categories`, case-insensitive)
/// and wants (everything else, including uncategorized spend)
pub fn compute_money_flow(
    transactions: &[Transaction],
    income: f64,
    needs_categories: &[String],
) -> Result<MoneyFlow> {
    if !income.is_finite() || income <= 0.0 {
        return Err(Error::Configuration(format!(
            "income must be positive, got {}",
            income
        )));
    }

    let mut needs = 0.0;
    let mut wants = 0.0;
    for tx in transactions {
        let Some(amount) = amount_for(tx, "flow") else {
            continue;
        };
        let category = tx.category_or(DEFAULT_CATEGORY);
        if needs_categories
            .iter()
            .any(|n| n.trim().eq_ignore_ascii_case(category))
        {
            needs += amount;
        } else {
            wants += amount;
        }
    }

    let savings = (income - needs - wants).max(0.0);
    let whole = needs + wants + savings;
    let share = |part: f64| if whole > 0.0 { part / whole * 100.0 } else { 0.0 };

    debug!(needs, wants, savings, "Computed money flow");

    Ok(MoneyFlow {
        income,
        needs,
        wants,
        savings,
        needs_share: share(needs),
        wants_share: share(wants),
        savings_share: share(savings),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tx;

    fn default_needs() -> Vec<String> {
        DEFAULT_NEEDS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_needs_wants_savings() {
        let txns = vec![
            tx("1", 1000.0, "Housing", "2024-01-01"),
            tx("2", 500.0, "food", "2024-01-02"),
            tx("3", 500.0, "Shopping", "2024-01-03"),
        ];
        let flow = compute_money_flow(&txns, 5000.0, &default_needs()).unwrap();

        assert_eq!(flow.needs, 1500.0);
        assert_eq!(flow.wants, 500.0);
        assert_eq!(flow.savings, 3000.0);
        assert_eq!(flow.needs_share, 30.0);
        assert_eq!(flow.wants_share, 10.0);
        assert_eq!(flow.savings_share, 60.0);
        assert!(!flow.is_overspent());
    }

    #[test]
    fn test_overspending_clamps_savings() {
        let txns = vec![tx("1", 6000.0, "Shopping", "2024-01-01")];
        let flow = compute_money_flow(&txns, 5000.0, &default_needs()).unwrap();
        assert_eq!(flow.savings, 0.0);
        assert_eq!(flow.wants_share, 100.0);
        assert!(flow.is_overspent());
    }

    #[test]
    fn test_uncategorized_spend_is_a_want() {
        let mut blank = tx("1", 40.0, "", "2024-01-01");
        blank.category = None;
        let flow = compute_money_flow(&[blank], 100.0, &default_needs()).unwrap();
        assert_eq!(flow.wants, 40.0);
        assert_eq!(flow.needs, 0.0);
    }

    #[test]
    fn test_invalid_income_rejected() {
        assert!(matches!(
            compute_money_flow(&[], 0.0, &default_needs()).unwrap_err(),
            Error::Configuration(_)
        ));
    }
}
