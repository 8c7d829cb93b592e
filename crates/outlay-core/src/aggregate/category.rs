//! Category breakdown

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{amount_for, Transaction, DEFAULT_CATEGORY};

/// Spend per category, labels in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub total: f64,
}

impl CategoryTotals {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Amount spent in `label`
    pub fn get(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Share of the total for `label`, as a percentage
    pub fn percentage(&self, label: &str) -> Option<f64> {
        let value = self.get(label)?;
        Some(if self.total > 0.0 {
            value / self.total * 100.0
        } else {
            0.0
        })
    }

    /// Categories ordered by amount, largest first (ties keep first-seen order)
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// Group spend by category, using `"Other"` for uncategorized records
pub fn compute_category_totals(transactions: &[Transaction]) -> CategoryTotals {
    compute_category_totals_with(transactions, DEFAULT_CATEGORY)
}

/// Group spend by category with a custom label for uncategorized records
pub fn compute_category_totals_with(
    transactions: &[Transaction],
    default_category: &str,
) -> CategoryTotals {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut labels: Vec<String> = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    for tx in transactions {
        let Some(amount) = amount_for(tx, "category") else {
            continue;
        };
        let category = tx.category_or(default_category);
        let slot = *index.entry(category).or_insert_with(|| {
            labels.push(category.to_string());
            values.push(0.0);
            labels.len() - 1
        });
        values[slot] += amount;
    }

    let total = values.iter().sum();
    debug!(categories = labels.len(), total, "Computed category totals");

    CategoryTotals {
        labels,
        values,
        total,
    }
}
