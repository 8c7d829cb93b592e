//! Expense list: search and category filter over the snapshot

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{amount_for, Transaction, DEFAULT_CATEGORY};

/// Category filter value that matches every record
pub const ALL_CATEGORIES: &str = "all";

/// Filtered records with their total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseList {
    /// Matching records, in input order
    pub rows: Vec<Transaction>,
    /// Sum of the valid amounts among `rows`
    pub total: f64,
    /// Every category in the snapshot, sorted, for the filter picker
    pub categories: Vec<String>,
}

impl ExpenseList {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn matches_search(tx: &Transaction, needle: &str) -> bool {
    [tx.description.as_deref(), tx.merchant.as_deref()]
        .into_iter()
        .flatten()
        .any(|text| text.to_lowercase().contains(needle))
}

/// Filter with `"Other"` as the label for uncategorized records
pub fn filter_transactions(
    transactions: &[Transaction],
    search: Option<&str>,
    category: Option<&str>,
) -> ExpenseList {
    filter_transactions_with(transactions, search, category, DEFAULT_CATEGORY)
}

/// Keep records whose description or merchant contains `search`
/// (case-insensitive) and whose category equals `category`.
///
/// A blank search or a category of `None`/`"all"` does not filter.
pub fn filter_transactions_with(
    transactions: &[Transaction],
    search: Option<&str>,
    category: Option<&str>,
    default_category: &str,
) -> ExpenseList {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES));

    let rows: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| needle.as_deref().map_or(true, |n| matches_search(tx, n)))
        .filter(|tx| category.map_or(true, |c| tx.category_or(default_category) == c))
        .cloned()
        .collect();

    let total = rows.iter().filter_map(|tx| amount_for(tx, "expenses")).sum();
    let categories: Vec<String> = transactions
        .iter()
        .map(|tx| tx.category_or(default_category))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    debug!(
        matched = rows.len(),
        of = transactions.len(),
        "Filtered expense list"
    );

    ExpenseList {
        rows,
        total,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_transactions, tx};

    fn shop() -> Vec<Transaction> {
        vec![
            tx("1", 4.5, "Food", "2024-06-01").with_merchant("Corner Cafe"),
            tx("2", 12.0, "Food", "2024-06-02").with_description("Lunch at the CAFE"),
            tx("3", 60.0, "Shopping", "2024-06-03").with_merchant("Bookshop"),
            tx("4", 9.99, "", "2024-06-04").with_description("Cafe loyalty card"),
        ]
    }

    #[test]
    fn test_no_filters_keeps_everything() {
        let list = filter_transactions(&shop(), None, None);
        assert_eq!(list.len(), 4);
        assert!((list.total - 86.49).abs() < 1e-9);

        let all = filter_transactions(&shop(), Some("   "), Some("all"));
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_search_matches_description_or_merchant() {
        let list = filter_transactions(&shop(), Some("cafe"), None);
        let ids: Vec<&str> = list.rows.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
        assert!((list.total - 26.49).abs() < 1e-9);
    }

    #[test]
    fn test_category_filter() {
        let list = filter_transactions(&shop(), Some("cafe"), Some("Food"));
        assert_eq!(list.len(), 2);
        assert_eq!(list.total, 16.5);

        // Uncategorized records filter under the default label
        let other = filter_transactions(&shop(), None, Some("Other"));
        assert_eq!(other.len(), 1);
        assert_eq!(other.rows[0].id, "4");

        assert!(filter_transactions(&shop(), None, Some("Travel")).is_empty());
    }

    #[test]
    fn test_categories_sorted_and_unfiltered() {
        let list = filter_transactions(&shop(), Some("bookshop"), None);
        assert_eq!(list.len(), 1);
        assert_eq!(list.categories, vec!["Food", "Other", "Shopping"]);
    }

    #[test]
    fn test_malformed_amounts_kept_but_not_summed() {
        let list = filter_transactions(&sample_transactions(), None, Some("Food"));
        assert!(list.rows.iter().any(|t| t.id == "broken-amount"));
        // Undated records still have a valid amount
        assert_eq!(list.total, 84.25 + 45.0 + 12.0 + 8.0);
    }
}
