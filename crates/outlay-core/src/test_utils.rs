//! Shared fixtures for tests

use chrono::NaiveDate;

use crate::models::Transaction;

/// Shorthand for a well-formed transaction
pub fn tx(id: &str, amount: f64, category: &str, expense_date: &str) -> Transaction {
    Transaction::new(id, amount, category, expense_date)
}

/// Shorthand for a calendar date; panics on an invalid date
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Half a year of mixed spending, January through June 2024, including one
/// record of every malformed kind
pub fn sample_transactions() -> Vec<Transaction> {
    let mut txns = vec![
        tx("rent-jan", 1200.0, "Housing", "2024-01-01"),
        tx("food-jan", 84.25, "Food", "2024-01-14"),
        tx("rent-feb", 1200.0, "Housing", "2024-02-01"),
        tx("fun-feb", 60.0, "Entertainment", "2024-02-17"),
        tx("rent-mar", 1200.0, "Housing", "2024-03-01"),
        tx("power-mar", 95.5, "Utilities", "2024-03-09"),
        tx("rent-apr", 1200.0, "Housing", "2024-04-01"),
        tx("uber-apr", 23.1, "Transport", "2024-04-22"),
        tx("rent-may", 1200.0, "Housing", "2024-05-01"),
        tx("shoes-may", 129.99, "Shopping", "2024-05-30"),
        tx("rent-jun", 1200.0, "Housing", "2024-06-01"),
        tx("food-jun", 45.0, "Food", "2024-06-29"),
        tx("coffee-jun", 4.5, "", "2024-06-30")
            .with_merchant("Corner Cafe")
            .with_description("Flat white"),
    ];

    let mut no_amount = tx("broken-amount", 0.0, "Food", "2024-06-15");
    no_amount.amount = None;
    let mut negative = tx("broken-negative", 0.0, "Food", "2024-06-15");
    negative.amount = Some(-20.0);
    let mut no_date = tx("broken-date", 12.0, "Food", "");
    no_date.expense_date = None;
    let garbage_date = tx("broken-garbage", 8.0, "Food", "June-ish");

    txns.extend([no_amount, negative, no_date, garbage_date]);
    txns
}
