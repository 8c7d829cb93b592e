//! Data models for Outlay
//!
//! `Transaction` mirrors the expense record exported by the remote store. Every
//! field except `id` is optional because the store does not enforce a schema on
//! its rows; validation happens per view when the record is aggregated.

use std::fmt;
use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;

/// Category label used when a record has no (or a blank) category
pub const DEFAULT_CATEGORY: &str = "Other";

/// A single expense record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Numeric ids from the store are kept as their decimal text
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// Non-negative outflow. Numeric strings are accepted; anything that does
    /// not parse is kept as NaN so it is reported as invalid, not missing.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    /// Non-string values are treated as absent
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    /// Date-only; see [`parse_expense_date`] for accepted formats. A non-string
    /// value is kept as its JSON text so it is reported as an invalid date.
    #[serde(default, deserialize_with = "lenient_date")]
    pub expense_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub merchant: Option<String>,
}

impl Transaction {
    /// Create a well-formed record
    pub fn new(
        id: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        expense_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            amount: Some(amount),
            category: Some(category.into()),
            expense_date: Some(expense_date.into()),
            description: None,
            merchant: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    /// Validated amount
    pub fn checked_amount(&self) -> std::result::Result<f64, DataIssue> {
        match self.amount {
            None => Err(DataIssue::MissingAmount),
            Some(a) if !a.is_finite() || a < 0.0 => Err(DataIssue::InvalidAmount(a)),
            Some(a) => Ok(a),
        }
    }

    /// Validated expense date
    pub fn checked_date(&self) -> std::result::Result<NaiveDate, DataIssue> {
        let raw = match self.expense_date.as_deref() {
            None => return Err(DataIssue::MissingDate),
            Some(s) if s.trim().is_empty() => return Err(DataIssue::MissingDate),
            Some(s) => s,
        };
        parse_expense_date(raw).ok_or_else(|| DataIssue::InvalidDate(raw.to_string()))
    }

    /// Category label, falling back to `default` when absent or blank
    pub fn category_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => default,
        }
    }
}

/// A per-record data-quality problem.
///
/// Issues are logged and the record is skipped for the affected view only;
/// they never abort a computation.
#[derive(Debug, Clone, PartialEq)]
pub enum DataIssue {
    MissingAmount,
    InvalidAmount(f64),
    MissingDate,
    InvalidDate(String),
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIssue::MissingAmount => write!(f, "missing amount"),
            DataIssue::InvalidAmount(a) => write!(f, "invalid amount {}", a),
            DataIssue::MissingDate => write!(f, "missing expense date"),
            DataIssue::InvalidDate(s) => write!(f, "unparseable expense date '{}'", s),
        }
    }
}

/// Amount of `tx`, or `None` after logging why it was skipped for `view`
pub(crate) fn amount_for(tx: &Transaction, view: &str) -> Option<f64> {
    match tx.checked_amount() {
        Ok(a) => Some(a),
        Err(issue) => {
            warn!(transaction = %tx.id, view, "Skipping record: {}", issue);
            None
        }
    }
}

/// Date and amount of `tx`, or `None` after logging why it was skipped for `view`
pub(crate) fn dated_amount_for(tx: &Transaction, view: &str) -> Option<(NaiveDate, f64)> {
    let amount = amount_for(tx, view)?;
    match tx.checked_date() {
        Ok(date) => Some((date, amount)),
        Err(issue) => {
            warn!(transaction = %tx.id, view, "Skipping record: {}", issue);
            None
        }
    }
}

/// Parse an expense date.
///
/// Accepts `2024-01-15`, RFC 3339 timestamps (the written calendar date is
/// kept), `2024-01-15T10:30:00`, `01/15/2024` and `01/15/24`.
pub fn parse_expense_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }

    // Two-digit years first: %Y would read "24" as year 24
    let formats = [
        "%m/%d/%y", // 01/15/24
        "%m/%d/%Y", // 01/15/2024
    ];
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse an amount string, handling currency symbols and thousands separators
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");
    cleaned.parse::<f64>().ok().filter(|a| a.is_finite())
}

fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(n.as_f64().unwrap_or(f64::NAN)),
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(parse_amount(&s).unwrap_or(f64::NAN)),
        Some(_) => Some(f64::NAN),
    })
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Accepted snapshot shapes: a bare array, `null`, or `{"transactions": ...}`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnapshot {
    List(Option<Vec<Value>>),
    Wrapped { transactions: Option<Vec<Value>> },
}

/// Parse a JSON snapshot of transactions.
///
/// A `null` snapshot is empty. Entries that are not JSON objects are skipped
/// with a warning so one bad row never hides the rest; a badly typed field
/// inside an object only affects the views that read that field.
pub fn parse_snapshot(json: &str) -> Result<Vec<Transaction>> {
    let raw: RawSnapshot = serde_json::from_str(json)?;
    Ok(collect_records(raw))
}

/// Read a JSON snapshot of transactions from `reader`
pub fn load_snapshot<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let raw: RawSnapshot = serde_json::from_reader(reader)?;
    Ok(collect_records(raw))
}

fn collect_records(raw: RawSnapshot) -> Vec<Transaction> {
    let values = match raw {
        RawSnapshot::List(values) => values,
        RawSnapshot::Wrapped { transactions } => transactions,
    }
    .unwrap_or_default();

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            if !value.is_object() {
                warn!(index, "Skipping snapshot entry that is not an object");
                return None;
            }
            match serde_json::from_value::<Transaction>(value) {
                Ok(tx) => Some(tx),
                Err(e) => {
                    warn!(index, "Skipping malformed snapshot entry: {}", e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expense_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_expense_date("2024-01-15"), Some(expected));
        assert_eq!(parse_expense_date(" 2024-01-15 "), Some(expected));
        assert_eq!(parse_expense_date("2024-01-15T23:30:00Z"), Some(expected));
        assert_eq!(parse_expense_date("2024-01-15T08:00:00-05:00"), Some(expected));
        assert_eq!(parse_expense_date("2024-01-15T08:00:00.123"), Some(expected));
        assert_eq!(parse_expense_date("01/15/2024"), Some(expected));
        assert_eq!(parse_expense_date("01/15/24"), Some(expected));
    }

    #[test]
    fn test_parse_expense_date_rejects_garbage() {
        assert_eq!(parse_expense_date("not a date"), None);
        assert_eq!(parse_expense_date("2024-13-01"), None);
        assert_eq!(parse_expense_date(""), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("-123.45"), Some(-123.45));
        assert_eq!(parse_amount("(100.00)"), Some(-100.00));
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_checked_amount() {
        let mut tx = Transaction::new("t1", 12.5, "Food", "2024-01-01");
        assert_eq!(tx.checked_amount(), Ok(12.5));

        tx.amount = None;
        assert_eq!(tx.checked_amount(), Err(DataIssue::MissingAmount));

        tx.amount = Some(-3.0);
        assert_eq!(tx.checked_amount(), Err(DataIssue::InvalidAmount(-3.0)));

        tx.amount = Some(f64::INFINITY);
        assert!(tx.checked_amount().is_err());
    }

    #[test]
    fn test_checked_date() {
        let mut tx = Transaction::new("t1", 1.0, "Food", "2024-02-29");
        assert_eq!(
            tx.checked_date(),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );

        tx.expense_date = Some("   ".into());
        assert_eq!(tx.checked_date(), Err(DataIssue::MissingDate));

        tx.expense_date = Some("2023-02-29".into());
        assert_eq!(
            tx.checked_date(),
            Err(DataIssue::InvalidDate("2023-02-29".into()))
        );
    }

    #[test]
    fn test_category_or_default() {
        let mut tx = Transaction::new("t1", 1.0, "  Food ", "2024-01-01");
        assert_eq!(tx.category_or(DEFAULT_CATEGORY), "Food");

        tx.category = Some("".into());
        assert_eq!(tx.category_or(DEFAULT_CATEGORY), "Other");

        tx.category = None;
        assert_eq!(tx.category_or("Misc"), "Misc");
    }

    #[test]
    fn test_parse_snapshot_shapes() {
        assert!(parse_snapshot("null").unwrap().is_empty());
        assert!(parse_snapshot("[]").unwrap().is_empty());
        assert!(parse_snapshot(r#"{"transactions": null}"#)
            .unwrap()
            .is_empty());

        let wrapped = parse_snapshot(
            r#"{"transactions": [{"id": "a", "amount": 5, "category": "Food", "expenseDate": "2024-01-02"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].expense_date.as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_parse_snapshot_lenient_amounts() {
        let txns = parse_snapshot(
            r#"[
                {"id": "a", "amount": "42.50"},
                {"id": "b", "amount": "lots"},
                {"id": "c", "amount": null},
                {"id": "d"},
                {"id": "e", "amount": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(txns.len(), 5);
        assert_eq!(txns[0].amount, Some(42.5));
        assert!(txns[1].amount.unwrap().is_nan());
        assert_eq!(txns[2].amount, None);
        assert_eq!(txns[3].amount, None);
        assert!(matches!(
            txns[4].checked_amount(),
            Err(DataIssue::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_parse_snapshot_skips_malformed_entries() {
        let txns = parse_snapshot(
            r#"[{"id": "a", "amount": 1}, 17, "junk", {"id": "b", "amount": 2}]"#,
        )
        .unwrap();
        let ids: Vec<&str> = txns.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_badly_typed_fields_keep_the_record() {
        let txns = parse_snapshot(
            r#"[
                {"id": "a", "amount": 10, "category": "Food", "expenseDate": "2024-01-02"},
                {"id": "b", "amount": 25, "category": "Food", "expenseDate": 20240102},
                {"id": "c", "amount": 40, "category": 7, "expenseDate": "2024-01-03"},
                {"id": 4, "amount": 5, "category": "Food", "expenseDate": {}, "merchant": false}
            ]"#,
        )
        .unwrap();

        assert_eq!(txns.len(), 4);
        assert_eq!(
            txns[1].checked_date(),
            Err(DataIssue::InvalidDate("20240102".into()))
        );
        assert_eq!(txns[2].category, None);
        assert_eq!(txns[2].category_or(DEFAULT_CATEGORY), "Other");
        assert_eq!(txns[3].id, "4");
        assert_eq!(txns[3].merchant, None);
        assert!(matches!(txns[3].checked_date(), Err(DataIssue::InvalidDate(_))));

        // Amounts still reach the views that do not need the broken field
        let totals = crate::aggregate::compute_category_totals(&txns);
        assert_eq!(totals.total, 80.0);
        assert_eq!(totals.get("Food"), Some(40.0));
        assert_eq!(totals.get("Other"), Some(40.0));
        let usage = crate::aggregate::compute_budget_usage(&txns, 1000.0).unwrap();
        assert_eq!(usage.current, 80.0);

        // Date-based views skip them
        let series = crate::aggregate::compute_monthly_series(&txns);
        assert_eq!(series.outflow[0], 50.0);
    }

    #[test]
    fn test_parse_snapshot_rejects_non_json() {
        assert!(parse_snapshot("{not json").is_err());
    }
}
