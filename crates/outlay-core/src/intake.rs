//! Transaction intake: manual entries and uploaded statements
//!
//! Statements go through a review step before they become transactions:
//! `parse_statement` produces approved drafts, the user toggles or edits them,
//! and `ReviewBatch::finalize` turns the approved drafts into records with
//! stable ids, so importing the same statement twice yields the same ids.

use std::collections::HashMap;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::ClassifierRule;
use crate::error::{Error, Result};
use crate::models::{parse_amount, parse_expense_date, Transaction, DEFAULT_CATEGORY};

/// A manual entry exactly as typed into the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualEntry {
    pub date: String,
    pub desc: String,
    pub amount: String,
    pub cat: String,
}

impl ManualEntry {
    /// Validate the entry and build a transaction.
    ///
    /// The id depends only on the entry, so two identical entries get the
    /// same id; use [`manual_transactions`] or
    /// [`ManualEntry::into_transaction_with`] to keep repeats apart.
    pub fn into_transaction(&self) -> Result<Transaction> {
        self.into_transaction_with(&mut IdAllocator::new())
    }

    /// Validate the entry and build a transaction with an id from `ids`
    pub fn into_transaction_with(&self, ids: &mut IdAllocator) -> Result<Transaction> {
        let date = parse_expense_date(&self.date)
            .ok_or_else(|| Error::InvalidData(format!("Unable to parse date: {}", self.date)))?;
        let amount = parse_amount(&self.amount)
            .ok_or_else(|| Error::InvalidData(format!("Unable to parse amount: {}", self.amount)))?;
        if amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "Amount must not be negative: {}",
                self.amount
            )));
        }

        let desc = self.desc.trim();
        let category = match self.cat.trim() {
            "" => DEFAULT_CATEGORY,
            c => c,
        };
        let date = date.format("%Y-%m-%d").to_string();

        Ok(Transaction {
            id: ids.next_id(&date, desc, amount),
            amount: Some(amount),
            category: Some(category.to_string()),
            expense_date: Some(date),
            description: (!desc.is_empty()).then(|| desc.to_string()),
            merchant: None,
        })
    }
}

/// Convert manual entries in order; repeated entries get distinct ids
pub fn manual_transactions(entries: &[ManualEntry]) -> Result<Vec<Transaction>> {
    let mut ids = IdAllocator::new();
    entries
        .iter()
        .map(|entry| entry.into_transaction_with(&mut ids))
        .collect()
}

/// Hands out stable ids for records created here.
///
/// The first record with a given date, description and amount gets the plain
/// hash; later repeats mix in their occurrence number.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    seen: HashMap<String, u32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, date: &str, description: &str, amount: f64) -> String {
        let base = stable_id(date, description, amount, 0);
        let occurrence = self.seen.entry(base.clone()).or_insert(0);
        let id = if *occurrence == 0 {
            base
        } else {
            stable_id(date, description, amount, *occurrence)
        };
        *occurrence += 1;
        id
    }
}

/// A parsed statement row awaiting approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewTransaction {
    pub id: u32,
    pub date: String,
    pub desc: String,
    pub amount: f64,
    pub cat: String,
    pub approved: bool,
}

/// An edit to one field of a draft
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewField {
    Date(String),
    Desc(String),
    Amount(f64),
    Cat(String),
}

/// Keyword fallbacks used when no rule or statement category applies
const KEYWORD_CATEGORIES: &[(&[&str], &str)] = &[
    (&["NETFLIX", "SPOTIFY", "HULU", "DISNEY+"], "Subscriptions"),
    (
        &["STARBUCKS", "CAFE", "RESTAURANT", "GROCERY", "WHOLE FOODS", "WHOLEFDS", "TRADER JOE"],
        "Food",
    ),
    (
        &["UBER", "LYFT", "SHELL", "CHEVRON", "EXXON", "PARKING", "TRANSIT"],
        "Transport",
    ),
    (&["RENT", "MORTGAGE", "HOA"], "Housing"),
    (
        &["ELECTRIC", "WATER", "COMCAST", "VERIZON", "AT&T", "INTERNET"],
        "Utilities",
    ),
    (&["AMAZON", "COSTCO", "WALMART", "WAL-MART", "TARGET"], "Shopping"),
];

/// Assigns categories to statement descriptions.
///
/// Order: configured regex rules, the statement's own category column, the
/// built-in keyword table, then the default category.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<(Regex, String)>,
    default_category: String,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl CategoryClassifier {
    pub fn new(rules: &[ClassifierRule], default_category: &str) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|r| Ok((Regex::new(&r.pattern)?, r.category.clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rules,
            default_category: default_category.to_string(),
        })
    }

    /// Category for a statement row: first matching rule, then the
    /// statement's own category, then a whole-word keyword, then the default
    pub fn classify(&self, description: &str, statement_category: Option<&str>) -> String {
        if let Some((_, category)) = self.rules.iter().find(|(re, _)| re.is_match(description)) {
            return category.clone();
        }
        if let Some(category) = statement_category.map(str::trim).filter(|c| !c.is_empty()) {
            return category.to_string();
        }
        let upper = description.to_uppercase();
        KEYWORD_CATEGORIES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| contains_word(&upper, k)))
            .map(|(_, category)| category.to_string())
            .unwrap_or_else(|| self.default_category.clone())
    }
}

/// Whether `keyword` occurs in `haystack` with no letter or digit on either side
fn contains_word(haystack: &str, keyword: &str) -> bool {
    haystack.match_indices(keyword).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Column positions of a statement, found by header name
struct StatementColumns {
    date: usize,
    desc: usize,
    amount: usize,
    category: Option<usize>,
}

impl StatementColumns {
    fn detect(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let missing = |name: &str| Error::Import(format!("Statement has no {} column", name));

        Ok(Self {
            date: find(&["date", "transaction date", "posted date"]).ok_or_else(|| missing("date"))?,
            desc: find(&["description", "desc", "merchant", "payee"])
                .ok_or_else(|| missing("description"))?,
            amount: find(&["amount", "debit"]).ok_or_else(|| missing("amount"))?,
            category: find(&["category", "cat"]),
        })
    }
}

/// Parse a CSV statement into review drafts.
///
/// Charges may be signed either way; the absolute value is the expense.
/// Rows with an unreadable date or amount are skipped with a warning.
pub fn parse_statement<R: Read>(
    reader: R,
    classifier: &CategoryClassifier,
) -> Result<Vec<ReviewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = StatementColumns::detect(rdr.headers()?)?;
    let mut drafts = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("");

        let Some(date) = parse_expense_date(field(columns.date)) else {
            warn!(row = row + 1, "Skipping statement row: unparseable date '{}'", field(columns.date));
            continue;
        };
        let Some(amount) = parse_amount(field(columns.amount)) else {
            warn!(row = row + 1, "Skipping statement row: unparseable amount '{}'", field(columns.amount));
            continue;
        };

        let desc = field(columns.desc).to_string();
        let cat = classifier.classify(&desc, columns.category.map(field));

        drafts.push(ReviewTransaction {
            id: drafts.len() as u32 + 1,
            date: date.format("%Y-%m-%d").to_string(),
            desc,
            amount: amount.abs(),
            cat,
            approved: true,
        });
    }

    debug!(rows = drafts.len(), "Parsed statement");
    Ok(drafts)
}

/// Drafts under review
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewBatch {
    drafts: Vec<ReviewTransaction>,
}

impl ReviewBatch {
    pub fn new(drafts: Vec<ReviewTransaction>) -> Self {
        Self { drafts }
    }

    pub fn drafts(&self) -> &[ReviewTransaction] {
        &self.drafts
    }

    pub fn approved_count(&self) -> usize {
        self.drafts.iter().filter(|d| d.approved).count()
    }

    fn draft_mut(&mut self, id: u32) -> Result<&mut ReviewTransaction> {
        self.drafts
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::InvalidData(format!("No statement row with id {}", id)))
    }

    /// Flip approval of a draft; returns the new state
    pub fn toggle(&mut self, id: u32) -> Result<bool> {
        let draft = self.draft_mut(id)?;
        draft.approved = !draft.approved;
        Ok(draft.approved)
    }

    pub fn update(&mut self, id: u32, field: ReviewField) -> Result<()> {
        let draft = self.draft_mut(id)?;
        match field {
            ReviewField::Date(date) => draft.date = date,
            ReviewField::Desc(desc) => draft.desc = desc,
            ReviewField::Amount(amount) => draft.amount = amount,
            ReviewField::Cat(cat) => draft.cat = cat,
        }
        Ok(())
    }

    /// Convert the approved drafts to transactions.
    ///
    /// Fails on the first approved draft that an edit left invalid, so the
    /// user can fix it; unapproved drafts are never checked.
    pub fn finalize(&self) -> Result<Vec<Transaction>> {
        let mut ids = IdAllocator::new();
        let mut out = Vec::with_capacity(self.approved_count());

        for draft in self.drafts.iter().filter(|d| d.approved) {
            let date = parse_expense_date(&draft.date).ok_or_else(|| {
                Error::InvalidData(format!("Row {}: unable to parse date: {}", draft.id, draft.date))
            })?;
            if !draft.amount.is_finite() || draft.amount < 0.0 {
                return Err(Error::InvalidData(format!(
                    "Row {}: amount must be a non-negative number, got {}",
                    draft.id, draft.amount
                )));
            }

            let date = date.format("%Y-%m-%d").to_string();
            let id = ids.next_id(&date, &draft.desc, draft.amount);

            let desc = draft.desc.trim();
            out.push(Transaction {
                id,
                amount: Some(draft.amount),
                category: Some(draft.cat.clone()),
                expense_date: Some(date),
                description: (!desc.is_empty()).then(|| desc.to_string()),
                merchant: None,
            });
        }

        debug!(finalized = out.len(), total = self.drafts.len(), "Finalized review batch");
        Ok(out)
    }
}

/// Hex SHA-256 of the fields that identify a row; `occurrence` separates
/// identical rows within one statement
fn stable_id(date: &str, description: &str, amount: f64, occurrence: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_be_bytes());
    if occurrence > 0 {
        hasher.update(occurrence.to_be_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT: &str = "Date,Description,Amount
01/15/2024,NETFLIX.COM,-15.99
01/16/2024,UBER TRIP 1234,-23.10
01/17/2024,CORNER SHOP,\"$1,204.00\"
bad date,MYSTERY,-1.00
01/18/2024,LOST,abc";

    #[test]
    fn test_manual_entry_valid() {
        let entry = ManualEntry {
            date: "2024-03-05".into(),
            desc: " Wal-Mart ".into(),
            amount: "$42.10".into(),
            cat: "Shopping".into(),
        };
        let tx = entry.into_transaction().unwrap();
        assert_eq!(tx.amount, Some(42.10));
        assert_eq!(tx.expense_date.as_deref(), Some("2024-03-05"));
        assert_eq!(tx.description.as_deref(), Some("Wal-Mart"));
        assert_eq!(tx.category.as_deref(), Some("Shopping"));
        assert_eq!(tx.id.len(), 64);
        // Same entry, same id
        assert_eq!(entry.into_transaction().unwrap().id, tx.id);
    }

    #[test]
    fn test_repeated_manual_entries_get_distinct_ids() {
        let coffee = ManualEntry {
            date: "2024-03-05".into(),
            desc: "Coffee".into(),
            amount: "3.50".into(),
            cat: "Food".into(),
        };
        let txns = manual_transactions(&[coffee.clone(), coffee.clone()]).unwrap();

        assert_eq!(txns.len(), 2);
        assert_ne!(txns[0].id, txns[1].id);
        // The first keeps the plain id; converting again is deterministic
        assert_eq!(txns[0].id, coffee.into_transaction().unwrap().id);
        assert_eq!(manual_transactions(&[coffee.clone(), coffee]).unwrap(), txns);
    }

    #[test]
    fn test_manual_entry_invalid() {
        let base = ManualEntry {
            date: "2024-03-05".into(),
            desc: "x".into(),
            amount: "1".into(),
            cat: "".into(),
        };
        assert_eq!(
            base.into_transaction().unwrap().category.as_deref(),
            Some("Other")
        );

        let bad_date = ManualEntry {
            date: "".into(),
            ..base.clone()
        };
        assert!(matches!(
            bad_date.into_transaction().unwrap_err(),
            Error::InvalidData(_)
        ));

        let bad_amount = ManualEntry {
            amount: "ten".into(),
            ..base.clone()
        };
        assert!(bad_amount.into_transaction().is_err());

        let negative = ManualEntry {
            amount: "-5".into(),
            ..base
        };
        assert!(negative.into_transaction().is_err());
    }

    #[test]
    fn test_parse_statement() {
        let drafts = parse_statement(STATEMENT.as_bytes(), &CategoryClassifier::default()).unwrap();

        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].id, 1);
        assert_eq!(drafts[0].date, "2024-01-15");
        assert_eq!(drafts[0].amount, 15.99);
        assert_eq!(drafts[0].cat, "Subscriptions");
        assert_eq!(drafts[1].cat, "Transport");
        assert_eq!(drafts[2].amount, 1204.0);
        assert_eq!(drafts[2].cat, "Other");
        assert!(drafts.iter().all(|d| d.approved));
    }

    #[test]
    fn test_parse_statement_missing_column() {
        let err = parse_statement(
            "Date,Amount\n01/15/2024,5".as_bytes(),
            &CategoryClassifier::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }

    #[test]
    fn test_classifier_priority() {
        let rules = vec![ClassifierRule {
            pattern: "(?i)corner shop".into(),
            category: "Food".into(),
        }];
        let classifier = CategoryClassifier::new(&rules, "Misc").unwrap();

        // Rule beats everything
        assert_eq!(classifier.classify("CORNER SHOP", Some("Retail")), "Food");
        // Statement category beats keywords
        assert_eq!(classifier.classify("AMAZON MKTP", Some("Books")), "Books");
        // Keywords
        assert_eq!(classifier.classify("amazon mktp", None), "Shopping");
        assert_eq!(classifier.classify("Whole Foods #12", Some("  ")), "Food");
        // Fallback
        assert_eq!(classifier.classify("ZZZ", None), "Misc");
    }

    #[test]
    fn test_keywords_match_whole_words() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify("RENT JUNE", None), "Housing");
        assert_eq!(classifier.classify("NETFLIX.COM", None), "Subscriptions");
        assert_eq!(classifier.classify("Disney+ annual", None), "Subscriptions");
        assert_eq!(classifier.classify("AT&T WIRELESS", None), "Utilities");
        assert_eq!(classifier.classify("PARENTS DAY GIFT", None), "Other");
        assert_eq!(classifier.classify("CURRENT ACCOUNT FEE", None), "Other");
        assert_eq!(classifier.classify("SHOAL CREEK OUTFITTERS", None), "Other");
        assert_eq!(classifier.classify("SUBERB MARKET", None), "Other");
    }

    #[test]
    fn test_embedded_rules_match_whole_words() {
        let config = crate::config::EngineConfig::embedded().unwrap();
        let classifier = CategoryClassifier::new(&config.rules, &config.default_category).unwrap();
        assert_eq!(classifier.classify("Monthly rent", None), "Housing");
        assert_eq!(classifier.classify("MORTGAGE PMT 0042", None), "Housing");
        assert_eq!(classifier.classify("PARENTS DAY GIFT", None), "Other");
        assert_eq!(classifier.classify("CURRENT ACCOUNT FEE", Some("Fees")), "Fees");
        assert_eq!(classifier.classify("Uber *trip", None), "Transport");
    }

    #[test]
    fn test_statement_category_column() {
        let csv = "Transaction Date,Payee,Debit,Category\n2024-02-01,ACME,10.00,Office\n";
        let drafts = parse_statement(csv.as_bytes(), &CategoryClassifier::default()).unwrap();
        assert_eq!(drafts[0].cat, "Office");
        assert_eq!(drafts[0].desc, "ACME");
    }

    #[test]
    fn test_review_toggle_update_finalize() {
        let drafts = parse_statement(STATEMENT.as_bytes(), &CategoryClassifier::default()).unwrap();
        let mut batch = ReviewBatch::new(drafts);

        assert_eq!(batch.toggle(1).unwrap(), false);
        batch
            .update(3, ReviewField::Cat("Groceries".into()))
            .unwrap();
        assert_eq!(batch.approved_count(), 2);

        let txns = batch.finalize().unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description.as_deref(), Some("UBER TRIP 1234"));
        assert_eq!(txns[1].category.as_deref(), Some("Groceries"));

        assert!(batch.toggle(99).is_err());
    }

    #[test]
    fn test_finalize_rejects_bad_edit() {
        let drafts = parse_statement(STATEMENT.as_bytes(), &CategoryClassifier::default()).unwrap();
        let mut batch = ReviewBatch::new(drafts);
        batch
            .update(2, ReviewField::Date("the 16th".into()))
            .unwrap();
        assert!(matches!(batch.finalize().unwrap_err(), Error::InvalidData(_)));

        // Unapproving the broken row unblocks the rest
        batch.toggle(2).unwrap();
        assert_eq!(batch.finalize().unwrap().len(), 2);
    }

    #[test]
    fn test_finalize_ids_stable_and_unique() {
        let csv = "Date,Description,Amount\n2024-01-01,COFFEE,3.50\n2024-01-01,COFFEE,3.50\n";
        let batch = ReviewBatch::new(
            parse_statement(csv.as_bytes(), &CategoryClassifier::default()).unwrap(),
        );

        let first = batch.finalize().unwrap();
        let second = batch.finalize().unwrap();
        assert_ne!(first[0].id, first[1].id);
        assert_eq!(first, second);
    }
}
