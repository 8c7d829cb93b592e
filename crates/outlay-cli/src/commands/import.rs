//! Statement import command

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use outlay_core::intake::parse_statement;
use outlay_core::{CategoryClassifier, EngineConfig, ReviewBatch};
use tracing::info;

use super::{print_json, truncate};

/// Parse a statement, reject the listed rows and print the rest as transactions
pub fn cmd_import(
    out: &mut impl Write,
    config: &EngineConfig,
    file: &Path,
    reject: &[u32],
    json: bool,
) -> Result<()> {
    let classifier = CategoryClassifier::new(&config.rules, &config.default_category)
        .context("Invalid classifier rules")?;
    let reader =
        File::open(file).with_context(|| format!("Failed to open statement {}", file.display()))?;
    let drafts = parse_statement(reader, &classifier)
        .with_context(|| format!("Failed to parse statement {}", file.display()))?;

    let mut batch = ReviewBatch::new(drafts);
    for &id in reject {
        let approved = batch
            .drafts()
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.approved)
            .with_context(|| format!("No statement row with id {}", id))?;
        if approved {
            batch.toggle(id)?;
        }
    }

    let transactions = batch
        .finalize()
        .context("Approved rows failed validation")?;
    info!(
        "Imported {} of {} statement rows",
        transactions.len(),
        batch.drafts().len()
    );

    if !json {
        writeln!(out)?;
        writeln!(out, "📥 Statement Review: {}", file.display())?;
        writeln!(
            out,
            "   {:>4} │ {:10} │ {:30} │ {:>10} │ {:15} │ {}",
            "ID", "Date", "Description", "Amount", "Category", "OK"
        )?;
        writeln!(out, "   ─────┼────────────┼────────────────────────────────┼────────────┼─────────────────┼───")?;
        for draft in batch.drafts() {
            writeln!(
                out,
                "   {:>4} │ {:10} │ {:30} │ {:>10.2} │ {:15} │ {}",
                draft.id,
                draft.date,
                truncate(&draft.desc, 30),
                draft.amount,
                truncate(&draft.cat, 15),
                if draft.approved { "✓" } else { "✗" }
            )?;
        }
        writeln!(out)?;
    }

    print_json(out, &transactions)
}
