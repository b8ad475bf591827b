//! Terminal front end: drives a [`SyncController`] and prints what it holds.

use std::io::Write;

use api_types::{
    summary::{BalanceTone, Summary},
    transaction::TransactionKind,
};

use crate::{
    cache::LedgerCache,
    client::Ledger,
    error::{AppError, Result},
    sync::SyncController,
};

/// Fields of a new entry as given on the command line.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub kind: TransactionKind,
    pub amount: String,
    pub description: String,
    pub date: Option<String>,
}

pub async fn show<L: Ledger>(
    controller: &SyncController<L>,
    kind: Option<TransactionKind>,
    out: &mut impl Write,
) -> Result<()> {
    controller.initialize().await?;

    let cache = controller.cache();
    write_summary(out, cache.summary())?;
    write_transactions(out, &cache, kind)?;
    Ok(())
}

pub async fn add<L: Ledger>(
    controller: &SyncController<L>,
    entry: NewEntry,
    out: &mut impl Write,
) -> Result<()> {
    // A failed first load does not block the save.
    if let Err(err) = controller.initialize().await {
        tracing::warn!("{err}");
    }

    controller.edit_form(|form| -> Result<()> {
        form.set_kind(entry.kind);
        form.set_amount(entry.amount);
        form.set_description(entry.description);
        if let Some(date) = entry.date.as_deref() {
            form.set_entry_date_str(date)
                .map_err(|err| AppError::InvalidInput(err.to_string()))?;
        }
        Ok(())
    })?;

    for issue in controller.form().issues() {
        tracing::warn!("{issue}");
    }

    controller.submit().await?;

    writeln!(out, "Saved.")?;
    write_summary(out, controller.cache().summary())?;
    Ok(())
}

fn write_summary(out: &mut impl Write, summary: &Summary) -> Result<()> {
    let tone = match summary.tone() {
        BalanceTone::Positive => "positive",
        BalanceTone::Negative => "negative",
        BalanceTone::Neutral => "neutral",
    };
    writeln!(out, "Balance:  {:>12.2} ({tone})", summary.balance)?;
    writeln!(out, "Income:   {:>12.2}", summary.income_total)?;
    writeln!(out, "Expenses: {:>12.2}", summary.expense_total)?;
    Ok(())
}

fn write_transactions(
    out: &mut impl Write,
    cache: &LedgerCache,
    kind: Option<TransactionKind>,
) -> Result<()> {
    writeln!(out)?;
    if cache.is_empty() {
        writeln!(out, "No transactions recorded yet.")?;
        return Ok(());
    }

    let rows: Vec<_> = match kind {
        Some(kind) => cache.of_kind(kind).collect(),
        None => cache.transactions().iter().collect(),
    };
    for tx in rows {
        writeln!(
            out,
            "{:<10} {:<8} {:>12.2}  {}",
            tx.entry_date, tx.kind, tx.amount, tx.description
        )?;
    }
    Ok(())
}
