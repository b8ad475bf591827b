//! The staged, not yet persisted, transaction.

use std::str::FromStr;

use api_types::transaction::{TransactionKind, TransactionNew};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Longest description the ledger service stores.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("\"{0}\" is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Primitive-shape problems of a single field.
///
/// Reported for display only: submission does not consult them.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FormIssue {
    #[error("amount is required")]
    AmountMissing,
    #[error("amount is not a number")]
    AmountNotNumeric,
    #[error("amount must not be negative")]
    AmountNegative,
    #[error("description is required")]
    DescriptionEmpty,
    #[error("description is longer than {} characters", DESCRIPTION_MAX_CHARS)]
    DescriptionTooLong,
}

/// Candidate transaction as typed by the user.
///
/// `amount` stays free text until [`FormState::candidate`] coerces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormState {
    kind: TransactionKind,
    amount: String,
    description: String,
    entry_date: NaiveDate,
}

impl FormState {
    /// The default record: an empty expense dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            kind: TransactionKind::Expense,
            amount: String::new(),
            description: String::new(),
            entry_date: today,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn entry_date(&self) -> NaiveDate {
        self.entry_date
    }

    pub fn set_kind(&mut self, kind: TransactionKind) {
        self.kind = kind;
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_entry_date(&mut self, entry_date: NaiveDate) {
        self.entry_date = entry_date;
    }

    /// Sets the date from ISO text; invalid text leaves the field untouched.
    pub fn set_entry_date_str(&mut self, entry_date: &str) -> Result<(), FormError> {
        let parsed = NaiveDate::parse_from_str(entry_date.trim(), "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(entry_date.to_string()))?;
        self.entry_date = parsed;
        Ok(())
    }

    /// Replaces the whole record with the defaults.
    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }

    pub fn issues(&self) -> Vec<FormIssue> {
        let mut issues = Vec::new();

        if self.amount.trim().is_empty() {
            issues.push(FormIssue::AmountMissing);
        } else {
            match parse_amount(&self.amount) {
                Some(amount) if amount < Decimal::ZERO => issues.push(FormIssue::AmountNegative),
                Some(_) => {}
                None => issues.push(FormIssue::AmountNotNumeric),
            }
        }

        let description = self.description.trim();
        if description.is_empty() {
            issues.push(FormIssue::DescriptionEmpty);
        } else if description.chars().count() > DESCRIPTION_MAX_CHARS {
            issues.push(FormIssue::DescriptionTooLong);
        }

        issues
    }

    /// Builds the create payload, coercing the amount text to a number.
    pub fn candidate(&self) -> TransactionNew {
        let amount = coerce_amount(&self.amount);
        if amount.is_none() {
            tracing::warn!(
                amount = %self.amount,
                "amount is not numeric, sending it without a value"
            );
        }

        TransactionNew {
            kind: self.kind,
            amount,
            description: self.description.clone(),
            entry_date: self.entry_date,
        }
    }
}

/// Numeric coercion of the amount field.
///
/// Blank text counts as zero; text that is not a number yields `None`.
pub fn coerce_amount(text: &str) -> Option<Decimal> {
    if text.trim().is_empty() {
        return Some(Decimal::ZERO);
    }
    parse_amount(text)
}

fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.contains('_') {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
