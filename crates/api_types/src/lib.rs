//! Wire types exchanged with the remote ledger service.
//!
//! Amounts travel as JSON numbers and are held as [`Decimal`] on this side;
//! dates travel as ISO 8601 calendar dates (`YYYY-MM-DD`).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod transaction {
    use std::fmt;

    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        #[default]
        Expense,
    }

    impl TransactionKind {
        /// Returns the canonical string used on the wire.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Income => "income",
                Self::Expense => "expense",
            }
        }
    }

    impl fmt::Display for TransactionKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.pad(self.as_str())
        }
    }

    /// Identifier assigned by the ledger service.
    ///
    /// The client never interprets it; both integer and string ids are
    /// accepted and written back in the same shape.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum TransactionId {
        Number(i64),
        Text(String),
    }

    impl fmt::Display for TransactionId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Number(id) => write!(f, "{id}"),
                Self::Text(id) => f.write_str(id),
            }
        }
    }

    /// A persisted ledger entry, as listed by `GET /transactions`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Transaction {
        pub id: TransactionId,
        pub kind: TransactionKind,
        /// Non-negative; the kind carries the sign.
        #[serde(with = "rust_decimal::serde::float")]
        pub amount: Decimal,
        pub description: String,
        pub entry_date: NaiveDate,
    }

    /// Request body for `POST /transactions`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub kind: TransactionKind,
        /// `None` when the typed amount is not a number; serialized as `null`
        /// and left to the service to reject.
        #[serde(with = "rust_decimal::serde::float_option")]
        pub amount: Option<Decimal>,
        pub description: String,
        pub entry_date: NaiveDate,
    }
}

pub mod summary {
    use std::cmp::Ordering;

    use super::*;

    /// Sign of the balance reported by the service.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum BalanceTone {
        Positive,
        Negative,
        Neutral,
    }

    /// Aggregate totals, as returned by `GET /summary`.
    ///
    /// The service computes every field from its full transaction set; the
    /// client treats the three values as read-only facts and never derives
    /// one from the others.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Summary {
        #[serde(with = "rust_decimal::serde::float")]
        pub income_total: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        pub expense_total: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        pub balance: Decimal,
    }

    impl Summary {
        pub fn tone(&self) -> BalanceTone {
            match self.balance.cmp(&Decimal::ZERO) {
                Ordering::Greater => BalanceTone::Positive,
                Ordering::Less => BalanceTone::Negative,
                Ordering::Equal => BalanceTone::Neutral,
            }
        }
    }
}
