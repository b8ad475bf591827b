//! Spendly ledger client.
//!
//! Keeps a local copy of a remote ledger (transactions plus the summary the
//! service computes) and stages new entries before they are sent. See
//! [`sync::SyncController`] for how the two are kept in step.

pub mod cache;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod form;
pub mod sync;

pub use cache::LedgerCache;
pub use client::{Client, ClientError, Ledger};
pub use error::{AppError, Result};
pub use form::{FormError, FormIssue, FormState};
pub use sync::{Operation, Status, SyncController, SyncFailure};
