//! Synchronization between the local slices and the ledger service.
//!
//! [`SyncController`] owns three independent pieces of state:
//!
//! - the [`FormState`] being edited,
//! - the [`LedgerCache`] last adopted from the service,
//! - the [`Status`] (`loading` and the last error message).
//!
//! Every operation takes `&self` and is meant to run on one cooperative
//! executor. State is kept in `RefCell`s that are never borrowed across an
//! `.await`, so a [`refresh`](SyncController::refresh) and a
//! [`submit`](SyncController::submit) may overlap. There is no cancellation:
//! when two operations race, the cache holds whatever the last one to finish
//! adopted.

use std::{
    cell::{Cell, RefCell},
    fmt,
};

use chrono::{NaiveDate, Utc};

use crate::{cache::LedgerCache, client::Ledger, form::FormState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Refresh,
    Submit,
}

/// The only failure signal that leaves the controller.
///
/// Transport errors, rejections and malformed responses all collapse into
/// this; the detail is logged, not returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncFailure {
    operation: Operation,
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for SyncFailure {}

impl SyncFailure {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// User facing text recorded in [`Status::error`].
    pub fn message(&self) -> &'static str {
        match self.operation {
            Operation::Refresh => "Could not load the ledger.",
            Operation::Submit => "Could not save the transaction.",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Status {
    /// `true` while at least one refresh is in flight.
    pub loading: bool,
    pub error: Option<String>,
}

type Today = Box<dyn Fn() -> NaiveDate>;

pub struct SyncControllerBuilder<L> {
    ledger: L,
    today: Option<Today>,
}

impl<L: Ledger> SyncControllerBuilder<L> {
    /// Source of "today" for the default form record.
    pub fn today(mut self, today: impl Fn() -> NaiveDate + 'static) -> Self {
        self.today = Some(Box::new(today));
        self
    }

    pub fn build(self) -> SyncController<L> {
        let today: Today = match self.today {
            Some(today) => today,
            None => Box::new(|| Utc::now().date_naive()),
        };
        let form = FormState::new(today());

        SyncController {
            ledger: self.ledger,
            today,
            form: RefCell::new(form),
            cache: RefCell::new(LedgerCache::default()),
            error: RefCell::new(None),
            in_flight: Cell::new(0),
            initialized: Cell::new(false),
        }
    }
}

pub struct SyncController<L> {
    ledger: L,
    today: Today,
    form: RefCell<FormState>,
    cache: RefCell<LedgerCache>,
    error: RefCell<Option<String>>,
    in_flight: Cell<usize>,
    initialized: Cell<bool>,
}

/// Keeps `loading` up while a refresh runs, even if its future is dropped.
struct InFlight<'a>(&'a Cell<usize>);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a Cell<usize>) -> Self {
        counter.set(counter.get() + 1);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl<L: Ledger> SyncController<L> {
    pub fn builder(ledger: L) -> SyncControllerBuilder<L> {
        SyncControllerBuilder {
            ledger,
            today: None,
        }
    }

    /// Snapshot of the staged candidate.
    pub fn form(&self) -> FormState {
        self.form.borrow().clone()
    }

    /// Applies a user edit to the staged candidate.
    ///
    /// The closure works on a copy that is written back afterwards, so it may
    /// read the controller itself.
    pub fn edit_form<R>(&self, edit: impl FnOnce(&mut FormState) -> R) -> R {
        let mut form = self.form();
        let out = edit(&mut form);
        *self.form.borrow_mut() = form;
        out
    }

    /// Snapshot of the cached ledger.
    pub fn cache(&self) -> LedgerCache {
        self.cache.borrow().clone()
    }

    pub fn status(&self) -> Status {
        Status {
            loading: self.in_flight.get() > 0,
            error: self.error.borrow().clone(),
        }
    }

    /// Session start: runs the first refresh. Later calls do nothing.
    pub async fn initialize(&self) -> Result<(), SyncFailure> {
        if self.initialized.replace(true) {
            tracing::warn!("controller already initialized, skipping refresh");
            return Ok(());
        }
        self.refresh().await
    }

    /// Reloads the transaction list and the summary.
    ///
    /// Both reads are issued together and both are awaited. The cache is
    /// replaced only when both succeed; otherwise it keeps its previous value
    /// in full and an error is recorded.
    pub async fn refresh(&self) -> Result<(), SyncFailure> {
        self.clear_error();
        let _loading = InFlight::enter(&self.in_flight);

        let (transactions, summary) =
            tokio::join!(self.ledger.list_transactions(), self.ledger.summary());

        match (transactions, summary) {
            (Ok(transactions), Ok(summary)) => {
                tracing::info!(
                    transactions = transactions.len(),
                    balance = %summary.balance,
                    "ledger refreshed"
                );
                self.cache.borrow_mut().replace(transactions, summary);
                Ok(())
            }
            (transactions, summary) => {
                if let Err(err) = transactions {
                    tracing::warn!("failed to load transactions: {err}");
                }
                if let Err(err) = summary {
                    tracing::warn!("failed to load summary: {err}");
                }
                Err(self.fail(Operation::Refresh))
            }
        }
    }

    /// Sends the staged candidate to the service.
    ///
    /// On success the form goes back to its defaults and the cache is
    /// reloaded; the created resource itself is never adopted. On failure the
    /// form is left as typed. Nothing is retried.
    pub async fn submit(&self) -> Result<(), SyncFailure> {
        self.clear_error();
        let candidate = self.form.borrow().candidate();

        if let Err(err) = self.ledger.create_transaction(&candidate).await {
            tracing::warn!("failed to save transaction: {err}");
            return Err(self.fail(Operation::Submit));
        }

        tracing::debug!(kind = %candidate.kind, "transaction saved");
        self.form.borrow_mut().reset((self.today)());
        self.refresh().await
    }

    fn clear_error(&self) {
        self.error.borrow_mut().take();
    }

    fn fail(&self, operation: Operation) -> SyncFailure {
        let failure = SyncFailure { operation };
        *self.error.borrow_mut() = Some(failure.message().to_string());
        failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_names_the_operation_only() {
        let refresh = SyncFailure {
            operation: Operation::Refresh,
        };
        let submit = SyncFailure {
            operation: Operation::Submit,
        };

        assert_eq!(refresh.to_string(), "Could not load the ledger.");
        assert_eq!(submit.to_string(), "Could not save the transaction.");
        assert_eq!(submit.operation(), Operation::Submit);
    }

    #[test]
    fn in_flight_guard_counts_overlaps() {
        let counter = Cell::new(0);
        let first = InFlight::enter(&counter);
        let second = InFlight::enter(&counter);
        assert_eq!(counter.get(), 2);

        drop(first);
        assert_eq!(counter.get(), 1);
        drop(second);
        assert_eq!(counter.get(), 0);
    }
}
