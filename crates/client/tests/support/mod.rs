//! In-memory ledger service used by the sync tests.
//!
//! It keeps its own transactions and computes the summary from them, like the
//! real service. Reads capture the state when they are issued and can be held
//! back with [`MemoryLedger::hold_reads`] to force a completion order.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use api_types::{
    summary::Summary,
    transaction::{Transaction, TransactionId, TransactionKind, TransactionNew},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendly_client::{ClientError, Ledger};
use tokio::sync::watch;

#[derive(Debug, Default)]
struct Inner {
    transactions: Vec<Transaction>,
    next_id: i64,
    fail_list: bool,
    fail_summary: bool,
    fail_create: bool,
    creates: Vec<TransactionNew>,
    list_calls: usize,
    summary_calls: usize,
    reads_to_hold: usize,
    held_reads: usize,
    gate: Option<watch::Receiver<bool>>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    inner: Arc<Mutex<Inner>>,
    held: Arc<tokio::sync::Notify>,
}

/// Opens the reads captured by [`MemoryLedger::hold_reads`].
pub struct Gate(watch::Sender<bool>);

impl Gate {
    pub fn release(&self) {
        let _ = self.0.send(true);
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(entries: &[(TransactionKind, i64, &str)]) -> Self {
        let ledger = Self::new();
        for (kind, amount, description) in entries {
            ledger.insert(*kind, Decimal::from(*amount), description);
        }
        ledger
    }

    /// Adds an entry as if another client had created it.
    pub fn insert(&self, kind: TransactionKind, amount: Decimal, description: &str) {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.transactions.push(Transaction {
            id: TransactionId::Number(id),
            kind,
            amount,
            description: description.to_string(),
            entry_date: day(),
        });
    }

    pub fn fail_list(&self, fail: bool) {
        self.lock().fail_list = fail;
    }

    pub fn fail_summary(&self, fail: bool) {
        self.lock().fail_summary = fail;
    }

    pub fn fail_create(&self, fail: bool) {
        self.lock().fail_create = fail;
    }

    pub fn creates(&self) -> Vec<TransactionNew> {
        self.lock().creates.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    pub fn summary_calls(&self) -> usize {
        self.lock().summary_calls
    }

    /// Holds the next `count` reads until the returned gate is released.
    pub fn hold_reads(&self, count: usize) -> Gate {
        let (tx, rx) = watch::channel(false);
        let mut inner = self.lock();
        inner.reads_to_hold = count;
        inner.held_reads = 0;
        inner.gate = Some(rx);
        Gate(tx)
    }

    /// Waits until `count` reads are parked on the gate.
    pub async fn wait_held(&self, count: usize) {
        loop {
            let notified = self.held.notified();
            if self.lock().held_reads >= count {
                return;
            }
            notified.await;
        }
    }

    pub fn current_summary(&self) -> Summary {
        summarize(&self.lock().transactions)
    }

    pub fn current_transactions(&self) -> Vec<Transaction> {
        listed(&self.lock().transactions)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Registers a read and decides whether it must wait on the gate.
    fn begin_read(&self) -> Option<watch::Receiver<bool>> {
        let mut inner = self.lock();
        if inner.reads_to_hold == 0 {
            return None;
        }
        inner.reads_to_hold -= 1;
        inner.held_reads += 1;
        let gate = inner.gate.clone();
        drop(inner);
        self.held.notify_waiters();
        gate
    }
}

async fn wait_gate(gate: Option<watch::Receiver<bool>>) {
    if let Some(mut gate) = gate {
        let _ = gate.wait_for(|open| *open).await;
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn list_transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        let snapshot = {
            let mut inner = self.lock();
            inner.list_calls += 1;
            if inner.fail_list {
                Err(rejected())
            } else {
                Ok(listed(&inner.transactions))
            }
        };
        wait_gate(self.begin_read()).await;
        snapshot
    }

    async fn summary(&self) -> Result<Summary, ClientError> {
        let snapshot = {
            let mut inner = self.lock();
            inner.summary_calls += 1;
            if inner.fail_summary {
                Err(rejected())
            } else {
                Ok(summarize(&inner.transactions))
            }
        };
        wait_gate(self.begin_read()).await;
        snapshot
    }

    async fn create_transaction(&self, payload: &TransactionNew) -> Result<(), ClientError> {
        let mut inner = self.lock();
        inner.creates.push(payload.clone());
        if inner.fail_create {
            return Err(ClientError::Rejected {
                status: 422,
                message: "validation failed".to_string(),
            });
        }
        let Some(amount) = payload.amount else {
            return Err(ClientError::Rejected {
                status: 422,
                message: "amount must be a number".to_string(),
            });
        };
        inner.next_id += 1;
        let id = inner.next_id;
        inner.transactions.push(Transaction {
            id: TransactionId::Number(id),
            kind: payload.kind,
            amount,
            description: payload.description.clone(),
            entry_date: payload.entry_date,
        });
        Ok(())
    }
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

fn rejected() -> ClientError {
    ClientError::Rejected {
        status: 500,
        message: "internal server error".to_string(),
    }
}

/// Newest first, like the service lists them.
fn listed(transactions: &[Transaction]) -> Vec<Transaction> {
    let mut listed = transactions.to_vec();
    listed.reverse();
    listed.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
    listed
}

fn summarize(transactions: &[Transaction]) -> Summary {
    let total = |kind: TransactionKind| -> Decimal {
        transactions
            .iter()
            .filter(|tx| tx.kind == kind)
            .map(|tx| tx.amount)
            .sum()
    };
    let income_total = total(TransactionKind::Income);
    let expense_total = total(TransactionKind::Expense);
    Summary {
        income_total,
        expense_total,
        balance: income_total - expense_total,
    }
}
