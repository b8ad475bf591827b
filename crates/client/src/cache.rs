use api_types::{
    summary::Summary,
    transaction::{Transaction, TransactionKind},
};

/// Last synchronized copy of the ledger and its summary.
///
/// Both halves are only ever replaced together; nothing here adds, removes
/// or re-totals entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerCache {
    transactions: Vec<Transaction>,
    summary: Summary,
    synced: bool,
}

impl LedgerCache {
    /// Transactions in the order the service listed them.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// `false` until the first successful refresh.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn of_kind(&self, kind: TransactionKind) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(move |tx| tx.kind == kind)
    }

    pub(crate) fn replace(&mut self, transactions: Vec<Transaction>, summary: Summary) {
        self.transactions = transactions;
        self.summary = summary;
        self.synced = true;
    }
}
