//! # Transaction Scope
//!
//! RAII guard around one host transaction. The transaction commits only on
//! an explicit [`TransactionScope::commit`]; every other exit path, early
//! return and `?` included, rolls it back.

use crate::domain::errors::DocumentError;
use crate::ports::HostDocument;
use hb_telemetry::{metric_inc, TRANSACTIONS_COMMITTED, TRANSACTIONS_ROLLED_BACK};
use tracing::{debug, warn};

pub struct TransactionScope<'a, D: HostDocument + ?Sized> {
    document: &'a mut D,
    name: &'static str,
    finished: bool,
}

impl<'a, D: HostDocument + ?Sized> TransactionScope<'a, D> {
    /// Start a transaction on `document`.
    pub fn start(document: &'a mut D, name: &'static str) -> Result<Self, DocumentError> {
        document.start_transaction(name)?;
        debug!(transaction = name, "Transaction started");
        Ok(Self {
            document,
            name,
            finished: false,
        })
    }

    /// The document, for writes inside the transaction.
    pub fn document(&mut self) -> &mut D {
        self.document
    }

    pub fn commit(mut self) -> Result<(), DocumentError> {
        self.finished = true;
        match self.document.commit_transaction() {
            Ok(()) => {
                metric_inc!(TRANSACTIONS_COMMITTED);
                debug!(transaction = self.name, "Transaction committed");
                Ok(())
            }
            Err(e) => {
                warn!(transaction = self.name, error = %e, "Commit failed, rolling back");
                self.rollback_quietly();
                Err(e)
            }
        }
    }

    pub fn rollback(mut self) -> Result<(), DocumentError> {
        self.finished = true;
        metric_inc!(TRANSACTIONS_ROLLED_BACK);
        debug!(transaction = self.name, "Transaction rolled back");
        self.document.rollback_transaction()
    }

    fn rollback_quietly(&mut self) {
        metric_inc!(TRANSACTIONS_ROLLED_BACK);
        if let Err(e) = self.document.rollback_transaction() {
            warn!(transaction = self.name, error = %e, "Rollback failed");
        }
    }
}

impl<D: HostDocument + ?Sized> Drop for TransactionScope<'_, D> {
    fn drop(&mut self) {
        if !self.finished {
            debug!(transaction = self.name, "Transaction scope dropped without commit");
            self.rollback_quietly();
        }
    }
}
