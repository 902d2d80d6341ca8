//! Units of work over the shared connection.
//!
//! A [`Session`] is the persistence context for one request: it holds the
//! connection for as long as the caller keeps it and is passed explicitly
//! into every repository and service call. Mutations happen inside a
//! [`UnitOfWork`], which always ends its transaction when dropped, on every
//! exit path, according to its [`OnFailure`] policy.

use std::ops::Deref;
use std::sync::MutexGuard;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::Result;

/// What happens to a unit of work that is dropped without `commit()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Keep whatever was applied before the failure and release the transaction.
    Commit,
    /// Discard everything applied since `begin`.
    Rollback,
}

/// Request-scoped access to the store.
pub struct Session<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Session<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Connection for reads that do not need a transaction.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Start a unit of work.
    ///
    /// Transactions are opened `IMMEDIATE` so the write lock is held from the
    /// first lookup; another writer cannot slip in between a read and the
    /// write that depends on it.
    pub fn begin(&mut self, on_failure: OnFailure, label: &'static str) -> Result<UnitOfWork<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tracing::debug!(unit = label, "Began unit of work");

        Ok(UnitOfWork {
            tx: Some(tx),
            on_failure,
            label,
        })
    }
}

/// An open transaction. Derefs to the connection so queries run inside it.
pub struct UnitOfWork<'s> {
    tx: Option<Transaction<'s>>,
    on_failure: OnFailure,
    label: &'static str,
}

impl UnitOfWork<'_> {
    /// Finalize every mutation made since `begin`.
    pub fn commit(mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit()?;
            tracing::debug!(unit = self.label, "Committed unit of work");
        }
        Ok(())
    }
}

impl Deref for UnitOfWork<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.tx.as_ref().expect("unit of work already finished")
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        let outcome = match self.on_failure {
            OnFailure::Commit => {
                tracing::warn!(
                    unit = self.label,
                    "Unit of work ended early, committing applied changes"
                );
                tx.commit()
            }
            OnFailure::Rollback => {
                tracing::debug!(unit = self.label, "Unit of work ended early, rolling back");
                tx.rollback()
            }
        };

        if let Err(e) = outcome {
            tracing::error!(unit = self.label, "Failed to end unit of work: {}", e);
        }
    }
}
