// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort audit trail of mutations
//!
//! Records are queued on a bounded channel and written by a background task.
//! A full queue drops the record; a failed write is logged and forgotten.
//! Neither ever reaches the caller of the mutation.

use mirra_adapters::RemoteStore;
use mirra_core::{AuditRecord, EntityKind};
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

enum AuditMessage {
    Record(AuditRecord),
    /// Acknowledged once every record queued before it has been handled
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget writer for audit records
#[derive(Clone)]
pub struct AuditLogWriter {
    tx: mpsc::Sender<AuditMessage>,
}

impl AuditLogWriter {
    /// Start the background writer. Must be called within a tokio runtime.
    pub fn spawn<S: RemoteStore>(
        store: S,
        capacity: usize,
        collection: impl Into<EntityKind>,
        timeout: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(run(store, collection.into(), timeout, rx));
        Self { tx }
    }

    /// Queue a record without waiting. Returns false if it was dropped.
    pub fn record(&self, record: AuditRecord) -> bool {
        match self.tx.try_send(AuditMessage::Record(record)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("audit queue full, dropping record");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("audit writer stopped, dropping record");
                false
            }
        }
    }

    /// Wait until every record queued so far has been written or discarded
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(AuditMessage::Flush(done)).await.is_ok() {
            let _ = wait.await;
        }
    }
}

async fn run<S: RemoteStore>(
    store: S,
    collection: EntityKind,
    timeout: Duration,
    mut rx: mpsc::Receiver<AuditMessage>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            AuditMessage::Record(record) => {
                let action = record.action;
                let id = record.document_id.clone();
                let write = store.create_doc(&collection, record.to_fields());
                match tokio::time::timeout(timeout, write).await {
                    Ok(Ok(_)) => tracing::debug!(%action, %id, "audit record written"),
                    Ok(Err(e)) => {
                        tracing::warn!(%action, %id, error = %e, "audit write failed")
                    }
                    Err(_) => tracing::warn!(%action, %id, "audit write timed out"),
                }
            }
            AuditMessage::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
