// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::store::{ChangeFeed, RemoteError, RemoteStore};
use async_trait::async_trait;
use mirra_core::{Document, DocumentId, EntityKind, Fields, Query};
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any RemoteStore
#[derive(Clone)]
pub struct TracedRemoteStore<S> {
    inner: S,
}

impl<S> TracedRemoteStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Transient failures are expected while offline; everything else is an error
fn log_failure(err: &RemoteError, start: Instant, what: &str) {
    if err.is_transient() {
        tracing::warn!(elapsed_ms = elapsed_ms(start), error = %err, "{} failed", what);
    } else {
        tracing::error!(elapsed_ms = elapsed_ms(start), error = %err, "{} failed", what);
    }
}

#[async_trait]
impl<S: RemoteStore> RemoteStore for TracedRemoteStore<S> {
    async fn create_doc(
        &self,
        kind: &EntityKind,
        payload: Fields,
    ) -> Result<DocumentId, RemoteError> {
        let span = tracing::info_span!("remote.create", %kind);
        async {
            tracing::info!(field_count = payload.len(), "starting");
            let start = Instant::now();
            let result = self.inner.create_doc(kind, payload).await;
            match &result {
                Ok(id) => tracing::info!(%id, elapsed_ms = elapsed_ms(start), "created"),
                Err(e) => log_failure(e, start, "create"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn get_doc(
        &self,
        kind: &EntityKind,
        id: &DocumentId,
    ) -> Result<Option<Document>, RemoteError> {
        let span = tracing::debug_span!("remote.get", %kind, %id);
        async {
            let start = Instant::now();
            let result = self.inner.get_doc(kind, id).await;
            match &result {
                Ok(doc) => tracing::debug!(
                    found = doc.is_some(),
                    elapsed_ms = elapsed_ms(start),
                    "fetched"
                ),
                Err(e) => log_failure(e, start, "get"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn update_doc(
        &self,
        kind: &EntityKind,
        id: &DocumentId,
        partial: Fields,
    ) -> Result<(), RemoteError> {
        let span = tracing::info_span!("remote.update", %kind, %id);
        async {
            tracing::info!(field_count = partial.len(), "starting");
            let start = Instant::now();
            let result = self.inner.update_doc(kind, id, partial).await;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed_ms(start), "updated"),
                Err(e) => log_failure(e, start, "update"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete_doc(&self, kind: &EntityKind, id: &DocumentId) -> Result<(), RemoteError> {
        let span = tracing::info_span!("remote.delete", %kind, %id);
        async {
            let start = Instant::now();
            let result = self.inner.delete_doc(kind, id).await;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed_ms(start), "deleted"),
                Err(e) => log_failure(e, start, "delete"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn query(&self, kind: &EntityKind, query: &Query) -> Result<Vec<Document>, RemoteError> {
        let span = tracing::debug_span!("remote.query", %kind, filters = query.filters.len());
        async {
            let start = Instant::now();
            let result = self.inner.query(kind, query).await;
            match &result {
                Ok(docs) => tracing::debug!(
                    count = docs.len(),
                    elapsed_ms = elapsed_ms(start),
                    "queried"
                ),
                Err(e) => log_failure(e, start, "query"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn watch(&self, kind: &EntityKind, query: &Query) -> Result<ChangeFeed, RemoteError> {
        let span = tracing::info_span!("remote.watch", %kind, filters = query.filters.len());
        async {
            let start = Instant::now();
            let result = self.inner.watch(kind, query).await;
            match &result {
                Ok(_) => tracing::info!(elapsed_ms = elapsed_ms(start), "listening"),
                Err(e) => log_failure(e, start, "watch"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn reconnect(&self) -> Result<(), RemoteError> {
        let span = tracing::info_span!("remote.reconnect");
        async {
            let start = Instant::now();
            let result = self.inner.reconnect().await;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed_ms(start), "reconnected"),
                Err(e) => log_failure(e, start, "reconnect"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
