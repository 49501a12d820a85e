// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single entry point for document reads, writes, and subscriptions
//!
//! Writes pass rate limiting and schema validation before touching the remote
//! store, then update the mirror cache and queue an audit record. Reads prefer
//! the remote store and fall back to the mirror when it is unreachable. Write
//! failures are always surfaced; read failures never are.

use crate::audit::AuditLogWriter;
use crate::cache::MirrorCache;
use crate::connection::ConnectionTracker;
use crate::error::{AccessError, WriteOp};
use crate::rate_limiter::RateLimiter;
use crate::subscriptions::{SubscriptionHandle, SubscriptionManager, SubscriptionQuery};
use mirra_adapters::{RemoteError, RemoteStore};
use mirra_core::{
    AccessConfig, ActorId, AuditAction, AuditRecord, Clock, Cursor, Document, DocumentId,
    EntityKind, Fields, Page, PageRequest, Query, SchemaRegistry,
};
use std::future::Future;
use std::time::Duration;

/// Introspection snapshot for callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub online: bool,
    pub cache_size: usize,
}

/// Document access layer over a remote store.
///
/// Owns its cache, limiter, tracker, and subscriptions; separate instances
/// share nothing. Construct inside a tokio runtime.
pub struct DocumentAccess<S: RemoteStore, C: Clock> {
    store: S,
    clock: C,
    registry: SchemaRegistry,
    limiter: RateLimiter<C>,
    cache: MirrorCache<C>,
    tracker: ConnectionTracker,
    audit: AuditLogWriter,
    subscriptions: SubscriptionManager<S, C>,
    max_page_size: usize,
    remote_timeout: Duration,
}

impl<S: RemoteStore, C: Clock> DocumentAccess<S, C> {
    /// Build with the built-in lead, application, and user kinds
    pub fn new(store: S, clock: C, config: AccessConfig) -> Self {
        let registry = SchemaRegistry::with_builtin_kinds(&config);
        Self::with_registry(store, clock, registry, config)
    }

    pub fn with_registry(
        store: S,
        clock: C,
        registry: SchemaRegistry,
        config: AccessConfig,
    ) -> Self {
        let cache = MirrorCache::new(config.cache_capacity, clock.clone());
        let tracker = ConnectionTracker::new();
        let audit = AuditLogWriter::spawn(
            store.clone(),
            config.audit_queue_capacity,
            config.audit_collection.as_str(),
            config.remote_timeout,
        );
        let subscriptions = SubscriptionManager::new(
            store.clone(),
            cache.clone(),
            tracker.clone(),
            config.remote_timeout,
        );
        Self {
            limiter: RateLimiter::new(&config.rate_limit, clock.clone()),
            store,
            clock,
            registry,
            cache,
            tracker,
            audit,
            subscriptions,
            max_page_size: config.max_page_size.max(1),
            remote_timeout: config.remote_timeout,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &MirrorCache<C> {
        &self.cache
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    pub fn rate_limiter(&self) -> &RateLimiter<C> {
        &self.limiter
    }

    pub fn subscriptions(&self) -> &SubscriptionManager<S, C> {
        &self.subscriptions
    }

    /// Validate and create a document, returning its store-assigned id
    pub async fn create(
        &self,
        kind: &EntityKind,
        input: Fields,
        actor: Option<&ActorId>,
    ) -> Result<DocumentId, AccessError> {
        self.admit(actor)?;
        let fields = self.registry.standardize(kind, &input)?;

        self.ensure_connected().await;
        let id = self
            .remote(self.store.create_doc(kind, fields.clone()))
            .await
            .map_err(|e| AccessError::write(WriteOp::Create, kind, e))?;

        let now = self.clock.utc_now();
        let doc = Document::new(kind.clone(), id.clone(), fields).with_timestamps(now, now);
        let after = doc.to_payload();
        self.cache.put(doc);
        self.record_audit(AuditAction::Create, kind, &id, actor, None, Some(after));

        tracing::info!(%kind, %id, "document created");
        Ok(id)
    }

    /// Apply a sanitized partial update to an existing document
    pub async fn update(
        &self,
        kind: &EntityKind,
        id: &DocumentId,
        input: Fields,
        actor: Option<&ActorId>,
    ) -> Result<(), AccessError> {
        self.admit(actor)?;
        let before = self
            .fetch_current(kind, id)
            .await
            .map_err(|e| AccessError::write(WriteOp::Update, kind, e))?
            .ok_or_else(|| AccessError::DocumentNotFound {
                kind: kind.clone(),
                id: id.clone(),
            })?;
        let partial = self.registry.sanitize_partial(kind, &input)?;

        match self
            .remote(self.store.update_doc(kind, id, partial.clone()))
            .await
        {
            Ok(()) => {}
            Err(RemoteError::NotFound { kind, id }) => {
                self.cache.remove(&kind, &id);
                return Err(AccessError::DocumentNotFound { kind, id });
            }
            Err(e) => return Err(AccessError::write(WriteOp::Update, kind, e)),
        }

        let now = self.clock.utc_now();
        let mut after = before.clone();
        after.merge(&partial, now);
        if !self.cache.merge(kind, id, &partial, now) {
            self.cache.put(after.clone());
        }
        self.record_audit(
            AuditAction::Update,
            kind,
            id,
            actor,
            Some(before.to_payload()),
            Some(after.to_payload()),
        );

        tracing::info!(%kind, %id, fields = partial.len(), "document updated");
        Ok(())
    }

    /// Delete a document. Proceeds even if the prior state cannot be read,
    /// in which case the audit record carries the mirrored state, if any.
    pub async fn delete(
        &self,
        kind: &EntityKind,
        id: &DocumentId,
        actor: Option<&ActorId>,
    ) -> Result<(), AccessError> {
        self.admit(actor)?;
        let before = match self.fetch_current(kind, id).await {
            Ok(current) => current,
            Err(source) => {
                let err = AccessError::RemoteRead {
                    kind: kind.clone(),
                    source,
                };
                tracing::warn!(%id, error = %err, "prior state from cache");
                self.cache.get(kind, id)
            }
        };

        self.remote(self.store.delete_doc(kind, id))
            .await
            .map_err(|e| AccessError::write(WriteOp::Delete, kind, e))?;

        self.cache.remove(kind, id);
        self.record_audit(
            AuditAction::Delete,
            kind,
            id,
            actor,
            before.map(|doc| doc.to_payload()),
            None,
        );

        tracing::info!(%kind, %id, "document deleted");
        Ok(())
    }

    /// Read one document; served from the mirror while offline or on failure
    pub async fn get(&self, kind: &EntityKind, id: &DocumentId) -> Option<Document> {
        if !self.tracker.is_online() {
            tracing::debug!(%kind, %id, "offline, reading from cache");
            return self.cache.get(kind, id);
        }

        match self.remote(self.store.get_doc(kind, id)).await {
            Ok(Some(doc)) => {
                self.cache.put(doc.clone());
                Some(doc)
            }
            Ok(None) => {
                self.cache.remove(kind, id);
                None
            }
            Err(source) => {
                let err = AccessError::RemoteRead {
                    kind: kind.clone(),
                    source,
                };
                tracing::warn!(%id, error = %err, "falling back to cache");
                self.cache.get(kind, id)
            }
        }
    }

    /// Read one page of documents.
    ///
    /// The page size is clamped to `1..=max_page_size`. A full page carries a
    /// cursor for the next one. When the remote store cannot be reached the
    /// page is cut from the mirror instead, without a cursor.
    pub async fn get_many(&self, kind: &EntityKind, request: PageRequest) -> Page {
        let page_size = request.page_size.clamp(1, self.max_page_size);

        if self.ensure_connected().await {
            let query = Query::new()
                .filters(request.filters)
                .order(request.order)
                .limit(page_size)
                .after(request.cursor);
            match self.remote(self.store.query(kind, &query)).await {
                Ok(docs) => {
                    for doc in &docs {
                        self.cache.put(doc.clone());
                    }
                    let next_cursor = match docs.last() {
                        Some(last) if docs.len() == page_size => Some(Cursor(last.id.clone())),
                        _ => None,
                    };
                    return Page { docs, next_cursor };
                }
                Err(source) => {
                    let err = AccessError::RemoteRead {
                        kind: kind.clone(),
                        source,
                    };
                    tracing::warn!(error = %err, "falling back to cache");
                }
            }
        }

        let docs = self.cache.scan(kind).into_iter().take(page_size).collect();
        Page {
            docs,
            next_cursor: None,
        }
    }

    /// Open a live query under `cache_key`, replacing any existing one
    pub async fn subscribe<F>(
        &self,
        kind: &EntityKind,
        query: SubscriptionQuery,
        cache_key: impl Into<String>,
        on_change: F,
    ) -> SubscriptionHandle
    where
        F: FnMut(Vec<Document>) + Send + 'static,
    {
        self.subscriptions
            .subscribe(kind, query, cache_key, on_change)
            .await
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        ConnectionStatus {
            online: self.tracker.is_online(),
            cache_size: self.cache.len(),
        }
    }

    /// Stop every subscription and wait for queued audit records
    pub async fn shutdown(&self) {
        self.subscriptions.unsubscribe_all();
        self.audit.flush().await;
        tracing::info!("document access shut down");
    }

    fn admit(&self, actor: Option<&ActorId>) -> Result<(), AccessError> {
        match actor {
            Some(actor) if !self.limiter.admit(actor) => {
                tracing::warn!(%actor, "rate limit exceeded");
                Err(AccessError::RateLimitExceeded {
                    actor: actor.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Authoritative state ahead of a write. Reconnects first, so a recovered
    /// store is consulted even when the tracker still reports offline.
    async fn fetch_current(
        &self,
        kind: &EntityKind,
        id: &DocumentId,
    ) -> Result<Option<Document>, RemoteError> {
        self.ensure_connected().await;
        let current = self.remote(self.store.get_doc(kind, id)).await?;
        match &current {
            Some(doc) => self.cache.put(doc.clone()),
            None => {
                self.cache.remove(kind, id);
            }
        }
        Ok(current)
    }

    /// Try to come back online if a failure was seen. Returns whether online.
    async fn ensure_connected(&self) -> bool {
        if self.tracker.is_online() {
            return true;
        }
        self.tracker
            .reconnect_store(&self.store, self.remote_timeout)
            .await
    }

    /// Bound a remote call by the configured timeout; connectivity failures
    /// take the tracker offline.
    async fn remote<T>(
        &self,
        call: impl Future<Output = Result<T, RemoteError>>,
    ) -> Result<T, RemoteError> {
        let result = match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.remote_timeout)),
        };
        if let Err(e) = &result {
            if e.is_transient() {
                self.tracker.mark_unreachable();
            }
        }
        result
    }

    fn record_audit(
        &self,
        action: AuditAction,
        kind: &EntityKind,
        id: &DocumentId,
        actor: Option<&ActorId>,
        before: Option<Fields>,
        after: Option<Fields>,
    ) {
        self.audit.record(AuditRecord {
            action,
            kind: kind.clone(),
            document_id: id.clone(),
            actor: actor.cloned(),
            timestamp: self.clock.utc_now(),
            before,
            after,
        });
    }
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
