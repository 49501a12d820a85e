// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory remote store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ChangeFeed, FeedEvent, FeedSender, RemoteError, RemoteStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mirra_core::{Document, DocumentId, EntityKind, Fields, IdGen, Query, SequentialIdGen};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create { kind: EntityKind },
    Get { kind: EntityKind, id: DocumentId },
    Update { kind: EntityKind, id: DocumentId },
    Delete { kind: EntityKind, id: DocumentId },
    Query { kind: EntityKind },
    Watch { kind: EntityKind },
    Reconnect,
}

impl StoreCall {
    pub fn kind(&self) -> Option<&EntityKind> {
        match self {
            StoreCall::Create { kind }
            | StoreCall::Get { kind, .. }
            | StoreCall::Update { kind, .. }
            | StoreCall::Delete { kind, .. }
            | StoreCall::Query { kind }
            | StoreCall::Watch { kind } => Some(kind),
            StoreCall::Reconnect => None,
        }
    }
}

struct FakeWatcher {
    kind: EntityKind,
    query: Query,
    tx: FeedSender,
}

#[derive(Default)]
struct FakeState {
    docs: HashMap<EntityKind, BTreeMap<DocumentId, Document>>,
    watchers: Vec<FakeWatcher>,
    calls: Vec<StoreCall>,
    last_timestamp: Option<DateTime<Utc>>,
    // Configurable failure modes
    unreachable: bool,
    watch_fails: bool,
    latency: Option<Duration>,
}

impl FakeState {
    /// Server timestamp, strictly increasing so creation order is total
    fn server_now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_timestamp {
            Some(last) if now <= last => last + chrono::Duration::nanoseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(stamp);
        stamp
    }

    fn check_reachable(&self) -> Result<(), RemoteError> {
        if self.unreachable {
            return Err(RemoteError::Unavailable("network unreachable".to_string()));
        }
        Ok(())
    }

    fn snapshot(&self, kind: &EntityKind, query: &Query) -> Vec<Document> {
        let docs = self.docs.get(kind).map(|d| d.values().cloned());
        query.evaluate(docs.into_iter().flatten())
    }

    /// Push the current result set to every live watcher of `kind`
    fn notify(&mut self, kind: &EntityKind) {
        let snapshots: Vec<_> = self
            .watchers
            .iter()
            .map(|w| (w.kind == *kind).then(|| self.snapshot(&w.kind, &w.query)))
            .collect();
        let mut snapshots = snapshots.into_iter();
        self.watchers.retain(|w| match snapshots.next().flatten() {
            Some(docs) => w.tx.send(FeedEvent::Snapshot(docs)).is_ok(),
            None => !w.tx.is_closed(),
        });
    }
}

/// Fake remote store with call recording and failure injection
#[derive(Clone)]
pub struct FakeRemoteStore {
    state: Arc<Mutex<FakeState>>,
    ids: SequentialIdGen,
}

impl Default for FakeRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRemoteStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState::default())),
            ids: SequentialIdGen::new("doc"),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Recorded calls against one kind
    pub fn calls_for(&self, kind: &str) -> Vec<StoreCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.kind().is_some_and(|k| k.as_str() == kind))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Seed a document directly, bypassing call recording
    pub fn insert(&self, doc: Document) {
        let mut state = self.lock();
        let kind = doc.kind.clone();
        state
            .docs
            .entry(kind.clone())
            .or_default()
            .insert(doc.id.clone(), doc);
        state.notify(&kind);
    }

    pub fn document(&self, kind: &str, id: &str) -> Option<Document> {
        self.lock()
            .docs
            .get(&EntityKind::from(kind))
            .and_then(|docs| docs.get(&DocumentId::from(id)))
            .cloned()
    }

    pub fn documents(&self, kind: &str) -> Vec<Document> {
        self.lock()
            .docs
            .get(&EntityKind::from(kind))
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Live watchers of a kind whose feed has not been dropped
    pub fn watcher_count(&self, kind: &str) -> usize {
        self.lock()
            .watchers
            .iter()
            .filter(|w| w.kind.as_str() == kind && !w.tx.is_closed())
            .count()
    }

    /// Make every call fail as if the network were down
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Make `watch` fail while leaving other calls working
    pub fn set_watch_fails(&self, fails: bool) {
        self.lock().watch_fails = fails;
    }

    /// Delay every call, for exercising timeouts
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.lock().latency = latency;
    }

    /// Fail all live feeds of a kind; failed feeds are closed
    pub fn push_feed_error(&self, kind: &str, error: RemoteError) {
        let mut state = self.lock();
        state.watchers.retain(|w| {
            if w.kind.as_str() == kind {
                let _ = w.tx.send(FeedEvent::Error(error.clone()));
                false
            } else {
                true
            }
        });
    }

    /// End all live feeds of a kind without an error
    pub fn close_feeds(&self, kind: &str) {
        self.lock().watchers.retain(|w| w.kind.as_str() != kind);
    }

    /// Record the call, apply latency, then check reachability
    async fn enter(&self, call: StoreCall) -> Result<(), RemoteError> {
        let latency = {
            let mut state = self.lock();
            state.calls.push(call);
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.lock().check_reachable()
    }
}

#[async_trait]
impl RemoteStore for FakeRemoteStore {
    async fn create_doc(
        &self,
        kind: &EntityKind,
        payload: Fields,
    ) -> Result<DocumentId, RemoteError> {
        self.enter(StoreCall::Create { kind: kind.clone() }).await?;

        let id = self.ids.next();
        let mut state = self.lock();
        let now = state.server_now();
        let doc = Document::new(kind.clone(), id.clone(), payload).with_timestamps(now, now);
        state
            .docs
            .entry(kind.clone())
            .or_default()
            .insert(id.clone(), doc);
        state.notify(kind);
        Ok(id)
    }

    async fn get_doc(
        &self,
        kind: &EntityKind,
        id: &DocumentId,
    ) -> Result<Option<Document>, RemoteError> {
        self.enter(StoreCall::Get {
            kind: kind.clone(),
            id: id.clone(),
        })
        .await?;

        Ok(self
            .lock()
            .docs
            .get(kind)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn update_doc(
        &self,
        kind: &EntityKind,
        id: &DocumentId,
        partial: Fields,
    ) -> Result<(), RemoteError> {
        self.enter(StoreCall::Update {
            kind: kind.clone(),
            id: id.clone(),
        })
        .await?;

        let mut state = self.lock();
        let now = state.server_now();
        let doc = state
            .docs
            .get_mut(kind)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| RemoteError::NotFound {
                kind: kind.clone(),
                id: id.clone(),
            })?;
        doc.merge(&partial, now);
        state.notify(kind);
        Ok(())
    }

    async fn delete_doc(&self, kind: &EntityKind, id: &DocumentId) -> Result<(), RemoteError> {
        self.enter(StoreCall::Delete {
            kind: kind.clone(),
            id: id.clone(),
        })
        .await?;

        let mut state = self.lock();
        if let Some(docs) = state.docs.get_mut(kind) {
            docs.remove(id);
        }
        state.notify(kind);
        Ok(())
    }

    async fn query(&self, kind: &EntityKind, query: &Query) -> Result<Vec<Document>, RemoteError> {
        self.enter(StoreCall::Query { kind: kind.clone() }).await?;
        Ok(self.lock().snapshot(kind, query))
    }

    async fn watch(&self, kind: &EntityKind, query: &Query) -> Result<ChangeFeed, RemoteError> {
        self.enter(StoreCall::Watch { kind: kind.clone() }).await?;

        let mut state = self.lock();
        if state.watch_fails {
            return Err(RemoteError::Rejected("listen failed".to_string()));
        }

        let (tx, feed) = ChangeFeed::channel();
        let _ = tx.send(FeedEvent::Snapshot(state.snapshot(kind, query)));
        state.watchers.push(FakeWatcher {
            kind: kind.clone(),
            query: query.clone(),
            tx,
        });
        Ok(feed)
    }

    async fn reconnect(&self) -> Result<(), RemoteError> {
        self.enter(StoreCall::Reconnect).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
