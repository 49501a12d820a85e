// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live queries keyed by caller-chosen cache keys
//!
//! At most one registration exists per key. Each registration owns a
//! listener task that writes snapshots into the mirror cache before handing
//! them to the caller. Delivery happens under a gate that unsubscribing
//! closes, so nothing is delivered once `unsubscribe` returns.

use crate::cache::MirrorCache;
use crate::connection::ConnectionTracker;
use crate::error::SubscriptionError;
use mirra_adapters::{ChangeFeed, FeedEvent, RemoteError, RemoteStore};
use mirra_core::{Clock, Document, EntityKind, Filter, Order, Query};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Filters and ordering for a live query.
///
/// Ordering is applied exactly as given; none is inferred from the filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl SubscriptionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    fn to_query(&self) -> Query {
        Query::new()
            .filters(self.filters.iter().cloned())
            .order(self.order.clone())
    }
}

/// Open delivery gate; `false` once the registration is torn down
type Gate = Arc<Mutex<bool>>;

struct Registration {
    generation: u64,
    gate: Gate,
    task: JoinHandle<()>,
}

impl Registration {
    /// Close the gate, waiting out any delivery in progress, then stop the task
    fn close(self) {
        *self.gate.lock().unwrap_or_else(|e| e.into_inner()) = false;
        self.task.abort();
    }
}

type Registrations = Arc<Mutex<HashMap<String, Registration>>>;

fn lock(registrations: &Registrations) -> MutexGuard<'_, HashMap<String, Registration>> {
    registrations.lock().unwrap_or_else(|e| e.into_inner())
}

/// Returned by `subscribe`; tears down the registration it was issued for.
///
/// Dropping the handle leaves the subscription running.
#[derive(Clone)]
pub struct SubscriptionHandle {
    key: String,
    generation: u64,
    registrations: Registrations,
}

impl SubscriptionHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this handle's registration is still the live one for its key.
    /// False once its feed has ended.
    pub fn is_active(&self) -> bool {
        lock(&self.registrations)
            .get(&self.key)
            .is_some_and(|r| r.generation == self.generation)
    }

    /// Stop deliveries. Idempotent, and a no-op if the key has since been
    /// re-subscribed. Must not be called from inside the change callback.
    pub fn unsubscribe(&self) {
        let removed = {
            let mut registrations = lock(&self.registrations);
            match registrations.get(&self.key) {
                Some(r) if r.generation == self.generation => registrations.remove(&self.key),
                _ => None,
            }
        };
        if let Some(registration) = removed {
            registration.close();
            tracing::debug!(key = %self.key, "unsubscribed");
        }
    }
}

/// Opens, replaces, and tears down live queries against the remote store
pub struct SubscriptionManager<S, C: Clock> {
    store: S,
    cache: MirrorCache<C>,
    tracker: ConnectionTracker,
    timeout: Duration,
    registrations: Registrations,
    generations: Arc<AtomicU64>,
}

impl<S: Clone, C: Clock> Clone for SubscriptionManager<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cache: self.cache.clone(),
            tracker: self.tracker.clone(),
            timeout: self.timeout,
            registrations: Arc::clone(&self.registrations),
            generations: Arc::clone(&self.generations),
        }
    }
}

impl<S: RemoteStore, C: Clock> SubscriptionManager<S, C> {
    pub fn new(
        store: S,
        cache: MirrorCache<C>,
        tracker: ConnectionTracker,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            tracker,
            timeout,
            registrations: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a live query under `cache_key`, replacing any existing one.
    ///
    /// `on_change` receives every snapshot after it has been mirrored. If the
    /// feed cannot be opened it is called once with an empty result; if the
    /// feed later fails it is called once with the cached documents of the
    /// kind and the feed ends. A feed that ends retires its registration.
    pub async fn subscribe<F>(
        &self,
        kind: &EntityKind,
        query: SubscriptionQuery,
        cache_key: impl Into<String>,
        mut on_change: F,
    ) -> SubscriptionHandle
    where
        F: FnMut(Vec<Document>) + Send + 'static,
    {
        let key = cache_key.into();
        self.teardown(&key);

        let handle = SubscriptionHandle {
            key: key.clone(),
            generation: self.generations.fetch_add(1, Ordering::SeqCst),
            registrations: Arc::clone(&self.registrations),
        };

        let feed = match self.open(kind, &query).await {
            Ok(feed) => feed,
            Err(source) => {
                if source.is_transient() {
                    self.tracker.mark_unreachable();
                }
                let err = SubscriptionError::Setup {
                    kind: kind.clone(),
                    source,
                };
                tracing::warn!(%key, error = %err, "subscription degraded to empty result");
                on_change(Vec::new());
                return handle;
            }
        };

        let gate: Gate = Arc::new(Mutex::new(true));
        let listener = Listener {
            store: self.store.clone(),
            cache: self.cache.clone(),
            tracker: self.tracker.clone(),
            timeout: self.timeout,
            kind: kind.clone(),
            key: key.clone(),
            generation: handle.generation,
            registrations: Arc::clone(&self.registrations),
            gate: Arc::clone(&gate),
            on_change,
        };

        // Spawned under the lock so a listener that ends at once still finds
        // its registration to retire. A concurrent subscribe for the same key
        // may have registered while the feed was opening; the later one wins.
        let displaced = {
            let mut registrations = lock(&self.registrations);
            let task = tokio::spawn(listener.run(feed));
            registrations.insert(
                key.clone(),
                Registration {
                    generation: handle.generation,
                    gate,
                    task,
                },
            )
        };
        if let Some(registration) = displaced {
            registration.close();
        }

        tracing::info!(%key, %kind, "subscribed");
        handle
    }

    async fn open(
        &self,
        kind: &EntityKind,
        query: &SubscriptionQuery,
    ) -> Result<ChangeFeed, RemoteError> {
        let query = query.to_query();
        match tokio::time::timeout(self.timeout, self.store.watch(kind, &query)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.timeout)),
        }
    }

    fn teardown(&self, key: &str) {
        let existing = lock(&self.registrations).remove(key);
        if let Some(registration) = existing {
            registration.close();
            tracing::debug!(key, "replaced existing subscription");
        }
    }

    /// Keys with a live registration, sorted
    pub fn active_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = lock(&self.registrations).keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn active_count(&self) -> usize {
        lock(&self.registrations).len()
    }

    pub fn unsubscribe_all(&self) {
        let drained: Vec<_> = lock(&self.registrations).drain().collect();
        for (_, registration) in drained {
            registration.close();
        }
    }
}

struct Listener<S, C: Clock, F> {
    store: S,
    cache: MirrorCache<C>,
    tracker: ConnectionTracker,
    timeout: Duration,
    kind: EntityKind,
    key: String,
    generation: u64,
    registrations: Registrations,
    gate: Gate,
    on_change: F,
}

impl<S, C, F> Listener<S, C, F>
where
    S: RemoteStore,
    C: Clock,
    F: FnMut(Vec<Document>) + Send + 'static,
{
    async fn run(mut self, mut feed: ChangeFeed) {
        while let Some(event) = feed.next().await {
            match event {
                FeedEvent::Snapshot(docs) => {
                    if !self.deliver(docs) {
                        return;
                    }
                }
                FeedEvent::Error(source) => {
                    let err = SubscriptionError::Feed {
                        kind: self.kind.clone(),
                        source,
                    };
                    tracing::warn!(key = %self.key, error = %err, "serving cached documents");
                    self.tracker.mark_unreachable();
                    self.tracker
                        .reconnect_store(&self.store, self.timeout)
                        .await;

                    let cached = self.cache.scan(&self.kind);
                    self.finish(cached);
                    return;
                }
            }
        }
        tracing::debug!(key = %self.key, "change feed closed");
        self.retire();
    }

    /// Hand over the last result and retire, both under the gate
    fn finish(&mut self, docs: Vec<Document>) {
        let live = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        if !*live {
            return;
        }
        (self.on_change)(docs);
        self.retire();
    }

    /// Drop this listener's registration unless the key was re-subscribed
    fn retire(&self) {
        let mut registrations = lock(&self.registrations);
        if registrations
            .get(&self.key)
            .is_some_and(|r| r.generation == self.generation)
        {
            registrations.remove(&self.key);
        }
    }

    /// Mirror and hand documents to the caller under the gate. Returns false
    /// once the registration has been torn down.
    fn deliver(&mut self, docs: Vec<Document>) -> bool {
        let live = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        if !*live {
            return false;
        }
        for doc in &docs {
            self.cache.put(doc.clone());
        }
        (self.on_change)(docs);
        true
    }
}

#[cfg(test)]
#[path = "subscriptions_tests.rs"]
mod tests;
