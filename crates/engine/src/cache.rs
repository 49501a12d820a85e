// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local mirror of remote documents
//!
//! Every successful read, write, and change-feed snapshot writes through to
//! the mirror, overwriting whatever was there for the same key. The mirror is
//! the fallback source of truth while the remote store is unreachable.

use chrono::{DateTime, Utc};
use lru::LruCache;
use mirra_core::{Clock, Document, DocumentId, EntityKind, Fields};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

type CacheKey = (EntityKind, DocumentId);

/// Last known state of a document and when it was captured locally
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub document: Document,
    pub captured_at: Instant,
}

/// Process-local document mirror keyed by (kind, id).
///
/// Unbounded unless a capacity is given, in which case the least recently
/// used entry is evicted. Cloning shares the same entries.
pub struct MirrorCache<C: Clock> {
    entries: Arc<Mutex<LruCache<CacheKey, CacheEntry>>>,
    clock: C,
}

impl<C: Clock> Clone for MirrorCache<C> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            clock: self.clock.clone(),
        }
    }
}

impl<C: Clock> MirrorCache<C> {
    pub fn new(capacity: Option<usize>, clock: C) -> Self {
        let entries = match capacity.and_then(NonZeroUsize::new) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        Self {
            entries: Arc::new(Mutex::new(entries)),
            clock,
        }
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a document, replacing any prior entry for its key
    pub fn put(&self, document: Document) {
        let key = (document.kind.clone(), document.id.clone());
        let entry = CacheEntry {
            document,
            captured_at: self.clock.now(),
        };
        self.entries().put(key, entry);
    }

    pub fn get(&self, kind: &EntityKind, id: &DocumentId) -> Option<Document> {
        self.entries()
            .get(&(kind.clone(), id.clone()))
            .map(|entry| entry.document.clone())
    }

    /// Full entry without touching recency
    pub fn entry(&self, kind: &EntityKind, id: &DocumentId) -> Option<CacheEntry> {
        self.entries().peek(&(kind.clone(), id.clone())).cloned()
    }

    pub fn remove(&self, kind: &EntityKind, id: &DocumentId) -> Option<Document> {
        self.entries()
            .pop(&(kind.clone(), id.clone()))
            .map(|entry| entry.document)
    }

    /// Apply a partial update to a cached document.
    ///
    /// Returns false if the document is not cached; nothing is inserted then.
    pub fn merge(
        &self,
        kind: &EntityKind,
        id: &DocumentId,
        partial: &Fields,
        updated_at: DateTime<Utc>,
    ) -> bool {
        let captured_at = self.clock.now();
        match self.entries().get_mut(&(kind.clone(), id.clone())) {
            Some(entry) => {
                entry.document.merge(partial, updated_at);
                entry.captured_at = captured_at;
                true
            }
            None => false,
        }
    }

    /// Every cached document of a kind, ordered by id
    pub fn scan(&self, kind: &EntityKind) -> Vec<Document> {
        let mut docs: Vec<Document> = self
            .entries()
            .iter()
            .filter(|((k, _), _)| k == kind)
            .map(|(_, entry)| entry.document.clone())
            .collect();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        docs
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
