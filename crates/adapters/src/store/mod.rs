// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote document store boundary

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRemoteStore, StoreCall};

use async_trait::async_trait;
use mirra_core::{Document, DocumentId, EntityKind, Fields, Query};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from remote store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),
    #[error("document not found: {kind}/{id}")]
    NotFound { kind: EntityKind, id: DocumentId },
    #[error("rejected by remote store: {0}")]
    Rejected(String),
}

impl RemoteError {
    /// Connectivity failures, as opposed to the store refusing the request
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Unavailable(_) | RemoteError::Timeout(_))
    }
}

/// One push from a live query
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Full current result set of the watched query
    Snapshot(Vec<Document>),
    /// The feed failed; no further events follow
    Error(RemoteError),
}

/// Sending half of a change feed, held by the store
pub type FeedSender = mpsc::UnboundedSender<FeedEvent>;

/// Receiving half of a live query. Dropping it detaches from the store.
#[derive(Debug)]
pub struct ChangeFeed {
    rx: mpsc::UnboundedReceiver<FeedEvent>,
}

impl ChangeFeed {
    pub fn channel() -> (FeedSender, ChangeFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, ChangeFeed { rx })
    }

    /// Next event, or `None` once the store closes the feed
    pub async fn next(&mut self) -> Option<FeedEvent> {
        self.rx.recv().await
    }
}

/// Adapter for the remote document store
///
/// The store owns durability, id assignment, and `createdAt`/`updatedAt`.
#[async_trait]
pub trait RemoteStore: Clone + Send + Sync + 'static {
    /// Create a document, returning its store-assigned id
    async fn create_doc(
        &self,
        kind: &EntityKind,
        payload: Fields,
    ) -> Result<DocumentId, RemoteError>;

    async fn get_doc(
        &self,
        kind: &EntityKind,
        id: &DocumentId,
    ) -> Result<Option<Document>, RemoteError>;

    /// Merge fields into an existing document; `NotFound` if it does not exist
    async fn update_doc(
        &self,
        kind: &EntityKind,
        id: &DocumentId,
        partial: Fields,
    ) -> Result<(), RemoteError>;

    async fn delete_doc(&self, kind: &EntityKind, id: &DocumentId) -> Result<(), RemoteError>;

    async fn query(&self, kind: &EntityKind, query: &Query) -> Result<Vec<Document>, RemoteError>;

    /// Open a live query. The first event is the initial snapshot.
    async fn watch(&self, kind: &EntityKind, query: &Query) -> Result<ChangeFeed, RemoteError>;

    /// Re-establish the network channel after a connectivity failure
    async fn reconnect(&self) -> Result<(), RemoteError>;
}
