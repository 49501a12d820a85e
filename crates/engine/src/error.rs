// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the document access layer

use mirra_adapters::RemoteError;
use mirra_core::{ActorId, DocumentId, EntityKind, ValidationError};
use std::fmt;
use thiserror::Error;

/// Mutation that failed against the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteOp::Create => "create",
            WriteOp::Update => "update",
            WriteOp::Delete => "delete",
        };
        write!(f, "{}", name)
    }
}

/// Errors surfaced to callers of the access facade
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("rate limit exceeded for actor {actor}")]
    RateLimitExceeded { actor: ActorId },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("document not found: {kind}/{id}")]
    DocumentNotFound { kind: EntityKind, id: DocumentId },
    #[error("remote {op} of {kind} failed: {source}")]
    RemoteWrite {
        op: WriteOp,
        kind: EntityKind,
        source: RemoteError,
    },
    #[error("remote read of {kind} failed: {source}")]
    RemoteRead { kind: EntityKind, source: RemoteError },
}

impl AccessError {
    pub(crate) fn write(op: WriteOp, kind: &EntityKind, source: RemoteError) -> Self {
        AccessError::RemoteWrite {
            op,
            kind: kind.clone(),
            source,
        }
    }

    /// The underlying remote failure, if any
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            AccessError::RemoteWrite { source, .. } | AccessError::RemoteRead { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// Subscription failures. Logged and degraded to cached results, never returned.
#[derive(Debug, Error)]
pub(crate) enum SubscriptionError {
    #[error("failed to open change feed for {kind}: {source}")]
    Setup {
        kind: EntityKind,
        source: RemoteError,
    },
    #[error("change feed for {kind} failed: {source}")]
    Feed {
        kind: EntityKind,
        source: RemoteError,
    },
}
