// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document identifier generation
//!
//! Production identifiers are assigned by the remote store; generators here
//! back in-memory stores.

use crate::document::DocumentId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates unique document identifiers
pub trait IdGen: Clone + Send + Sync + 'static {
    fn next(&self) -> DocumentId;
}

/// Sequential ID generator
///
/// Ids are zero-padded so lexical order matches creation order.
#[derive(Clone, Debug)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("doc")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> DocumentId {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        DocumentId(format!("{}-{:06}", self.prefix, n))
    }
}
