// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mirra document access engine
//!
//! Rate limiting, the local mirror cache, connection tracking, audit
//! logging, change-feed subscriptions, and the `DocumentAccess` facade that
//! orchestrates them.

mod audit;
mod cache;
mod connection;
mod error;
mod facade;
mod rate_limiter;
mod subscriptions;

pub use audit::AuditLogWriter;
pub use cache::{CacheEntry, MirrorCache};
pub use connection::{ConnectionState, ConnectionTracker};
pub use error::{AccessError, WriteOp};
pub use facade::{ConnectionStatus, DocumentAccess};
pub use rate_limiter::RateLimiter;
pub use subscriptions::{SubscriptionHandle, SubscriptionManager, SubscriptionQuery};
