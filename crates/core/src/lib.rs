// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mirra-core: Core types for the mirra document access layer
//!
//! This crate provides:
//! - Documents, identifiers, and the query model
//! - The schema registry with per-kind validation and sanitization
//! - Configuration, audit records, and clock/id abstractions

pub mod audit;
pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod id;
pub mod query;
pub mod schema;

// Re-exports
pub use audit::{AuditAction, AuditRecord};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{AccessConfig, ConfigError, RateLimitConfig};
pub use document::{ActorId, Document, DocumentId, EntityKind, Fields};
pub use error::{ValidationError, ValidationReason};
pub use id::{IdGen, SequentialIdGen};
pub use query::{Cursor, Direction, Filter, FilterOp, Order, Page, PageRequest, Query};
pub use schema::{FieldRule, FieldSpec, KindSchema, SchemaRegistry};
