// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema registry for entity kinds
//!
//! This module provides:
//! - `SchemaRegistry` - Kind-to-schema table with `standardize` and `sanitize_partial`
//! - `KindSchema`/`FieldSpec`/`FieldRule` - Declarative field layouts
//! - Sanitizers for free text, numbers, booleans, and lists
//! - The built-in `lead`, `application`, and `user` kinds

mod field;
pub mod kinds;
mod registry;
pub mod sanitize;

pub use field::{FieldRule, FieldSpec, KindSchema};
pub use registry::SchemaRegistry;
pub use sanitize::Caps;
