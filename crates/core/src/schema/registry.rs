// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kind-to-schema table with standardize and partial-sanitize entry points

use super::field::KindSchema;
use super::kinds;
use super::sanitize::{self, Caps};
use crate::config::AccessConfig;
use crate::document::{strip_system_fields, EntityKind, Fields};
use crate::error::{ValidationError, ValidationReason};
use serde_json::Value;
use std::collections::HashMap;

/// Registry of entity-kind schemas
///
/// New kinds are added with [`SchemaRegistry::register`]; dispatch is a
/// table lookup by kind.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    kinds: HashMap<EntityKind, KindSchema>,
    caps: Caps,
}

impl SchemaRegistry {
    /// Empty registry using the config's generic size caps
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            kinds: HashMap::new(),
            caps: Caps {
                max_string_len: config.max_string_len,
                max_array_len: config.max_array_len,
            },
        }
    }

    /// Registry preloaded with the `lead`, `application`, and `user` kinds
    pub fn with_builtin_kinds(config: &AccessConfig) -> Self {
        let mut registry = Self::new(config);
        registry.register(kinds::LEAD, kinds::lead());
        registry.register(kinds::APPLICATION, kinds::application());
        registry.register(kinds::USER, kinds::user());
        registry
    }

    /// Register or replace a kind's schema, returning the previous one
    pub fn register(
        &mut self,
        kind: impl Into<EntityKind>,
        schema: KindSchema,
    ) -> Option<KindSchema> {
        self.kinds.insert(kind.into(), schema)
    }

    pub fn get(&self, kind: &EntityKind) -> Option<&KindSchema> {
        self.kinds.get(kind)
    }

    pub fn contains(&self, kind: &EntityKind) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kinds in name order
    pub fn kinds(&self) -> Vec<&EntityKind> {
        let mut kinds: Vec<_> = self.kinds.keys().collect();
        kinds.sort();
        kinds
    }

    /// Turn raw input into a complete, sanitized document payload.
    ///
    /// Fields not in the schema are dropped; system fields are never taken
    /// from input. Null counts as absent.
    pub fn standardize(&self, kind: &EntityKind, raw: &Fields) -> Result<Fields, ValidationError> {
        let schema = self
            .kinds
            .get(kind)
            .ok_or_else(|| ValidationError::unknown_kind(kind))?;

        let mut input = raw.clone();
        strip_system_fields(&mut input);

        let mut output = Fields::new();
        for spec in schema.fields() {
            let provided = input.get(&spec.name).filter(|v| !v.is_null());
            let value = match (provided, &spec.default) {
                (Some(value), _) => value,
                (None, Some(default)) => default,
                (None, None) if spec.required => {
                    return Err(ValidationError::new(
                        kind,
                        &spec.name,
                        ValidationReason::Missing,
                    ));
                }
                (None, None) => continue,
            };

            let clean = spec.rule.apply(kind, &spec.name, value, self.caps, true)?;
            if spec.required && clean.as_str().is_some_and(str::is_empty) {
                return Err(ValidationError::new(
                    kind,
                    &spec.name,
                    ValidationReason::Missing,
                ));
            }
            output.insert(spec.name.clone(), clean);
        }
        Ok(output)
    }

    /// Sanitize only the fields present in a partial update.
    ///
    /// Known fields are coerced, capped, and clamped by their rule without
    /// required or minimum-length checks. Fields (or kinds) without a schema
    /// get generic sanitization. Null passes through to clear a field.
    pub fn sanitize_partial(
        &self,
        kind: &EntityKind,
        partial: &Fields,
    ) -> Result<Fields, ValidationError> {
        let schema = self.kinds.get(kind);
        let mut input = partial.clone();
        strip_system_fields(&mut input);

        let mut output = Fields::new();
        for (name, value) in input {
            let clean = match (value.is_null(), schema.and_then(|s| s.get(&name))) {
                (true, _) => Value::Null,
                (false, Some(spec)) => spec.rule.apply(kind, &name, &value, self.caps, false)?,
                (false, None) => sanitize::sanitize_generic(&value, self.caps),
            };
            output.insert(name, clean);
        }
        Ok(output)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
