// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field rules and per-kind schemas

use super::sanitize::{self, Caps};
use crate::document::EntityKind;
use crate::error::{ValidationError, ValidationReason};
use serde_json::Value;

/// Type, format, and size rule for a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Free text; `max_len` falls back to the registry's string cap
    Text {
        min_len: usize,
        max_len: Option<usize>,
    },
    Email,
    /// Case-insensitive membership in a fixed set; stored lowercase
    Enum { allowed: Vec<String> },
    Number { min: Option<f64>, max: Option<f64> },
    Integer { min: Option<i64>, max: Option<i64> },
    Bool,
    /// List of short strings
    List {
        max_items: Option<usize>,
        max_item_len: Option<usize>,
    },
}

impl FieldRule {
    pub fn text(min_len: usize, max_len: usize) -> Self {
        Self::Text {
            min_len,
            max_len: Some(max_len),
        }
    }

    pub fn enumeration(allowed: &[&str]) -> Self {
        Self::Enum {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn number(min: f64, max: f64) -> Self {
        Self::Number {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn list(max_items: usize, max_item_len: usize) -> Self {
        Self::List {
            max_items: Some(max_items),
            max_item_len: Some(max_item_len),
        }
    }

    /// Coerce, sanitize, and check a value.
    ///
    /// `strict` enables the checks only a full document must pass (minimum
    /// lengths); partial updates skip them.
    pub(crate) fn apply(
        &self,
        kind: &EntityKind,
        field: &str,
        value: &Value,
        caps: Caps,
        strict: bool,
    ) -> Result<Value, ValidationError> {
        let reject = |reason| ValidationError::new(kind, field, reason);
        let wrong_type = |expected| reject(ValidationReason::WrongType { expected });

        match self {
            FieldRule::Text { min_len, max_len } => {
                let raw = sanitize::coerce_text(value).ok_or_else(|| wrong_type("text"))?;
                let text = sanitize::sanitize_text(&raw, max_len.unwrap_or(caps.max_string_len));
                if strict && text.chars().count() < *min_len {
                    return Err(reject(ValidationReason::TooShort { min: *min_len }));
                }
                Ok(Value::String(text))
            }
            FieldRule::Email => {
                let raw = sanitize::coerce_text(value).ok_or_else(|| wrong_type("email"))?;
                let email = sanitize::sanitize_text(&raw, caps.max_string_len).to_lowercase();
                if !sanitize::is_email(&email) {
                    return Err(reject(ValidationReason::InvalidEmail));
                }
                Ok(Value::String(email))
            }
            FieldRule::Enum { allowed } => {
                let raw = sanitize::coerce_text(value).ok_or_else(|| wrong_type("text"))?;
                let choice = sanitize::sanitize_text(&raw, caps.max_string_len).to_lowercase();
                if !allowed.iter().any(|a| a.eq_ignore_ascii_case(&choice)) {
                    return Err(reject(ValidationReason::NotAllowed {
                        allowed: allowed.clone(),
                    }));
                }
                Ok(Value::String(choice))
            }
            FieldRule::Number { min, max } => {
                let n = sanitize::coerce_number(value).ok_or_else(|| wrong_type("number"))?;
                Ok(sanitize::number_value(sanitize::clamp(n, *min, *max)))
            }
            FieldRule::Integer { min, max } => {
                let n = sanitize::coerce_number(value)
                    .filter(|n| n.fract() == 0.0)
                    .ok_or_else(|| wrong_type("integer"))?;
                let n = sanitize::clamp(n, min.map(|v| v as f64), max.map(|v| v as f64));
                Ok(sanitize::number_value(n))
            }
            FieldRule::Bool => sanitize::coerce_bool(value)
                .map(Value::Bool)
                .ok_or_else(|| wrong_type("boolean")),
            FieldRule::List {
                max_items,
                max_item_len,
            } => sanitize::sanitize_list(
                value,
                max_items.unwrap_or(caps.max_array_len),
                max_item_len.unwrap_or(caps.max_string_len),
            )
            .map(Value::Array)
            .ok_or_else(|| wrong_type("list")),
        }
    }
}

/// A named field within a kind schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub rule: FieldRule,
    pub required: bool,
    /// Filled in when an optional field is absent
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, rule: FieldRule) -> Self {
        Self {
            name: name.into(),
            rule,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, rule: FieldRule) -> Self {
        Self {
            name: name.into(),
            rule,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// The fixed field layout of one entity kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KindSchema {
    fields: Vec<FieldSpec>,
}

impl KindSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.retain(|f| f.name != spec.name);
        self.fields.push(spec);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}
