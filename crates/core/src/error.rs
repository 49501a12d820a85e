// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation errors raised by the schema registry

use crate::document::EntityKind;
use thiserror::Error;

/// Why a field was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationReason {
    #[error("no schema is registered for this kind")]
    UnknownKind,
    #[error("required field is missing")]
    Missing,
    #[error("expected {expected}")]
    WrongType { expected: &'static str },
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    #[error("not a valid email address")]
    InvalidEmail,
    #[error("must be one of: {}", allowed.join(", "))]
    NotAllowed { allowed: Vec<String> },
}

/// A rejected input, naming the kind and field at fault
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}.{field}: {reason}")]
pub struct ValidationError {
    pub kind: EntityKind,
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(kind: &EntityKind, field: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            kind: kind.clone(),
            field: field.into(),
            reason,
        }
    }

    pub fn unknown_kind(kind: &EntityKind) -> Self {
        Self::new(kind, "*", ValidationReason::UnknownKind)
    }
}
