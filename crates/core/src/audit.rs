// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit records for document mutations

use crate::document::{ActorId, DocumentId, EntityKind, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        };
        write!(f, "{}", name)
    }
}

/// Immutable record of one mutation with its before and after state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub action: AuditAction,
    pub kind: EntityKind,
    pub document_id: DocumentId,
    pub actor: Option<ActorId>,
    pub timestamp: DateTime<Utc>,
    pub before: Option<Fields>,
    pub after: Option<Fields>,
}

impl AuditRecord {
    /// Flatten into a document payload for the audit sink
    pub fn to_fields(&self) -> Fields {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Fields::new(),
        }
    }
}
