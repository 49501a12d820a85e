// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Documents and the identifiers that address them

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Field payload of a document, keyed by field name
pub type Fields = Map<String, Value>;

/// Field names assigned by the store, never taken from caller input
pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";
pub const SYSTEM_FIELDS: &[&str] = &["id", CREATED_AT, UPDATED_AT];

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id! {
    /// Named category of document ("lead", "application", ...)
    EntityKind
}

string_id! {
    /// Store-assigned identifier, unique within an entity kind
    DocumentId
}

string_id! {
    /// Identity of the caller a request is attributed to
    ActorId
}

/// A stored document of some entity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub kind: EntityKind,
    pub id: DocumentId,
    pub fields: Fields,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(kind: EntityKind, id: DocumentId, fields: Fields) -> Self {
        Self {
            kind,
            id,
            fields,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_timestamps(
        mut self,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
        self
    }

    /// Look up a field, including the system timestamp fields
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.0.clone())),
            CREATED_AT => self.created_at.map(timestamp_value),
            UPDATED_AT => self.updated_at.map(timestamp_value),
            _ => self.fields.get(name).cloned(),
        }
    }

    /// Overwrite the given fields, leaving the rest untouched
    pub fn merge(&mut self, partial: &Fields, updated_at: DateTime<Utc>) {
        for (name, value) in partial {
            self.fields.insert(name.clone(), value.clone());
        }
        self.updated_at = Some(updated_at);
    }

    /// Payload with system fields flattened in, as written to audit sinks
    pub fn to_payload(&self) -> Fields {
        let mut payload = self.fields.clone();
        payload.insert("id".to_string(), Value::String(self.id.0.clone()));
        for name in [CREATED_AT, UPDATED_AT] {
            if let Some(value) = self.field(name) {
                payload.insert(name.to_string(), value);
            }
        }
        payload
    }
}

/// Fixed-width RFC 3339 so timestamps order correctly as strings
pub fn timestamp_value(t: DateTime<Utc>) -> Value {
    Value::String(t.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

/// Drop system fields a caller may have smuggled into an input payload
pub fn strip_system_fields(fields: &mut Fields) {
    for name in SYSTEM_FIELDS {
        fields.remove(*name);
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
