// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in entity kinds

use super::field::{FieldRule, FieldSpec, KindSchema};

pub const LEAD: &str = "lead";
pub const APPLICATION: &str = "application";
pub const USER: &str = "user";

/// Minimum length of a lead's description of what they need help with
pub const MIN_DOUBT_DESCRIPTION: usize = 10;

/// Inbound enquiry from a prospective student
pub fn lead() -> KindSchema {
    KindSchema::new()
        .field(FieldSpec::required("name", FieldRule::text(2, 100)))
        .field(FieldSpec::required("email", FieldRule::Email))
        .field(FieldSpec::optional("phone", FieldRule::text(0, 20)))
        .field(FieldSpec::required(
            "doubtDescription",
            FieldRule::text(MIN_DOUBT_DESCRIPTION, 2000),
        ))
        .field(
            FieldSpec::optional(
                "status",
                FieldRule::enumeration(&["open", "in_progress", "resolved", "closed"]),
            )
            .with_default("open"),
        )
        .field(
            FieldSpec::optional("priority", FieldRule::enumeration(&["low", "medium", "high"]))
                .with_default("medium"),
        )
        .field(FieldSpec::optional("source", FieldRule::text(0, 50)).with_default("website"))
        .field(FieldSpec::optional("tags", FieldRule::list(10, 30)))
        .field(FieldSpec::optional(
            "assignedTo",
            FieldRule::Text {
                min_len: 0,
                max_len: None,
            },
        ))
}

/// Program application
pub fn application() -> KindSchema {
    KindSchema::new()
        .field(FieldSpec::required("applicantName", FieldRule::text(2, 100)))
        .field(FieldSpec::required("email", FieldRule::Email))
        .field(FieldSpec::required("program", FieldRule::text(2, 100)))
        .field(FieldSpec::optional("statement", FieldRule::text(0, 5000)))
        .field(
            FieldSpec::optional(
                "status",
                FieldRule::enumeration(&["pending", "reviewing", "accepted", "rejected"]),
            )
            .with_default("pending"),
        )
        .field(FieldSpec::optional("score", FieldRule::number(0.0, 100.0)))
        .field(FieldSpec::optional("documents", FieldRule::list(20, 500)))
}

/// Account profile
pub fn user() -> KindSchema {
    KindSchema::new()
        .field(FieldSpec::required("email", FieldRule::Email))
        .field(FieldSpec::required("displayName", FieldRule::text(1, 100)))
        .field(
            FieldSpec::optional(
                "role",
                FieldRule::enumeration(&["student", "counselor", "admin"]),
            )
            .with_default("student"),
        )
        .field(FieldSpec::optional("active", FieldRule::Bool).with_default(true))
}
