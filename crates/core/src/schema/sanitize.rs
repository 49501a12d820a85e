// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field sanitizers
//!
//! Every sanitizer is idempotent: feeding its output back in returns the
//! same value.

use regex::Regex;
use serde_json::{Number, Value};
use std::sync::LazyLock;

// Script-like prefixes: `javascript:` URLs and inline `onclick=` style handlers
#[allow(clippy::expect_used)]
static SCRIPT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)javascript:|\bon\w+\s*=").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("constant regex pattern is valid")
});

/// Size caps applied to fields that carry none of their own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caps {
    pub max_string_len: usize,
    pub max_array_len: usize,
}

/// Strip markup and script prefixes, trim, and cap at `max_len` characters
pub fn sanitize_text(raw: &str, max_len: usize) -> String {
    let mut text = raw.to_string();
    // Removing one pattern can splice together another, so repeat to a fixed point
    loop {
        let stripped = SCRIPT_PATTERN
            .replace_all(&text.replace(['<', '>'], ""), "")
            .into_owned();
        if stripped == text {
            break;
        }
        text = stripped;
    }

    let capped: String = text.trim().chars().take(max_len).collect();
    capped.trim_end().to_string()
}

/// Coerce a scalar into text; structured values are not text
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn is_email(text: &str) -> bool {
    EMAIL_PATTERN.is_match(text)
}

/// Accept JSON numbers and numeric strings; non-finite values are rejected
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn clamp(n: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let n = min.map_or(n, |min| n.max(min));
    max.map_or(n, |max| n.min(max))
}

/// Integral values are emitted as JSON integers so they compare equal on re-entry
pub fn number_value(n: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() < MAX_EXACT {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// Sanitize list items as text and cap the list length.
///
/// A bare string is accepted as a one-item list.
pub fn sanitize_list(value: &Value, max_items: usize, max_item_len: usize) -> Option<Vec<Value>> {
    let items = match value {
        Value::Array(items) => items.clone(),
        Value::String(_) => vec![value.clone()],
        _ => return None,
    };
    Some(
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => {
                    let text = sanitize_text(s, max_item_len);
                    (!text.is_empty()).then_some(Value::String(text))
                }
                Value::Number(_) | Value::Bool(_) => Some(item.clone()),
                _ => None,
            })
            .take(max_items)
            .collect(),
    )
}

/// Schema-less sanitization for fields no schema describes
pub fn sanitize_generic(value: &Value, caps: Caps) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_text(s, caps.max_string_len)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .take(caps.max_array_len)
                .map(|item| sanitize_generic(item, caps))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), sanitize_generic(v, caps)))
                .collect(),
        ),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map_or(Value::Null, |_| value.clone()),
        Value::Null | Value::Bool(_) => value.clone(),
    }
}

#[cfg(test)]
#[path = "sanitize_tests.rs"]
mod tests;
