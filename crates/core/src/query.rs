// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query model: filters, ordering, and cursor pagination
//!
//! Stores evaluate these remotely; [`Query::evaluate`] is the in-memory
//! reference evaluation used by fakes and tests.

use crate::document::{Document, DocumentId, Fields, CREATED_AT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison applied by a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Field value is one of the filter's array elements
    In,
    /// Field is an array containing the filter value
    Contains,
}

/// A single field predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Check a payload against this predicate. Missing fields never match.
    pub fn matches(&self, fields: &Fields) -> bool {
        self.matches_value(fields.get(&self.field))
    }

    fn matches_document(&self, doc: &Document) -> bool {
        self.matches_value(doc.field(&self.field).as_ref())
    }

    fn matches_value(&self, actual: Option<&Value>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self.op {
            FilterOp::Eq => compare_values(actual, &self.value) == Ordering::Equal,
            FilterOp::Ne => compare_values(actual, &self.value) != Ordering::Equal,
            FilterOp::Lt => same_type(actual, &self.value) && actual_lt(actual, &self.value),
            FilterOp::Le => same_type(actual, &self.value) && !actual_lt(&self.value, actual),
            FilterOp::Gt => same_type(actual, &self.value) && actual_lt(&self.value, actual),
            FilterOp::Ge => same_type(actual, &self.value) && !actual_lt(actual, &self.value),
            FilterOp::In => self
                .value
                .as_array()
                .is_some_and(|options| options.iter().any(|v| compare_values(actual, v).is_eq())),
            FilterOp::Contains => actual
                .as_array()
                .is_some_and(|items| items.iter().any(|v| compare_values(v, &self.value).is_eq())),
        }
    }
}

fn actual_lt(a: &Value, b: &Value) -> bool {
    compare_values(a, b) == Ordering::Less
}

fn same_type(a: &Value, b: &Value) -> bool {
    type_rank(a) == type_rank(b)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: by type first, then by value
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(l, r)| compare_values(l, r))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

/// Result ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// Most recently created first
    pub fn newest_first() -> Self {
        Self::desc(CREATED_AT)
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let left = a.field(&self.field).unwrap_or(Value::Null);
        let right = b.field(&self.field).unwrap_or(Value::Null);
        let ord = compare_values(&left, &right);
        match self.direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }
}

/// Opaque pagination cursor: results resume after this document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub DocumentId);

/// A remote query against one entity kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    pub cursor: Option<Cursor>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn order(mut self, order: Option<Order>) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn after(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Filter, order, then page a set of documents.
    ///
    /// Without an explicit order, documents are ordered by id. A cursor that
    /// names a document no longer in the result set yields an empty page.
    pub fn evaluate(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = docs
            .into_iter()
            .filter(|doc| self.filters.iter().all(|f| f.matches_document(doc)))
            .collect();

        matched.sort_by(|a, b| {
            self.order
                .as_ref()
                .map_or(Ordering::Equal, |order| order.compare(a, b))
                .then_with(|| a.id.cmp(&b.id))
        });

        let start = match &self.cursor {
            Some(Cursor(after)) => match matched.iter().position(|doc| &doc.id == after) {
                Some(pos) => pos + 1,
                None => matched.len(),
            },
            None => 0,
        };

        matched
            .into_iter()
            .skip(start)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

/// Caller-facing page request for bulk reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub page_size: usize,
    pub cursor: Option<Cursor>,
}

impl PageRequest {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn after(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// One page of bulk-read results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub docs: Vec<Document>,
    /// Present when another page may follow
    pub next_cursor: Option<Cursor>,
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
