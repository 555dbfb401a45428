//! Query algebra shared by every entity store
//!
//! A [`Query`] is an immutable value: conditions, orderings, an optional
//! limit/offset, and an opaque parameter bag for filters that don't map to
//! a single column (e.g. "enrichments associated with this commit sha").
//! Stores translate a `Query` into SQL via [`QueryTranslator`]; unknown
//! condition fields are rejected at translation time, never at
//! construction, so building a query is always infallible.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// A single `(field, value, in?)` condition.
///
/// `in_list` conditions match any of `values`; otherwise the condition
/// matches `values[0]` exactly.
#[derive(Debug, Clone)]
pub struct Cond {
    pub field: &'static str,
    pub values: Vec<Value>,
    pub in_list: bool,
}

impl Cond {
    /// Exact-match condition: `field = value`.
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self {
            field,
            values: vec![value.into()],
            in_list: false,
        }
    }

    /// Membership condition: `field IN (values...)`.
    pub fn in_values(field: &'static str, values: Vec<Value>) -> Self {
        Self {
            field,
            values,
            in_list: true,
        }
    }
}

/// A single `(field, ascending)` ordering.
#[derive(Debug, Clone, Copy)]
pub struct Order {
    pub field: &'static str,
    pub ascending: bool,
}

/// An immutable, builder-constructed query.
///
/// `Query::new()` starts empty (matches every row). Each `with_*` method
/// consumes and returns `Self`, so a built query can never be mutated by
/// a caller after the fact — only a fresh builder chain produces a new one.
#[derive(Debug, Clone, Default)]
pub struct Query {
    conditions: Vec<Cond>,
    orderings: Vec<Order>,
    limit: Option<i64>,
    offset: Option<i64>,
    params: HashMap<&'static str, Value>,
}

impl Query {
    /// Start an empty query — matches every row, unordered, unbounded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition.
    #[must_use]
    pub fn with(mut self, cond: Cond) -> Self {
        self.conditions.push(cond);
        self
    }

    /// Add an ordering clause. Earlier calls take precedence.
    #[must_use]
    pub fn order_by(mut self, field: &'static str, ascending: bool) -> Self {
        self.orderings.push(Order { field, ascending });
        self
    }

    /// Set the row limit. `0` is a sentinel meaning "no LIMIT clause" — a
    /// translator must treat it as unbounded rather than returning zero rows.
    #[must_use]
    pub const fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the row offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Attach an opaque, store-specific parameter (e.g. `commit_shas`).
    #[must_use]
    pub fn with_param(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.params.insert(key, value.into());
        self
    }

    pub fn conditions(&self) -> &[Cond] {
        &self.conditions
    }

    pub fn orderings(&self) -> &[Order] {
        &self.orderings
    }

    /// The effective limit: `None` means unbounded, matching a `0` sentinel.
    pub fn limit(&self) -> Option<i64> {
        self.limit.filter(|&n| n != 0)
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

/// Errors raised while translating a [`Query`] into a store-specific access
/// path (typically SQL).
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown condition field: {0}")]
    UnknownField(String),

    #[error("unknown query parameter: {0}")]
    UnknownParam(String),
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.in_list {
            write!(f, "{} IN ({:?})", self.field, self.values)
        } else {
            write!(f, "{} = {:?}", self.field, self.values.first())
        }
    }
}

/// Translates a [`Query`] into a store's underlying access mechanism.
///
/// Each entity store implements this for its own row type, rejecting any
/// condition field it doesn't recognize with `QueryError::UnknownField`.
pub trait QueryTranslator {
    /// The translated representation (e.g. a SQL `WHERE`/`ORDER BY` fragment
    /// plus bound parameters, or an in-memory predicate for mocks).
    type Output;

    /// Validate and translate `query`. Implementations must check every
    /// condition's field name before returning `Ok`.
    fn translate(&self, query: &Query) -> Result<Self::Output, QueryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_has_no_limit() {
        let q = Query::new();
        assert!(q.conditions().is_empty());
        assert_eq!(q.limit(), None);
    }

    #[test]
    fn zero_limit_is_unbounded_sentinel() {
        let q = Query::new().with_limit(0);
        assert_eq!(q.limit(), None);
    }

    #[test]
    fn nonzero_limit_is_preserved() {
        let q = Query::new().with_limit(10);
        assert_eq!(q.limit(), Some(10));
    }

    #[test]
    fn builder_is_immutable_across_calls() {
        let base = Query::new().with(Cond::eq("repo_id", 1));
        let extended = base.clone().with(Cond::eq("branch", "main"));
        assert_eq!(base.conditions().len(), 1);
        assert_eq!(extended.conditions().len(), 2);
    }

    #[test]
    fn params_round_trip() {
        let q = Query::new().with_param("commit_shas", serde_json::json!(["abc", "def"]));
        assert!(q.param("commit_shas").is_some());
        assert!(q.param("missing").is_none());
    }
}
