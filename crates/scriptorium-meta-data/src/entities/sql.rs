//! Shared helpers for translating a [`Query`] into parameterized SQL
//!
//! Each store owns a fixed allow-list of column names it understands;
//! [`build_where`] rejects anything else with `QueryError::UnknownField`,
//! matching "Unknown condition fields fail at translation time."

use serde_json::Value;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::Query as SqlxQuery;

use crate::query::{Query, QueryError};

/// A translated `WHERE ... ORDER BY ... LIMIT ... OFFSET ...` fragment plus
/// the bind values for its placeholders, in order.
pub struct Translated {
    pub sql: String,
    pub binds: Vec<Value>,
}

/// Build the full trailing SQL fragment (`WHERE` through `OFFSET`) for
/// `query`, validating every condition and ordering field against
/// `allowed_fields`.
pub fn build_fragment(allowed_fields: &[&str], query: &Query) -> Result<Translated, QueryError> {
    let mut clauses = Vec::new();
    let mut binds: Vec<Value> = Vec::new();
    let mut idx = 0usize;

    for cond in query.conditions() {
        if !allowed_fields.contains(&cond.field) {
            return Err(QueryError::UnknownField(cond.field.to_string()));
        }
        if cond.in_list {
            let placeholders: Vec<String> = cond
                .values
                .iter()
                .map(|_| {
                    idx += 1;
                    format!("${idx}")
                })
                .collect();
            clauses.push(format!("{} IN ({})", cond.field, placeholders.join(", ")));
            binds.extend(cond.values.iter().cloned());
        } else if let Some(v) = cond.values.first() {
            idx += 1;
            clauses.push(format!("{} = ${idx}", cond.field));
            binds.push(v.clone());
        }
    }

    let mut sql = String::new();
    if !clauses.is_empty() {
        sql.push_str("WHERE ");
        sql.push_str(&clauses.join(" AND "));
        sql.push(' ');
    }

    if !query.orderings().is_empty() {
        let mut order_parts = Vec::new();
        for order in query.orderings() {
            if !allowed_fields.contains(&order.field) {
                return Err(QueryError::UnknownField(order.field.to_string()));
            }
            let dir = if order.ascending { "ASC" } else { "DESC" };
            order_parts.push(format!("{} {dir}", order.field));
        }
        sql.push_str("ORDER BY ");
        sql.push_str(&order_parts.join(", "));
        sql.push(' ');
    }

    if let Some(limit) = query.limit() {
        sql.push_str(&format!("LIMIT {limit} "));
    }
    if let Some(offset) = query.offset() {
        sql.push_str(&format!("OFFSET {offset} "));
    }

    Ok(Translated {
        sql: sql.trim_end().to_string(),
        binds,
    })
}

/// Bind a JSON condition value onto a runtime-built `sqlx` query, picking
/// the encoding that matches its JSON type.
pub fn bind_value<'q>(
    q: SqlxQuery<'q, Postgres, PgArguments>,
    value: &'q Value,
) -> SqlxQuery<'q, Postgres, PgArguments> {
    match value {
        Value::String(s) => q.bind(s.as_str()),
        Value::Number(n) if n.is_i64() => q.bind(n.as_i64()),
        Value::Number(n) if n.is_u64() => q.bind(n.as_u64().map(|u| u as i64)),
        Value::Number(n) => q.bind(n.as_f64()),
        Value::Bool(b) => q.bind(*b),
        Value::Null => q.bind(Option::<String>::None),
        other => q.bind(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Cond;

    const FIELDS: &[&str] = &["repo_id", "sha"];

    #[test]
    fn rejects_unknown_field() {
        let q = Query::new().with(Cond::eq("nope", "x"));
        assert!(matches!(
            build_fragment(FIELDS, &q),
            Err(QueryError::UnknownField(_))
        ));
    }

    #[test]
    fn builds_where_and_order() {
        let q = Query::new()
            .with(Cond::eq("repo_id", 1))
            .order_by("sha", true)
            .with_limit(5);
        let translated = build_fragment(FIELDS, &q).unwrap();
        assert!(translated.sql.contains("WHERE repo_id = $1"));
        assert!(translated.sql.contains("ORDER BY sha ASC"));
        assert!(translated.sql.contains("LIMIT 5"));
        assert_eq!(translated.binds.len(), 1);
    }

    #[test]
    fn zero_limit_omits_limit_clause() {
        let q = Query::new().with_limit(0);
        let translated = build_fragment(FIELDS, &q).unwrap();
        assert!(!translated.sql.contains("LIMIT"));
    }
}
