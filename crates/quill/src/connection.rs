//! Driver boundary: the capabilities a query needs from a database connection.
//!
//! A [`Connection`] exposes exactly two primitives: executing a complete SQL
//! string and quoting raw text as an embeddable literal. Builders only ever
//! talk to this trait, so they can be exercised against a fake driver without
//! a database.

use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use tokio_postgres::SimpleQueryMessage;

/// A database connection as seen by the query builders.
///
/// Implemented for `tokio_postgres::Client` and, with the `pool` feature,
/// for pooled `deadpool_postgres::Client` handles.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute a complete SQL statement and return its result.
    async fn query(&self, sql: &str) -> DbResult<ResultSet>;

    /// Quote raw text as a SQL string literal, including the surrounding quotes.
    fn quote(&self, raw: &str) -> String;
}

/// The result of executing a statement.
///
/// Values are kept in their text form, as returned by the simple query
/// protocol. `None` marks a SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// Column names, in select-list order
    pub columns: Vec<String>,
    /// Row values, one `Vec` per row
    pub rows: Vec<Vec<Option<String>>>,
    /// Rows affected (or returned) by the last statement
    pub rows_affected: u64,
}

impl ResultSet {
    /// Create a result that only reports an affected-row count.
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    /// Number of returned rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were returned.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a value by row index and column name.
    ///
    /// Returns `None` when the row or column does not exist, or the value is NULL.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }
}

/// Quote `raw` as a Postgres string literal.
///
/// Embedded single quotes are doubled. Text containing a backslash is emitted
/// as an escape string (`E'...'`) with the backslashes doubled, so the literal
/// reads the same regardless of `standard_conforming_strings`.
pub fn pg_quote_literal(raw: &str) -> String {
    let has_backslash = raw.contains('\\');
    let mut out = String::with_capacity(raw.len() + 3);
    if has_backslash {
        out.push('E');
    }
    out.push('\'');
    for ch in raw.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

async fn simple_query(client: &tokio_postgres::Client, sql: &str) -> DbResult<ResultSet> {
    let messages = client.simple_query(sql).await.map_err(DbError::from)?;

    let mut result = ResultSet::default();
    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                result.columns = columns.iter().map(|c| c.name().to_string()).collect();
            }
            SimpleQueryMessage::Row(row) => {
                if result.columns.is_empty() {
                    result.columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                }
                let values = (0..row.len()).map(|i| row.get(i).map(str::to_string)).collect();
                result.rows.push(values);
            }
            SimpleQueryMessage::CommandComplete(n) => {
                result.rows_affected = n;
            }
            _ => {}
        }
    }
    Ok(result)
}

#[async_trait]
impl Connection for tokio_postgres::Client {
    async fn query(&self, sql: &str) -> DbResult<ResultSet> {
        simple_query(self, sql).await
    }

    fn quote(&self, raw: &str) -> String {
        pg_quote_literal(raw)
    }
}

#[cfg(feature = "pool")]
#[async_trait]
impl Connection for deadpool_postgres::Client {
    async fn query(&self, sql: &str) -> DbResult<ResultSet> {
        simple_query(self, sql).await
    }

    fn quote(&self, raw: &str) -> String {
        pg_quote_literal(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_plain_text() {
        assert_eq!(pg_quote_literal("active"), "'active'");
        assert_eq!(pg_quote_literal(""), "''");
    }

    #[test]
    fn quote_doubles_single_quotes() {
        assert_eq!(pg_quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(pg_quote_literal("'; DROP TABLE users; --"), "'''; DROP TABLE users; --'");
    }

    #[test]
    fn quote_backslashes_use_escape_string() {
        assert_eq!(pg_quote_literal(r"C:\tmp"), r"E'C:\\tmp'");
        assert_eq!(pg_quote_literal(r"\'"), r"E'\\'''");
    }

    #[test]
    fn result_set_lookup() {
        let rs = ResultSet {
            columns: vec!["id".into(), "name".into()],
            rows: vec![
                vec![Some("1".into()), Some("alice".into())],
                vec![Some("2".into()), None],
            ],
            rows_affected: 2,
        };
        assert_eq!(rs.len(), 2);
        assert!(!rs.is_empty());
        assert_eq!(rs.get(0, "name"), Some("alice"));
        assert_eq!(rs.get(1, "name"), None);
        assert_eq!(rs.get(1, "id"), Some("2"));
        assert_eq!(rs.get(5, "id"), None);
        assert_eq!(rs.get(0, "missing"), None);
    }

    #[test]
    fn affected_only_result() {
        let rs = ResultSet::affected(3);
        assert!(rs.is_empty());
        assert_eq!(rs.rows_affected, 3);
    }
}
