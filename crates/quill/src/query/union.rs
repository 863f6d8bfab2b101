//! UNION builder.

use super::{Query, QueryCore, QueryKind, Select};
use crate::connection::Connection;
use crate::error::{DbError, DbResult};
use std::sync::Arc;

/// UNION of several SELECT statements.
///
/// Each member renders in parentheses; ORDER BY / LIMIT / OFFSET apply to the
/// combined result. The table and WHERE state of the shared core are unused.
#[derive(Clone, Debug)]
pub struct Union {
    core: QueryCore,
    queries: Vec<Select>,
    /// UNION ALL instead of UNION
    all: bool,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Union {
    /// Create a UNION using the registry's default connection.
    pub fn new(queries: Vec<Select>) -> DbResult<Self> {
        let conn = QueryCore::resolve(None)?;
        Ok(Self::with_connection(queries, conn))
    }

    /// Create a UNION bound to `connection`.
    pub fn with_connection(queries: Vec<Select>, connection: Arc<dyn Connection>) -> Self {
        Self {
            core: QueryCore::new(None, connection),
            queries,
            all: false,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Append a member query.
    pub fn add_query(mut self, select: Select) -> Self {
        self.queries.push(select);
        self
    }

    /// Replace every member query.
    pub fn set_queries(mut self, queries: Vec<Select>) -> Self {
        self.queries = queries;
        self
    }

    pub fn queries(&self) -> &[Select] {
        &self.queries
    }

    /// Use UNION ALL (keep duplicates).
    pub fn all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }

    pub fn order_by(mut self, expr: &str) -> Self {
        self.order_by.push(expr.to_string());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl Query for Union {
    fn core(&self) -> &QueryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut QueryCore {
        &mut self.core
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Union
    }

    fn rebind(&mut self, connection: &Arc<dyn Connection>) {
        self.core.rebind(connection);
        for q in &mut self.queries {
            q.rebind(connection);
        }
    }

    fn build(&self) -> String {
        if self.queries.is_empty() {
            return String::new();
        }

        let glue = if self.all { " UNION ALL " } else { " UNION " };
        let mut sql = self
            .queries
            .iter()
            .map(|q| format!("({})", q.build()))
            .collect::<Vec<_>>()
            .join(glue);

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        sql
    }

    fn validate(&self) -> DbResult<()> {
        if self.queries.is_empty() {
            return Err(DbError::validation("Union: no queries to combine"));
        }
        Ok(())
    }
}
