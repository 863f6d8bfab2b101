//! DELETE builder.

use super::{Construct, Filter, Query, QueryCore, QueryKind, Table};
use crate::connection::Connection;
use crate::error::DbResult;
use std::sync::Arc;

/// DELETE statement builder.
///
/// Without WHERE conditions the builder renders the no-op
/// `DELETE FROM t WHERE 1=0` unless [`Delete::allow_delete_all`] is set.
#[derive(Clone, Debug)]
pub struct Delete {
    core: QueryCore,
    /// RETURNING columns
    returning: Vec<String>,
    /// Allow deleting every row (no WHERE)
    allow_delete_all: bool,
}

impl Delete {
    /// Create a DELETE builder using the registry's default connection.
    pub fn new(table: impl Into<Table>) -> DbResult<Self> {
        Self::for_table(table)
    }

    /// Create a DELETE builder bound to `connection`.
    pub fn with_connection(table: impl Into<Table>, connection: Arc<dyn Connection>) -> Self {
        Self::with_table_and_connection(Some(table.into()), connection)
    }

    /// Allow a DELETE without WHERE conditions to remove every row.
    pub fn allow_delete_all(mut self, allow: bool) -> Self {
        self.allow_delete_all = allow;
        self
    }

    /// Set RETURNING columns.
    pub fn returning(mut self, cols: &[&str]) -> Self {
        self.returning = cols.iter().map(|s| s.to_string()).collect();
        self
    }
}

impl Query for Delete {
    fn core(&self) -> &QueryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut QueryCore {
        &mut self.core
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Delete
    }

    fn build(&self) -> String {
        let table = self.core.table_sql();
        if self.core.conditions().is_empty() && !self.allow_delete_all {
            return format!("DELETE FROM {} WHERE 1=0", table);
        }

        let mut sql = format!("DELETE FROM {}", table);
        sql.push_str(&self.core.where_sql());

        if !self.returning.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning.join(", "));
        }

        sql
    }
}

impl Filter for Delete {}

impl Construct for Delete {
    fn with_table_and_connection(table: Option<Table>, connection: Arc<dyn Connection>) -> Self {
        Self {
            core: QueryCore::new(table, connection),
            returning: Vec::new(),
            allow_delete_all: false,
        }
    }
}
