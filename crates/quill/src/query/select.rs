//! SELECT builder.

use super::{Construct, Filter, Query, QueryCore, QueryKind, Table};
use crate::condition::{Condition, render_conditions};
use crate::connection::Connection;
use crate::error::DbResult;
use std::sync::Arc;

/// SELECT statement builder.
#[derive(Clone, Debug)]
pub struct Select {
    core: QueryCore,
    /// SELECT DISTINCT
    distinct: bool,
    /// Column expressions (`*` when empty)
    columns: Vec<String>,
    /// JOIN clauses
    joins: Vec<String>,
    /// GROUP BY expressions
    group_by: Vec<String>,
    /// HAVING conditions
    having: Vec<Condition>,
    /// ORDER BY expressions
    order_by: Vec<String>,
    /// LIMIT
    limit: Option<u64>,
    /// OFFSET
    offset: Option<u64>,
}

impl Select {
    /// Create a SELECT builder using the registry's default connection.
    pub fn new(table: impl Into<Table>) -> DbResult<Self> {
        Self::for_table(table)
    }

    /// Create a SELECT builder bound to `connection`.
    pub fn with_connection(table: impl Into<Table>, connection: Arc<dyn Connection>) -> Self {
        Self::with_table_and_connection(Some(table.into()), connection)
    }

    /// Create a SELECT without a FROM clause (e.g. `SELECT NOW()`).
    pub fn without_table(connection: Arc<dyn Connection>) -> Self {
        Self::with_table_and_connection(None, connection)
    }

    // ==================== SELECT columns ====================

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Replace the column list.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Append one column expression.
    pub fn add_column(mut self, col: &str) -> Self {
        self.columns.push(col.to_string());
        self
    }

    /// Append `expr AS alias`.
    pub fn column_as(mut self, expr: &str, alias: &str) -> Self {
        self.columns.push(format!("{} AS {}", expr, alias));
        self
    }

    // ==================== JOIN ====================

    /// Add INNER JOIN.
    pub fn inner_join(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("INNER JOIN {} ON {}", table, on));
        self
    }

    /// Add LEFT JOIN.
    pub fn left_join(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("LEFT JOIN {} ON {}", table, on));
        self
    }

    /// Add RIGHT JOIN.
    pub fn right_join(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("RIGHT JOIN {} ON {}", table, on));
        self
    }

    /// Add FULL OUTER JOIN.
    pub fn full_join(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("FULL OUTER JOIN {} ON {}", table, on));
        self
    }

    // ==================== Grouping / ordering ====================

    pub fn group_by(mut self, expr: &str) -> Self {
        self.group_by.push(expr.to_string());
        self
    }

    /// Add a HAVING condition. Joins follow the same rules as WHERE.
    pub fn having(mut self, condition: Condition) -> Self {
        self.having.push(condition);
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

    /// Set LIMIT/OFFSET for a 1-based page. Page 0 is treated as page 1.
    ///
    /// The offset saturates at `u64::MAX` instead of overflowing.
    pub fn paginate(self, page: u64, per_page: u64) -> Self {
        let page = page.max(1);
        self.limit(per_page).offset((page - 1).saturating_mul(per_page))
    }
}

impl Query for Select {
    fn core(&self) -> &QueryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut QueryCore {
        &mut self.core
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Select
    }

    fn rebind(&mut self, connection: &Arc<dyn Connection>) {
        self.core.rebind(connection);
        for cond in &mut self.having {
            cond.rebind(connection);
        }
    }

    fn build(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }

        if self.core.table().is_some() {
            sql.push_str(" FROM ");
            sql.push_str(&self.core.table_sql());
        }

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        sql.push_str(&self.core.where_sql());

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&render_conditions(
                &self.having,
                self.core.connection().as_ref(),
            ));
        }

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
}

impl Filter for Select {}

impl Construct for Select {
    fn with_table_and_connection(table: Option<Table>, connection: Arc<dyn Connection>) -> Self {
        Self {
            core: QueryCore::new(table, connection),
            distinct: false,
            columns: Vec::new(),
            joins: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}
