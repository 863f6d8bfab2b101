//! INSERT builder.

use super::{Construct, Query, QueryCore, QueryKind, Table};
use crate::connection::Connection;
use crate::dataset::DataSet;
use crate::error::DbResult;
use crate::value::Value;
use std::sync::Arc;

/// INSERT statement builder.
///
/// Renders `INSERT INTO t (c1, c2) VALUES (v1, v2)`; an empty data set renders
/// `INSERT INTO t DEFAULT VALUES`.
#[derive(Clone, Debug)]
pub struct Insert {
    core: QueryCore,
    data: DataSet,
    on_conflict_do_nothing: bool,
    returning: Vec<String>,
}

impl Insert {
    /// Create an INSERT builder using the registry's default connection.
    pub fn new(table: impl Into<Table>) -> DbResult<Self> {
        Self::for_table(table)
    }

    /// Create an INSERT builder bound to `connection`.
    pub fn with_connection(table: impl Into<Table>, connection: Arc<dyn Connection>) -> Self {
        Self::with_table_and_connection(Some(table.into()), connection)
    }

    /// Replace the data set.
    pub fn data(mut self, data: DataSet) -> Self {
        self.data = data;
        self
    }

    /// Set one column value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.data.set(column, value);
        self
    }

    /// Set one column to a literal SQL expression.
    ///
    /// # Safety
    ///
    /// This directly concatenates SQL. The caller must ensure safety.
    pub fn set_literal(mut self, column: &str, expr: &str) -> Self {
        self.data = self.data.add_literal(column, expr);
        self
    }

    pub fn get_data(&self) -> &DataSet {
        &self.data
    }

    /// Append `ON CONFLICT DO NOTHING`.
    pub fn on_conflict_do_nothing(mut self) -> Self {
        self.on_conflict_do_nothing = true;
        self
    }

    /// Set RETURNING columns.
    pub fn returning(mut self, cols: &[&str]) -> Self {
        self.returning = cols.iter().map(|s| s.to_string()).collect();
        self
    }
}

impl Query for Insert {
    fn core(&self) -> &QueryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut QueryCore {
        &mut self.core
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Insert
    }

    fn build(&self) -> String {
        let mut sql = format!("INSERT INTO {}", self.core.table_sql());

        if self.data.is_empty() {
            sql.push_str(" DEFAULT VALUES");
        } else {
            let conn = self.core.connection().as_ref();
            let values: Vec<String> = self.data.iter().map(|(_, e)| e.render(conn)).collect();
            sql.push_str(&format!(
                " ({}) VALUES ({})",
                self.data.columns().join(", "),
                values.join(", ")
            ));
        }

        if self.on_conflict_do_nothing {
            sql.push_str(" ON CONFLICT DO NOTHING");
        }

        if !self.returning.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning.join(", "));
        }

        sql
    }
}

impl Construct for Insert {
    fn with_table_and_connection(table: Option<Table>, connection: Arc<dyn Connection>) -> Self {
        Self {
            core: QueryCore::new(table, connection),
            data: DataSet::new(),
            on_conflict_do_nothing: false,
            returning: Vec::new(),
        }
    }
}
