//! UPDATE builder.

use super::{Construct, Filter, Query, QueryCore, QueryKind, Table};
use crate::connection::Connection;
use crate::dataset::DataSet;
use crate::error::{DbError, DbResult};
use crate::value::Value;
use std::sync::Arc;

/// UPDATE statement builder.
#[derive(Clone, Debug)]
pub struct Update {
    core: QueryCore,
    /// SET columns
    data: DataSet,
    /// RETURNING columns
    returning: Vec<String>,
}

impl Update {
    /// Create an UPDATE builder using the registry's default connection.
    pub fn new(table: impl Into<Table>) -> DbResult<Self> {
        Self::for_table(table)
    }

    /// Create an UPDATE builder bound to `connection`.
    pub fn with_connection(table: impl Into<Table>, connection: Arc<dyn Connection>) -> Self {
        Self::with_table_and_connection(Some(table.into()), connection)
    }

    /// Replace the SET data.
    pub fn data(mut self, data: DataSet) -> Self {
        self.data = data;
        self
    }

    /// Set a column.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.data.set(column, value);
        self
    }

    /// Set a column to a raw SQL expression.
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

    /// Set RETURNING columns.
    pub fn returning(mut self, cols: &[&str]) -> Self {
        self.returning = cols.iter().map(|s| s.to_string()).collect();
        self
    }
}

impl Query for Update {
    fn core(&self) -> &QueryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut QueryCore {
        &mut self.core
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Update
    }

    fn build(&self) -> String {
        let conn = self.core.connection().as_ref();
        let set_parts: Vec<String> = self
            .data
            .iter()
            .map(|(col, entry)| format!("{} = {}", col, entry.render(conn)))
            .collect();

        let mut sql = format!(
            "UPDATE {} SET {}",
            self.core.table_sql(),
            set_parts.join(", ")
        );
        sql.push_str(&self.core.where_sql());

        if !self.returning.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning.join(", "));
        }

        sql
    }

    fn validate(&self) -> DbResult<()> {
        if self.data.is_empty() {
            return Err(DbError::validation("Update: SET clause cannot be empty"));
        }
        Ok(())
    }
}

impl Filter for Update {}

impl Construct for Update {
    fn with_table_and_connection(table: Option<Table>, connection: Arc<dyn Connection>) -> Self {
        Self {
            core: QueryCore::new(table, connection),
            data: DataSet::new(),
            returning: Vec::new(),
        }
    }
}
