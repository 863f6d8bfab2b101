//! Query builders.
//!
//! Every builder owns a [`QueryCore`]: the target table, the connection used
//! for quoting and execution, and the ordered WHERE conditions. Shared
//! behaviour lives in two traits:
//!
//! - [`Query`]: table/connection access, `build()`, `execute()`.
//! - [`Filter`]: the `where_*` family, for statements that take a WHERE clause.
//!
//! Builders are consumed by value, so calls chain:
//!
//! ```ignore
//! use quill::prelude::*;
//!
//! let sql = quill::select("users")?
//!     .columns(&["id", "name"])
//!     .where_equal("status", "active")
//!     .where_in("id", vec![1, 2, 3])
//!     .build();
//! assert_eq!(sql, "SELECT id, name FROM users WHERE status = 'active' AND id IN (1,2,3)");
//! ```
//!
//! Construction without an explicit connection borrows the registry's default
//! and fails with [`DbError::Connection`] when there is none.

mod delete;
mod insert;
mod raw;
mod select;
mod union;
mod update;


pub use delete::Delete;
pub use insert::Insert;
pub use raw::Raw;
pub use select::Select;
pub use union::Union;
pub use update::Update;

use crate::condition::{Condition, Operand, render_conditions};
use crate::connection::{Connection, ResultSet};
use crate::dataset::DataSet;
use crate::error::{DbError, DbResult};
use crate::value::{Value, convert_types};
use std::fmt;
use std::sync::Arc;

/// The kind of statement a builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    Union,
    Raw,
}

/// A query used as a FROM source.
#[derive(Debug, Clone)]
pub enum NestedQuery {
    Select(Select),
    Union(Union),
    Raw(Raw),
}

impl NestedQuery {
    fn build(&self) -> String {
        match self {
            NestedQuery::Select(q) => q.build(),
            NestedQuery::Union(q) => q.build(),
            NestedQuery::Raw(q) => q.build(),
        }
    }

    fn rebind(&mut self, connection: &Arc<dyn Connection>) {
        match self {
            NestedQuery::Select(q) => q.rebind(connection),
            NestedQuery::Union(q) => q.rebind(connection),
            NestedQuery::Raw(q) => q.rebind(connection),
        }
    }
}

impl From<Select> for NestedQuery {
    fn from(q: Select) -> Self {
        NestedQuery::Select(q)
    }
}

impl From<Union> for NestedQuery {
    fn from(q: Union) -> Self {
        NestedQuery::Union(q)
    }
}

impl From<Raw> for NestedQuery {
    fn from(q: Raw) -> Self {
        NestedQuery::Raw(q)
    }
}

/// The table a statement acts upon.
#[derive(Debug, Clone)]
pub enum Table {
    /// A plain table name
    Name(String),
    /// A table name with an alias: `name AS alias`
    Aliased { name: String, alias: String },
    /// A sub-query: `(SELECT ...) AS alias`
    Subquery {
        query: Box<NestedQuery>,
        alias: Option<String>,
    },
}

impl Table {
    /// Use `query` as the table, without an alias.
    pub fn subquery(query: impl Into<NestedQuery>) -> Self {
        Table::Subquery {
            query: Box::new(query.into()),
            alias: None,
        }
    }

    /// Attach an alias. Plain names become [`Table::Aliased`].
    pub fn with_alias(self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        match self {
            Table::Name(name) | Table::Aliased { name, .. } => Table::Aliased { name, alias },
            Table::Subquery { query, .. } => Table::Subquery {
                query,
                alias: Some(alias),
            },
        }
    }

    /// Render the table reference.
    pub fn render(&self) -> String {
        match self {
            Table::Name(name) => name.clone(),
            Table::Aliased { name, alias } => format!("{} AS {}", name, alias),
            Table::Subquery { query, alias } => match alias {
                Some(alias) => format!("({}) AS {}", query.build(), alias),
                None => format!("({})", query.build()),
            },
        }
    }

    fn rebind(&mut self, connection: &Arc<dyn Connection>) {
        if let Table::Subquery { query, .. } = self {
            query.rebind(connection);
        }
    }
}

impl From<&str> for Table {
    fn from(name: &str) -> Self {
        Table::Name(name.to_string())
    }
}

impl From<String> for Table {
    fn from(name: String) -> Self {
        Table::Name(name)
    }
}

impl From<Select> for Table {
    fn from(query: Select) -> Self {
        Table::subquery(query)
    }
}

impl From<Union> for Table {
    fn from(query: Union) -> Self {
        Table::subquery(query)
    }
}

impl From<Raw> for Table {
    fn from(query: Raw) -> Self {
        Table::subquery(query)
    }
}

impl From<NestedQuery> for Table {
    fn from(query: NestedQuery) -> Self {
        Table::subquery(query)
    }
}

/// State shared by every builder.
#[derive(Clone)]
pub struct QueryCore {
    table: Option<Table>,
    connection: Arc<dyn Connection>,
    conditions: Vec<Condition>,
}

impl QueryCore {
    pub fn new(table: Option<Table>, connection: Arc<dyn Connection>) -> Self {
        Self {
            table,
            connection,
            conditions: Vec::new(),
        }
    }

    /// Resolve a connection: the explicit one if given, else the registry default.
    pub fn resolve(connection: Option<Arc<dyn Connection>>) -> DbResult<Arc<dyn Connection>> {
        match connection {
            Some(conn) => Ok(conn),
            None => crate::registry::get().map_err(|e| {
                tracing::debug!(target: "quill.sql", error = %e, "no default connection");
                DbError::connection("Unable to find a database connection.")
            }),
        }
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Rendered table reference, or an empty string when none is set.
    pub fn table_sql(&self) -> String {
        self.table.as_ref().map(Table::render).unwrap_or_default()
    }

    /// Replace the connection here and in every nested query.
    pub(crate) fn rebind(&mut self, connection: &Arc<dyn Connection>) {
        self.connection = Arc::clone(connection);
        if let Some(table) = self.table.as_mut() {
            table.rebind(connection);
        }
        for cond in &mut self.conditions {
            cond.rebind(connection);
        }
    }

    /// ` WHERE ...`, or an empty string when there are no conditions.
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }
        format!(
            " WHERE {}",
            render_conditions(&self.conditions, self.connection.as_ref())
        )
    }
}

impl fmt::Debug for QueryCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCore")
            .field("table", &self.table)
            .field("conditions", &self.conditions)
            .finish_non_exhaustive()
    }
}

/// Base trait for all builders.
pub trait Query: Send + Sync {
    /// Shared state.
    fn core(&self) -> &QueryCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut QueryCore;

    /// The statement kind, used for logging.
    fn kind(&self) -> QueryKind;

    /// Render the SQL statement.
    ///
    /// Pure: calling it twice on an unmodified builder yields the same text.
    fn build(&self) -> String;

    /// Validate builder state before execution.
    fn validate(&self) -> DbResult<()> {
        Ok(())
    }

    fn table(&self) -> Option<&Table> {
        self.core().table()
    }

    /// Set the target table, optionally aliased.
    fn set_table(mut self, table: impl Into<Table>, alias: Option<&str>) -> Self
    where
        Self: Sized,
    {
        let table = table.into();
        self.core_mut().table = Some(match alias {
            Some(alias) => table.with_alias(alias),
            None => table,
        });
        self
    }

    /// Alias for [`Query::set_table`].
    fn from_table(self, table: impl Into<Table>, alias: Option<&str>) -> Self
    where
        Self: Sized,
    {
        self.set_table(table, alias)
    }

    /// Use a sub-query as the table: `(SELECT ...) AS alias`.
    fn set_table_query(self, query: impl Into<NestedQuery>, alias: Option<&str>) -> Self
    where
        Self: Sized,
    {
        self.set_table(query.into(), alias)
    }

    fn connection(&self) -> &Arc<dyn Connection> {
        self.core().connection()
    }

    /// Point this query and every nested query at `connection`.
    fn rebind(&mut self, connection: &Arc<dyn Connection>) {
        self.core_mut().rebind(connection);
    }

    /// Replace the connection, including the one used by nested queries.
    fn set_connection(mut self, connection: Arc<dyn Connection>) -> Self
    where
        Self: Sized,
    {
        self.rebind(&connection);
        self
    }

    /// Convert a value into a literal using this query's connection.
    fn convert(&self, value: impl Into<Value>) -> String
    where
        Self: Sized,
    {
        convert_types(&value.into(), self.connection().as_ref())
    }

    /// Build the statement and run it.
    ///
    /// An explicit `connection` replaces the one held by the query and by
    /// every nested query before building, so quoting and execution use the
    /// same driver. Driver errors are returned unmodified.
    fn execute(
        &mut self,
        connection: Option<Arc<dyn Connection>>,
    ) -> impl std::future::Future<Output = DbResult<ResultSet>> + Send
    where
        Self: Sized,
    {
        async move {
            if let Some(conn) = connection {
                self.rebind(&conn);
            }
            self.validate()?;

            let sql = self.build();
            let conn = Arc::clone(self.connection());
            let kind = self.kind();
            tracing::debug!(
                target: "quill.sql",
                kind = ?kind,
                sql = %crate::config::truncate_sql(&sql),
                "executing query"
            );

            conn.query(&sql).await.inspect_err(|e| {
                tracing::warn!(target: "quill.sql", kind = ?kind, error = %e, "query failed");
            })
        }
    }
}

/// WHERE clause methods for SELECT, UPDATE and DELETE builders.
///
/// Conditions are appended in call order and rendered in that order. The
/// `where_*` methods join with AND, the `or_where_*` methods with OR.
pub trait Filter: Query + Sized {
    /// Append a condition.
    fn add_where(mut self, condition: Condition) -> Self {
        self.core_mut().conditions.push(condition);
        self
    }

    /// Remove every condition.
    fn clear_where(mut self) -> Self {
        self.core_mut().conditions.clear();
        self
    }

    fn conditions(&self) -> &[Condition] {
        self.core().conditions()
    }

    /// WHERE column operator value (see [`Condition::get`]).
    fn where_condition(
        self,
        column: &str,
        operator: &str,
        value: impl Into<Value>,
        column_join: bool,
    ) -> Self {
        self.add_where(Condition::get(column, operator, value, column_join))
    }

    /// Raw WHERE predicate.
    ///
    /// # Safety
    ///
    /// This directly concatenates SQL. The caller must ensure safety.
    fn where_statement(self, sql: &str) -> Self {
        self.add_where(Condition::statement(sql))
    }

    /// Sub-query used as a predicate.
    fn where_statement_query(self, select: Select) -> Self {
        self.add_where(Condition::statement_query(select))
    }

    /// WHERE column = value
    fn where_equal(self, column: &str, value: impl Into<Value>) -> Self {
        self.add_where(Condition::equal(column, value))
    }

    /// WHERE column = other_column
    fn where_column_equal(self, column: &str, other: &str) -> Self {
        self.add_where(Condition::equal_column(column, other))
    }

    /// WHERE column LIKE pattern
    fn where_like(self, column: &str, pattern: impl Into<Value>) -> Self {
        self.add_where(Condition::like(column, pattern))
    }

    /// WHERE column IS NULL
    fn where_null(self, column: &str) -> Self {
        self.add_where(Condition::null(column))
    }

    /// WHERE column IN (values)
    fn where_in<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.add_where(Condition::in_list(column, values))
    }

    /// WHERE column IN (sub-query)
    fn where_in_query(self, column: &str, select: Select) -> Self {
        self.add_where(Condition::in_query(column, select))
    }

    /// WHERE column BETWEEN start AND end
    fn where_between(self, column: &str, start: impl Into<Value>, end: impl Into<Value>) -> Self {
        self.add_where(Condition::between(column, start, end))
    }

    /// WHERE column BETWEEN start AND end, with column or sub-query bounds.
    fn where_between_operands(self, column: &str, start: Operand, end: Operand) -> Self {
        self.add_where(Condition::between_operands(column, start, end))
    }

    // ==================== OR-joined variants ====================

    fn or_where_statement(self, sql: &str) -> Self {
        self.add_where(Condition::statement(sql).or())
    }

    fn or_where_equal(self, column: &str, value: impl Into<Value>) -> Self {
        self.add_where(Condition::equal(column, value).or())
    }

    fn or_where_like(self, column: &str, pattern: impl Into<Value>) -> Self {
        self.add_where(Condition::like(column, pattern).or())
    }

    fn or_where_null(self, column: &str) -> Self {
        self.add_where(Condition::null(column).or())
    }

    fn or_where_in<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.add_where(Condition::in_list(column, values).or())
    }

    fn or_where_between(
        self,
        column: &str,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        self.add_where(Condition::between(column, start, end).or())
    }
}

/// Builders that can be created for a single table.
pub trait Construct: Query + Sized {
    /// Create a builder bound to `connection`.
    fn with_table_and_connection(table: Option<Table>, connection: Arc<dyn Connection>) -> Self;

    /// Create a builder for `table` using the registry's default connection.
    fn for_table(table: impl Into<Table>) -> DbResult<Self> {
        let conn = QueryCore::resolve(None)?;
        Ok(Self::with_table_and_connection(Some(table.into()), conn))
    }
}

macro_rules! impl_display {
    ($($t:ty),*) => {
        $(
            impl fmt::Display for $t {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.build())
                }
            }
        )*
    };
}

impl_display!(Select, Insert, Update, Delete, Union, Raw);

// ==================== Factories ====================

/// Create a builder of type `Q` for `table`.
///
/// # Example
/// ```ignore
/// let q = quill::table::<quill::Delete>("sessions")?;
/// ```
pub fn table<Q: Construct>(table: impl Into<Table>) -> DbResult<Q> {
    Q::for_table(table)
}

/// Create a SELECT builder.
pub fn select(table: impl Into<Table>) -> DbResult<Select> {
    Select::new(table)
}

/// Create an INSERT builder.
pub fn insert(table: impl Into<Table>) -> DbResult<Insert> {
    Insert::new(table)
}

/// Create an UPDATE builder.
pub fn update(table: impl Into<Table>) -> DbResult<Update> {
    Update::new(table)
}

/// Create a DELETE builder.
pub fn delete(table: impl Into<Table>) -> DbResult<Delete> {
    Delete::new(table)
}

/// Create a UNION builder over `queries`.
pub fn union(queries: Vec<Select>) -> DbResult<Union> {
    Union::new(queries)
}

/// Create an empty [`DataSet`].
pub fn data_set() -> DataSet {
    DataSet::new()
}

/// Create a pass-through statement. The text is not escaped.
pub fn raw(statement: impl Into<String>) -> DbResult<Raw> {
    Raw::new(statement)
}

/// Get the default connection, or a named one.
pub fn connection(name: Option<&str>) -> DbResult<Arc<dyn Connection>> {
    match name {
        Some(name) => crate::registry::get_named(name),
        None => crate::registry::get(),
    }
}
