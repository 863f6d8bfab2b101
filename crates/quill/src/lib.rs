//! # quill
//!
//! A fluent builder for literal SQL statements.
//!
//! ## Features
//!
//! - **Literal SQL**: values are embedded as escaped literals via [`convert_types`]
//! - **Fluent builders**: SELECT / INSERT / UPDATE / DELETE / UNION plus raw pass-through
//! - **Ordered conditions**: WHERE predicates render exactly in the order they are added
//! - **Driver boundary**: builders only need a [`Connection`] (execute + quote),
//!   so they can be tested against a fake driver
//! - **Connection registry**: a process-wide default (and named) connection
//! - **Safe defaults**: DELETE without WHERE is a no-op, UPDATE requires SET
//!
//! ## Example
//!
//! ```ignore
//! use quill::prelude::*;
//!
//! let config = DatabaseConfig::from_env()?;
//! quill::config::connect(&config).await?;
//!
//! // SELECT
//! let rows = quill::select("users")?
//!     .where_equal("status", "active")
//!     .where_in("id", vec![1, 2, 3])
//!     .order_by("created_at DESC")
//!     .limit(10)
//!     .execute(None)
//!     .await?;
//!
//! // INSERT
//! quill::insert("users")?
//!     .set("username", "alice")
//!     .set("email", "alice@example.com")
//!     .execute(None)
//!     .await?;
//!
//! // UPDATE
//! quill::update("users")?
//!     .set("status", "inactive")
//!     .where_equal("id", 42)
//!     .execute(None)
//!     .await?;
//!
//! // DELETE
//! quill::delete("users")?
//!     .where_equal("id", 42)
//!     .execute(None)
//!     .await?;
//! ```

pub mod condition;
pub mod config;
pub mod connection;
pub mod dataset;
pub mod error;
pub mod prelude;
pub mod query;
pub mod registry;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use condition::{Condition, Join, Operand};
pub use config::DatabaseConfig;
pub use connection::{Connection, ResultSet, pg_quote_literal};
pub use dataset::{DataEntry, DataSet};
pub use error::{DbError, DbResult};
pub use query::{
    Construct, Delete, Filter, Insert, NestedQuery, Query, QueryCore, QueryKind, Raw, Select, Table,
    Union, Update, connection, data_set, delete, insert, raw, select, table, union, update,
};
pub use value::{Value, convert_types, convert_types_default};
