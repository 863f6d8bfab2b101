//! Convenient imports for typical `quill` usage.
//!
//! ```ignore
//! use quill::prelude::*;
//! ```

pub use crate::{
    Condition, Connection, Construct, DataSet, DatabaseConfig, DbError, DbResult, Filter, Query,
    ResultSet, Select, Value,
};
