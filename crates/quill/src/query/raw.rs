//! Pass-through statements.

use super::{Query, QueryCore, QueryKind};
use crate::connection::Connection;
use crate::error::DbResult;
use std::sync::Arc;

/// A SQL statement executed exactly as written.
///
/// # Safety
///
/// The text is neither escaped nor validated. The caller must ensure safety.
#[derive(Clone, Debug)]
pub struct Raw {
    core: QueryCore,
    statement: String,
}

impl Raw {
    /// Create a raw statement using the registry's default connection.
    pub fn new(statement: impl Into<String>) -> DbResult<Self> {
        let conn = QueryCore::resolve(None)?;
        Ok(Self::with_connection(statement, conn))
    }

    /// Create a raw statement bound to `connection`.
    pub fn with_connection(statement: impl Into<String>, connection: Arc<dyn Connection>) -> Self {
        Self {
            core: QueryCore::new(None, connection),
            statement: statement.into(),
        }
    }
}

impl Query for Raw {
    fn core(&self) -> &QueryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut QueryCore {
        &mut self.core
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Raw
    }

    fn build(&self) -> String {
        self.statement.clone()
    }
}
