//! In-memory fake driver for unit tests.

use crate::connection::{Connection, ResultSet};
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use std::sync::Mutex;

/// Records every executed statement and answers with a canned result.
///
/// Quoting wraps text in single quotes and doubles embedded quotes.
/// A tagged fake prefixes the text with its tag.
#[derive(Debug, Default)]
pub struct FakeConnection {
    executed: Mutex<Vec<String>>,
    response: ResultSet,
    fail_with: Option<String>,
    tag: Option<String>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every query with `response`.
    pub fn with_response(mut self, response: ResultSet) -> Self {
        self.response = response;
        self
    }

    /// Fail every query with a driver error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Quote as `'tag:text'`, so literals show which connection escaped them.
    pub fn tagged(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            ..Self::default()
        }
    }

    /// Statements executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn query(&self, sql: &str) -> DbResult<ResultSet> {
        self.executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(sql.to_string());
        match &self.fail_with {
            Some(message) => Err(DbError::backend(std::io::Error::other(message.clone()))),
            None => Ok(self.response.clone()),
        }
    }

    fn quote(&self, raw: &str) -> String {
        let escaped = raw.replace('\'', "''");
        match &self.tag {
            Some(tag) => format!("'{}:{}'", tag, escaped),
            None => format!("'{}'", escaped),
        }
    }
}
