//! Error types for quill

use thiserror::Error;

/// Result type alias for quill operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for building and executing queries
#[derive(Debug, Error)]
pub enum DbError {
    /// No database connection could be resolved
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error returned by the Postgres driver, passed through unmodified
    #[error("Driver error: {0}")]
    Driver(#[from] tokio_postgres::Error),

    /// Error returned by any other driver behind [`crate::Connection`]
    #[error("Driver error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    /// Builder state cannot produce an executable statement
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl DbError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap an error coming from a non-Postgres driver
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }

    /// Check if this is a connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Check if this error came from the driver
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_) | Self::Backend(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
