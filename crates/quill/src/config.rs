//! Connection configuration and setup.
//!
//! ```ignore
//! let config = DatabaseConfig::from_env()?;      // reads .env / DATABASE_URL
//! let client = quill::config::connect(&config).await?;
//! // `client` is now the registry entry named `config.name`.
//! ```

use crate::connection::Connection;
use crate::error::{DbError, DbResult};
use crate::registry::{self, DEFAULT_CONNECTION};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_postgres::NoTls;

/// Environment variable holding the connection URL.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Environment variable overriding the registry name.
pub const ENV_CONNECTION_NAME: &str = "QUILL_CONNECTION_NAME";
/// Environment variable overriding the pool size.
pub const ENV_POOL_SIZE: &str = "QUILL_POOL_SIZE";
/// Environment variable overriding the logged SQL length (`0` disables truncation).
pub const ENV_LOG_SQL_MAX: &str = "QUILL_LOG_SQL_MAX";

const DEFAULT_POOL_SIZE: usize = 16;
const DEFAULT_LOG_SQL_MAX: usize = 200;

static LOG_SQL_MAX: AtomicUsize = AtomicUsize::new(DEFAULT_LOG_SQL_MAX);

/// Configuration for a database connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Postgres connection URL
    pub url: String,
    /// Registry name the connection is stored under
    pub name: String,
    /// Maximum pool size (pool feature)
    pub pool_size: usize,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    pub log_sql_max_length: Option<usize>,
}

impl DatabaseConfig {
    /// Create a configuration with defaults for everything but the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: DEFAULT_CONNECTION.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            log_sql_max_length: Some(DEFAULT_LOG_SQL_MAX),
        }
    }

    /// Set the registry name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the maximum pool size.
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the logged SQL length. `0` logs SQL in full, as `QUILL_LOG_SQL_MAX=0` does.
    pub fn log_sql_max_length(mut self, len: usize) -> Self {
        self.log_sql_max_length = (len > 0).then_some(len);
        self
    }

    /// Log SQL in full.
    pub fn no_truncate(mut self) -> Self {
        self.log_sql_max_length = None;
        self
    }

    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> DbResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let url = lookup(ENV_DATABASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| DbError::Config(format!("{} must be set", ENV_DATABASE_URL)))?;

        let mut config = Self::new(url);
        if let Some(name) = lookup(ENV_CONNECTION_NAME).filter(|v| !v.is_empty()) {
            config.name = name;
        }
        if let Some(size) = lookup(ENV_POOL_SIZE) {
            config.pool_size = parse_usize(ENV_POOL_SIZE, &size)?;
        }
        if let Some(len) = lookup(ENV_LOG_SQL_MAX) {
            config.log_sql_max_length = match parse_usize(ENV_LOG_SQL_MAX, &len)? {
                0 => None,
                n => Some(n),
            };
        }
        Ok(config)
    }
}

fn parse_usize(key: &str, raw: &str) -> DbResult<usize> {
    raw.trim()
        .parse()
        .map_err(|e| DbError::Config(format!("{}: invalid value '{}': {}", key, raw, e)))
}

/// Set the logged SQL length for the whole process.
pub fn set_log_sql_max_length(len: Option<usize>) {
    LOG_SQL_MAX.store(len.unwrap_or(usize::MAX), Ordering::Relaxed);
}

/// Truncate SQL for logging, respecting char boundaries.
pub(crate) fn truncate_sql(sql: &str) -> String {
    let max = LOG_SQL_MAX.load(Ordering::Relaxed);
    if sql.len() <= max {
        return sql.to_string();
    }
    let mut end = max;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &sql[..end])
}

/// Open a Postgres connection and register it under `config.name`.
///
/// The connection task is spawned on the current tokio runtime.
pub async fn connect(config: &DatabaseConfig) -> DbResult<Arc<tokio_postgres::Client>> {
    let (client, connection) = tokio_postgres::connect(&config.url, NoTls)
        .await
        .map_err(|e| DbError::connection(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(target: "quill.connection", error = %e, "connection closed with error");
        }
    });

    set_log_sql_max_length(config.log_sql_max_length);
    let client = Arc::new(client);
    registry::register(config.name.clone(), Arc::clone(&client) as Arc<dyn Connection>);
    tracing::info!(target: "quill.connection", connection = %config.name, "connected");
    Ok(client)
}

/// Create a connection pool.
#[cfg(feature = "pool")]
pub fn create_pool(config: &DatabaseConfig) -> DbResult<deadpool_postgres::Pool> {
    use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};

    let pg_config: tokio_postgres::Config = config
        .url
        .parse()
        .map_err(|e: tokio_postgres::Error| DbError::Config(e.to_string()))?;

    let mgr = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(mgr)
        .max_size(config.pool_size)
        .build()
        .map_err(|e| DbError::Pool(e.to_string()))
}

/// Check a client out of `pool` and register it under `name`.
///
/// The client stays checked out until it is removed from the registry.
#[cfg(feature = "pool")]
pub async fn register_pooled(
    pool: &deadpool_postgres::Pool,
    name: &str,
) -> DbResult<Arc<deadpool_postgres::Client>> {
    let client = Arc::new(pool.get().await?);
    registry::register(name, Arc::clone(&client) as Arc<dyn Connection>);
    Ok(client)
}
