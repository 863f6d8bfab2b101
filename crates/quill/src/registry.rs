//! Process-wide connection registry.
//!
//! Builders created without an explicit connection borrow the default entry
//! from here. Named entries allow several databases side by side.
//!
//! ```ignore
//! let client = quill::config::connect(&DatabaseConfig::from_env()?).await?;
//! // `connect` registers the client; later builders find it automatically.
//! let users = quill::select("users")?.where_equal("status", "active");
//! ```

use crate::connection::Connection;
use crate::error::{DbError, DbResult};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Registry key used for the default connection.
pub const DEFAULT_CONNECTION: &str = "default";

type Registry = RwLock<HashMap<String, Arc<dyn Connection>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

// A panic while holding the lock cannot leave the map half-written, so a
// poisoned lock is still safe to use.
fn read() -> RwLockReadGuard<'static, HashMap<String, Arc<dyn Connection>>> {
    registry().read().unwrap_or_else(|e| e.into_inner())
}

fn write() -> RwLockWriteGuard<'static, HashMap<String, Arc<dyn Connection>>> {
    registry().write().unwrap_or_else(|e| e.into_inner())
}

/// Register a connection under `name`, replacing any previous entry.
pub fn register(name: impl Into<String>, conn: Arc<dyn Connection>) {
    let name = name.into();
    tracing::debug!(target: "quill.registry", connection = %name, "registering connection");
    write().insert(name, conn);
}

/// Register the default connection.
pub fn register_default(conn: Arc<dyn Connection>) {
    register(DEFAULT_CONNECTION, conn);
}

/// Get the default connection.
pub fn get() -> DbResult<Arc<dyn Connection>> {
    read()
        .get(DEFAULT_CONNECTION)
        .cloned()
        .ok_or_else(|| DbError::connection("Unable to find a database connection."))
}

/// Get a named connection.
pub fn get_named(name: &str) -> DbResult<Arc<dyn Connection>> {
    read()
        .get(name)
        .cloned()
        .ok_or_else(|| DbError::connection(format!("No database connection named '{}'", name)))
}

/// Remove a connection, returning it if it was registered.
pub fn remove(name: &str) -> Option<Arc<dyn Connection>> {
    tracing::debug!(target: "quill.registry", connection = %name, "removing connection");
    write().remove(name)
}

/// Registered connection names, sorted.
pub fn names() -> Vec<String> {
    let mut names: Vec<String> = read().keys().cloned().collect();
    names.sort();
    names
}

/// Remove every registered connection.
pub fn clear() {
    write().clear();
}
