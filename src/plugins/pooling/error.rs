//! Pool error taxonomy.
//!
//! Nothing here is fatal: callers log the error and degrade (skip the entry,
//! build an empty pool, return `None`).

use thiserror::Error;

use super::category::CategoryKind;
use super::key::PoolKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("pool key is empty")]
    EmptyKey,

    #[error("pool key {0:?} has surrounding whitespace or control characters")]
    MalformedKey(String),

    #[error("{category}: key '{key}' already names a different template")]
    KeyCollision { category: CategoryKind, key: PoolKey },

    #[error("{category}: dependency not ready: {dependency}")]
    DependencyNotReady {
        category: CategoryKind,
        dependency: &'static str,
    },

    #[error("{category}: unknown key '{key}'")]
    UnknownKey { category: CategoryKind, key: String },

    #[error("unknown key policy {0:?} (expected \"strict\" or \"merge-first\")")]
    UnknownKeyPolicy(String),
}
