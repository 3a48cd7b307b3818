//! Validated pool keys.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use super::error::PoolError;

/// Stable name of one pooled template.
///
/// Keys are cheap to clone (shared string) and are validated once at construction:
/// non-empty, no surrounding whitespace, no control characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey(Arc<str>);

impl PoolKey {
    pub fn new(name: &str) -> Result<Self, PoolError> {
        if name.is_empty() {
            return Err(PoolError::EmptyKey);
        }
        if name.trim() != name || name.chars().any(char::is_control) {
            return Err(PoolError::MalformedKey(name.to_string()));
        }
        Ok(Self(Arc::from(name)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PoolKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
