//! Pool configuration.

use std::str::FromStr;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::category::CategoryKind;
use super::error::PoolError;

pub const CEILING_ENV_VAR: &str = "POOL_CEILING";
pub const KEY_POLICY_ENV_VAR: &str = "POOL_KEY_POLICY";

/// What the demand index does when one key is declared with two different templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Reject the later declaration.
    #[default]
    Strict,
    /// Keep the first template and add the later count to it.
    /// Compatibility mode for content that relied on name-merging.
    MergeFirstWins,
}

impl FromStr for KeyPolicy {
    type Err = PoolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "merge-first" | "merge_first" => Ok(Self::MergeFirstWins),
            _ => Err(PoolError::UnknownKeyPolicy(raw.to_string())),
        }
    }
}

/// Administrator-configured caps on pre-built instances.
///
/// The ceiling only bounds what `build` creates up front; runtime growth through the
/// clone registry is not capped.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub default_ceiling: usize,
    pub ceilings: HashMap<CategoryKind, usize>,
    pub key_policy: KeyPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let mut ceilings = HashMap::default();
        ceilings.insert(CategoryKind::PlayerMunitions, 256);
        ceilings.insert(CategoryKind::AdversaryMunitions, 256);
        Self {
            default_ceiling: 64,
            ceilings,
            key_policy: KeyPolicy::Strict,
        }
    }
}

impl PoolConfig {
    pub fn ceiling_for(&self, kind: CategoryKind) -> usize {
        self.ceilings.get(&kind).copied().unwrap_or(self.default_ceiling)
    }

    pub fn with_ceiling(mut self, kind: CategoryKind, ceiling: usize) -> Self {
        self.ceilings.insert(kind, ceiling);
        self
    }

    /// Defaults overridden by `POOL_CEILING` / `POOL_KEY_POLICY`.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(CEILING_ENV_VAR).ok().as_deref(),
            std::env::var(KEY_POLICY_ENV_VAR).ok().as_deref(),
        )
    }

    /// Invalid values are reported and ignored.
    pub fn from_vars(ceiling: Option<&str>, policy: Option<&str>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = ceiling {
            match raw.trim().parse::<usize>() {
                Ok(value) => {
                    config.default_ceiling = value;
                    config.ceilings.clear();
                }
                Err(err) => warn!("ignoring {CEILING_ENV_VAR}={raw:?}: {err}"),
            }
        }

        if let Some(raw) = policy {
            match raw.parse::<KeyPolicy>() {
                Ok(value) => config.key_policy = value,
                Err(err) => warn!("ignoring {KEY_POLICY_ENV_VAR}: {err}"),
            }
        }

        config
    }
}
