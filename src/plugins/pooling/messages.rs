use bevy::prelude::*;

use super::category::CategoryKind;
use super::key::PoolKey;

/// A category's active count just went from 1 to 0.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDrained {
    pub category: CategoryKind,
}

/// An instance was handed out.
///
/// `cold_start` is true while loading has not finished, so listeners can tell
/// bootstrap prefill apart from live gameplay activation.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct PooledSpawned {
    pub category: CategoryKind,
    pub key: PoolKey,
    pub entity: Entity,
    pub cold_start: bool,
}
