//! Pool categories.
//!
//! Each category owns exactly one [`Pool`](super::Pool) resource. The marker types
//! are what systems name in `Res<Pool<Adversaries>>`; [`CategoryKind`] is the
//! runtime tag carried by pooled instances and messages.

use std::fmt;

use bevy::prelude::*;
use serde::Deserialize;

use super::demand::DemandIndex;
use super::error::PoolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Adversaries,
    PlayerMunitions,
    AdversaryMunitions,
    Pickups,
    Backdrop,
    Effects,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 6] = [
        CategoryKind::Adversaries,
        CategoryKind::PlayerMunitions,
        CategoryKind::AdversaryMunitions,
        CategoryKind::Pickups,
        CategoryKind::Backdrop,
        CategoryKind::Effects,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CategoryKind::Adversaries => "adversaries",
            CategoryKind::PlayerMunitions => "player-munitions",
            CategoryKind::AdversaryMunitions => "adversary-munitions",
            CategoryKind::Pickups => "pickups",
            CategoryKind::Backdrop => "backdrop",
            CategoryKind::Effects => "effects",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A pool category: its tag, its bootstrap stage and its demand-discovery rule.
///
/// `discover` only returns `Err` when a dependency is missing; per-entry
/// configuration problems are logged and skipped inside the index.
pub trait PoolCategory: Send + Sync + 'static {
    const KIND: CategoryKind;
    const STAGE: u32;

    fn discover(world: &mut World, index: &mut DemandIndex) -> Result<(), PoolError>;
}

pub struct Adversaries;
pub struct PlayerMunitions;
pub struct AdversaryMunitions;
pub struct Pickups;
pub struct Backdrop;
pub struct Effects;
