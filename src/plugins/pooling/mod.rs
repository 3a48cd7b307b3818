//! Named object pools.
//!
//! Every entity category the game cycles through at runtime (adversaries, munitions,
//! pickups, effects, backdrop tiles) is served from a [`Pool<C>`] resource. Pools are
//! sized before gameplay by walking the authored spawn data, so the hot path never
//! creates entities unless demand was under-declared.
//!
//! # Data flow
//! ```text
//!   OnEnter(Loading)
//!┌──────────────────────────────────────────────────────────────────────────┐
//!│  level: spawn authoring roots, placed content, spawners, player          │
//!│                                                                          │
//!│  bootstrap (stages in ascending order)                                   │
//!│    C::discover(world, &mut DemandIndex)   reads sources / built pools    │
//!│    Pool<C>::build_from(index, ceiling)    Queued instances + clones      │
//!└──────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   InGame
//!┌──────────────────────────────────────────────────────────────────────────┐
//!│  producers: commands.spawn_pooled(kind, SpawnRequest)                    │
//!│  consumers: commands.despawn_pooled(entity)                              │
//!│                                                                          │
//!│  Pool::spawn    pop_front / grow from clone → Active  → PooledSpawned    │
//!│  Pool::despawn  Active → Queued, push_back            → CategoryDrained  │
//!│                                                         (on 1 → 0)       │
//!└──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All pool mutation goes through `&mut World` (exclusive systems, bootstrap
//! callbacks or queued commands), so there is a single writer at any time.

pub mod audit;
pub mod blueprint;
pub mod category;
pub mod commands;
pub mod components;
pub mod config;
pub mod demand;
pub mod error;
pub mod key;
pub mod lifecycle;
pub mod messages;
pub mod pool;
pub mod sources;

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::bootstrap::{BootResult, BootstrapAppExt};

pub use audit::{AuditReport, InvariantViolation};
pub use blueprint::{Blueprint, Body, Role, SpawnEntry, Weapon, WeaponStage};
pub use category::{
    Adversaries, AdversaryMunitions, Backdrop, CategoryKind, Effects, Pickups, PlayerMunitions,
    PoolCategory,
};
pub use commands::{
    PoolCommandsExt, active_count, despawn_pooled, spawn_by_kind, spawn_pooled, with_pool,
};
pub use config::{KeyPolicy, PoolConfig};
pub use demand::{DemandIndex, PoolEntry};
pub use error::PoolError;
pub use key::PoolKey;
pub use messages::{CategoryDrained, PooledSpawned};
pub use pool::{IndexedTemplate, NamedPool, Pool, Release, SpawnRequest};

pub fn plugin(app: &mut App) {
    app.add_message::<CategoryDrained>()
        .add_message::<PooledSpawned>()
        .init_resource::<PoolConfig>();

    app.add_systems(
        FixedUpdate,
        lifecycle::tick_scheduled_tasks.run_if(in_state(GameState::InGame)),
    );
}

pub trait PoolAppExt {
    /// Register the pool resource for `C` and its build at `C::STAGE`.
    fn add_pool<C: PoolCategory>(&mut self) -> &mut Self;
}

impl PoolAppExt for App {
    fn add_pool<C: PoolCategory>(&mut self) -> &mut Self {
        self.init_resource::<Pool<C>>();
        self.add_boot_stage(C::STAGE, build_category_pool::<C>)
    }
}

/// Discover demand for `C` and build its pool.
///
/// A missing dependency still leaves a built (empty) pool behind, so later stages
/// see a consistent world.
pub fn build_category_pool<C: PoolCategory>(world: &mut World) -> BootResult {
    let config = world.get_resource::<PoolConfig>().cloned().unwrap_or_default();

    let mut index = DemandIndex::new(C::KIND, config.key_policy);
    let discovered = C::discover(world, &mut index);
    if let Err(err) = &discovered {
        warn!("{}: {err}; building empty pool", C::KIND);
        index = DemandIndex::new(C::KIND, config.key_policy);
    }

    if !world.contains_resource::<Pool<C>>() {
        world.init_resource::<Pool<C>>();
    }
    let ceiling = config.ceiling_for(C::KIND);
    world.resource_scope(|world, mut pool: Mut<Pool<C>>| {
        pool.build_from(world, index, ceiling);
    });

    discovered
}
