//! Specialized pools: one per category, each with its own discovery rule.
//!
//! | category            | stage | demand comes from                                  |
//! |---------------------|-------|----------------------------------------------------|
//! | adversaries         | 1     | placed adversaries, spawner wave tables            |
//! | player munitions    | 2     | player arsenal                                     |
//! | adversary munitions | 2     | adversary pool: weapon stage × demand              |
//! | pickups             | 2     | placed pickups, adversary drops × demand           |
//! | backdrop            | 2     | placed decorations, backdrop track                 |
//! | effects             | 3     | muzzle, death and impact effects                   |
//!
//! Placeholders run at stage 1 right after the adversary build; placed pickups and
//! backdrop pieces are materialized at stage 4.

pub mod adversaries;
pub mod backdrop;
pub mod effects;
pub mod munitions;
pub mod pickups;
pub mod placeholders;

use bevy::prelude::*;

use crate::plugins::bootstrap::{BootstrapAppExt, stage};
use crate::plugins::pooling::{
    Adversaries, AdversaryMunitions, Backdrop, Effects, Pickups, PlayerMunitions, Pool,
    PoolAppExt, PoolCategory, PoolError,
};

pub fn plugin(app: &mut App) {
    app.add_pool::<Adversaries>()
        .add_boot_stage(stage::STRUCTURAL, placeholders::generate_placeholders)
        .add_pool::<PlayerMunitions>()
        .add_pool::<AdversaryMunitions>()
        .add_pool::<Pickups>()
        .add_pool::<Backdrop>()
        .add_pool::<Effects>()
        .add_boot_stage(stage::FINALIZE, placeholders::materialize_placed);
}

/// The already-built pool of `D`, or the error the dependent category `C` reports.
pub(crate) fn built<'w, D: PoolCategory, C: PoolCategory>(
    world: &'w World,
    dependency: &'static str,
) -> Result<&'w Pool<D>, PoolError> {
    world
        .get_resource::<Pool<D>>()
        .filter(|pool| pool.is_built())
        .ok_or(PoolError::DependencyNotReady {
            category: C::KIND,
            dependency,
        })
}

#[cfg(test)]
mod tests;
