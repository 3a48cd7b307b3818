//! World- and `Commands`-level entry points into the category pools.

use bevy::prelude::*;

use super::category::{
    Adversaries, AdversaryMunitions, Backdrop, CategoryKind, Effects, Pickups, PlayerMunitions,
    PoolCategory,
};
use super::components::PoolMember;
use super::pool::{NamedPool, Pool, Release, SpawnRequest};

fn scoped<C: PoolCategory, R>(
    world: &mut World,
    f: impl FnOnce(&mut NamedPool, &mut World) -> R,
) -> Option<R> {
    if !world.contains_resource::<Pool<C>>() {
        error!("{}: pool resource missing", C::KIND);
        return None;
    }
    Some(world.resource_scope(|world, mut pool: Mut<Pool<C>>| f(&mut pool, world)))
}

/// Run `f` against the pool of `kind` with the rest of the world still accessible.
pub fn with_pool<R>(
    world: &mut World,
    kind: CategoryKind,
    f: impl FnOnce(&mut NamedPool, &mut World) -> R,
) -> Option<R> {
    match kind {
        CategoryKind::Adversaries => scoped::<Adversaries, R>(world, f),
        CategoryKind::PlayerMunitions => scoped::<PlayerMunitions, R>(world, f),
        CategoryKind::AdversaryMunitions => scoped::<AdversaryMunitions, R>(world, f),
        CategoryKind::Pickups => scoped::<Pickups, R>(world, f),
        CategoryKind::Backdrop => scoped::<Backdrop, R>(world, f),
        CategoryKind::Effects => scoped::<Effects, R>(world, f),
    }
}

pub fn spawn_pooled<C: PoolCategory>(world: &mut World, request: &SpawnRequest) -> Option<Entity> {
    scoped::<C, _>(world, |pool, world| pool.spawn(world, request)).flatten()
}

pub fn spawn_by_kind(world: &mut World, kind: CategoryKind, request: &SpawnRequest) -> Option<Entity> {
    with_pool(world, kind, |pool, world| pool.spawn(world, request)).flatten()
}

/// Return `entity` to whichever pool its [`PoolMember`] names.
pub fn despawn_pooled(world: &mut World, entity: Entity) -> Release {
    let Some(kind) = world.get::<PoolMember>(entity).map(|member| member.category) else {
        warn!("despawn_pooled: {entity:?} is not a pooled instance");
        return Release::Rejected;
    };
    with_pool(world, kind, |pool, world| pool.despawn(world, entity)).unwrap_or(Release::Rejected)
}

pub fn active_count(world: &mut World, kind: CategoryKind) -> u32 {
    with_pool(world, kind, |pool, _| pool.active_count()).unwrap_or(0)
}

/// Deferred pool access for ordinary systems.
pub trait PoolCommandsExt {
    fn spawn_pooled(&mut self, kind: CategoryKind, request: SpawnRequest);
    fn despawn_pooled(&mut self, entity: Entity);
}

impl PoolCommandsExt for Commands<'_, '_> {
    fn spawn_pooled(&mut self, kind: CategoryKind, request: SpawnRequest) {
        self.queue(move |world: &mut World| {
            spawn_by_kind(world, kind, &request);
        });
    }

    fn despawn_pooled(&mut self, entity: Entity) {
        self.queue(move |world: &mut World| {
            despawn_pooled(world, entity);
        });
    }
}
