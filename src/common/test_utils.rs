//! Test helpers.
//!
//! Bevy provides `World::run_system_once` (via the `RunSystemOnce` trait) for quickly
//! executing a system in tests/diagnostics without building a full schedule.
//!
//! Systems that use `Commands` enqueue structural changes; applying them is normally handled by
//! `ApplyDeferred` / schedule boundaries. We call `world.flush()` after running so queued commands
//! are applied before assertions.

use bevy::ecs::message::{Message, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::ecs::world::CommandQueue;
use bevy::prelude::*;

use crate::plugins::pooling::{CategoryDrained, PoolConfig, PooledSpawned};

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// A bare world with pool message storage and the default pool config.
pub fn pool_world() -> World {
    let mut world = World::new();
    world.init_resource::<Messages<CategoryDrained>>();
    world.init_resource::<Messages<PooledSpawned>>();
    world.insert_resource(PoolConfig::default());
    world
}

/// Runs `f` with a `Commands` handle and applies whatever it queued.
pub fn with_commands<T>(world: &mut World, f: impl FnOnce(&mut Commands) -> T) -> T {
    let mut queue = CommandQueue::default();
    let result = {
        let mut commands = Commands::new(&mut queue, world);
        f(&mut commands)
    };
    queue.apply(world);
    result
}

/// Number of messages of type `M` currently buffered.
pub fn message_count<M: Message>(world: &World) -> usize {
    world.resource::<Messages<M>>().len()
}
