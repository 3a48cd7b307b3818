//! Combat tests inject `CollisionStart` messages directly and run the resolver once,
//! so no physics step is involved.

use std::sync::Arc;

use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use super::{collect_pickups, resolve_munition_hits};
use crate::common::test_utils::{message_count, pool_world, run_system_once};
use crate::common::tunables::Tunables;
use crate::plugins::player::{Arsenal, spawn_player};
use crate::plugins::pooling::components::{Armament, Invincible, PoolState, Vitals};
use crate::plugins::pooling::{
    Adversaries, AdversaryMunitions, Blueprint, CategoryDrained, Effects, Pickups, PlayerMunitions,
    Pool, PoolCategory, SpawnRequest, Weapon, WeaponStage, spawn_pooled,
};

// --------------------------------------------------------------------------------------
// Helpers
// --------------------------------------------------------------------------------------

fn world() -> World {
    let mut world = pool_world();
    world.insert_resource(Tunables::default());
    world.init_resource::<Messages<CollisionStart>>();
    world
}

fn build<C: PoolCategory>(world: &mut World, template: &Arc<Blueprint>, count: u32) {
    if !world.contains_resource::<Pool<C>>() {
        world.init_resource::<Pool<C>>();
    }
    world.resource_scope(|world, mut pool: Mut<Pool<C>>| {
        pool.build(world, template.key().unwrap(), template, count, 64);
    });
}

fn spawn<C: PoolCategory>(world: &mut World, template: &Blueprint, at: Vec2) -> Entity {
    spawn_pooled::<C>(world, &SpawnRequest::new(template.key().unwrap()).at(at)).unwrap()
}

fn write_collision_start(world: &mut World, collider1: Entity, collider2: Entity) {
    world.write_message(CollisionStart {
        collider1,
        collider2,
        body1: Some(collider1),
        body2: Some(collider2),
    });
}

struct Arena {
    world: World,
    bolt: Arc<Blueprint>,
    grunt: Arc<Blueprint>,
}

/// Player munitions with an impact spark, a 2 hp adversary that bursts and drops a gem.
fn arena() -> Arena {
    let mut world = world();
    let spark = Blueprint::effect("Spark").shared();
    let boom = Blueprint::effect("Boom").shared();
    let gem = Blueprint::pickup("Gem").shared();
    let bolt = Blueprint::munition("Bolt", 1).with_impact_effect(&spark).shared();
    let grunt = Blueprint::adversary("Grunt", 2)
        .with_effect(&boom)
        .with_drop(&gem, 1)
        .shared();

    build::<PlayerMunitions>(&mut world, &bolt, 4);
    build::<Adversaries>(&mut world, &grunt, 2);
    build::<Effects>(&mut world, &spark, 4);
    build::<Effects>(&mut world, &boom, 2);
    build::<Pickups>(&mut world, &gem, 2);

    Arena { world, bolt, grunt }
}

// --------------------------------------------------------------------------------------
// Munition hits
// --------------------------------------------------------------------------------------

#[test]
fn hit_damages_target_and_returns_munition() {
    let Arena {
        mut world,
        bolt,
        grunt,
    } = arena();
    let shot = spawn::<PlayerMunitions>(&mut world, &bolt, Vec2::ZERO);
    let target = spawn::<Adversaries>(&mut world, &grunt, Vec2::ZERO);

    write_collision_start(&mut world, shot, target);
    run_system_once(&mut world, resolve_munition_hits);

    assert_eq!(world.get::<Vitals>(target).unwrap().hp, 1);
    assert_eq!(world.get::<PoolState>(shot), Some(&PoolState::Queued));
    assert_eq!(world.get::<PoolState>(target), Some(&PoolState::Active));
    // impact spark only
    assert_eq!(world.resource::<Pool<Effects>>().active_count(), 1);
}

#[test]
fn killing_hit_returns_target_with_effects_and_first_drop() {
    let Arena {
        mut world,
        bolt,
        grunt,
    } = arena();
    let target = spawn::<Adversaries>(&mut world, &grunt, Vec2::new(10.0, 20.0));
    let a = spawn::<PlayerMunitions>(&mut world, &bolt, Vec2::ZERO);
    let b = spawn::<PlayerMunitions>(&mut world, &bolt, Vec2::ZERO);

    write_collision_start(&mut world, a, target);
    write_collision_start(&mut world, target, b);
    run_system_once(&mut world, resolve_munition_hits);

    assert_eq!(world.get::<PoolState>(target), Some(&PoolState::Queued));
    assert_eq!(world.resource::<Pool<Adversaries>>().active_count(), 0);
    assert_eq!(message_count::<CategoryDrained>(&world), 2);

    // two sparks + one boom
    assert_eq!(world.resource::<Pool<Effects>>().active_count(), 3);
    assert_eq!(world.resource::<Pool<Pickups>>().active_count(), 1);
}

#[test]
fn duplicate_messages_resolve_once() {
    let Arena {
        mut world,
        bolt,
        grunt,
    } = arena();
    let shot = spawn::<PlayerMunitions>(&mut world, &bolt, Vec2::ZERO);
    let target = spawn::<Adversaries>(&mut world, &grunt, Vec2::ZERO);

    write_collision_start(&mut world, shot, target);
    write_collision_start(&mut world, shot, target);
    run_system_once(&mut world, resolve_munition_hits);

    assert_eq!(world.get::<Vitals>(target).unwrap().hp, 1);
    assert_eq!(world.resource::<Pool<PlayerMunitions>>().queued_len("Bolt"), 4);
}

#[test]
fn invincible_targets_take_no_damage_but_absorb_the_munition() {
    let Arena {
        mut world,
        bolt,
        grunt,
    } = arena();
    let shot = spawn::<PlayerMunitions>(&mut world, &bolt, Vec2::ZERO);
    let target = spawn::<Adversaries>(&mut world, &grunt, Vec2::ZERO);
    world.entity_mut(target).insert(Invincible(true));

    write_collision_start(&mut world, shot, target);
    run_system_once(&mut world, resolve_munition_hits);

    assert_eq!(world.get::<Vitals>(target).unwrap().hp, 2);
    assert_eq!(world.get::<PoolState>(shot), Some(&PoolState::Queued));
}

#[test]
fn inactive_munitions_and_non_munition_pairs_are_ignored() {
    let Arena {
        mut world,
        bolt: _,
        grunt,
    } = arena();
    let a = spawn::<Adversaries>(&mut world, &grunt, Vec2::ZERO);
    let b = spawn::<Adversaries>(&mut world, &grunt, Vec2::ZERO);
    let reserve = world.resource::<Pool<PlayerMunitions>>().clone_of("Bolt").unwrap();

    write_collision_start(&mut world, a, b);
    write_collision_start(&mut world, reserve, a);
    run_system_once(&mut world, resolve_munition_hits);

    assert_eq!(world.get::<Vitals>(a).unwrap().hp, 2);
    assert_eq!(world.get::<Vitals>(b).unwrap().hp, 2);
}

#[test]
fn adversary_munitions_damage_the_player() {
    let mut world = world();
    let pellet = Blueprint::munition("Pellet", 1).shared();
    build::<AdversaryMunitions>(&mut world, &pellet, 1);
    let player = spawn_player(&mut world, Arsenal::default());
    let shot = spawn::<AdversaryMunitions>(&mut world, &pellet, Vec2::ZERO);

    write_collision_start(&mut world, shot, player);
    run_system_once(&mut world, resolve_munition_hits);

    let vitals = world.get::<Vitals>(player).unwrap();
    assert_eq!(vitals.hp, vitals.max_hp - 1);
    assert_eq!(world.get::<PoolState>(shot), Some(&PoolState::Queued));
}

// --------------------------------------------------------------------------------------
// Pickups
// --------------------------------------------------------------------------------------

#[test]
fn player_collects_pickup_and_upgrades_mounts() {
    let mut world = world();
    let gem = Blueprint::pickup("Gem").shared();
    let pellet = Blueprint::munition("Pellet", 1).shared();
    let lance = Blueprint::munition("Lance", 2).shared();
    build::<Pickups>(&mut world, &gem, 2);

    let player = spawn_player(
        &mut world,
        Arsenal(vec![
            Weapon::new("Main", 0.1)
                .with_stage(WeaponStage::new(&pellet, 4))
                .with_stage(WeaponStage::new(&lance, 2)),
        ]),
    );
    let first = spawn::<Pickups>(&mut world, &gem, Vec2::ZERO);
    let second = spawn::<Pickups>(&mut world, &gem, Vec2::ZERO);

    write_collision_start(&mut world, player, first);
    write_collision_start(&mut world, second, player);
    run_system_once(&mut world, collect_pickups);

    assert_eq!(world.resource::<Pool<Pickups>>().active_count(), 0);
    // clamped at the last stage
    assert_eq!(world.get::<Armament>(player).unwrap().mounts[0].stage, 1);
}
