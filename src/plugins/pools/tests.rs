//! Discovery rules per category, run the way the bootstrap runs them.

use std::sync::Arc;

use bevy::prelude::*;

use super::placeholders::generate_placeholders;
use crate::common::test_utils::{pool_world, run_system_once};
use crate::common::tunables::Tunables;
use crate::plugins::bootstrap::BootResult;
use crate::plugins::field::{ScrollFrame, SpawnMarker, setup_field};
use crate::plugins::player::{Arsenal, spawn_player};
use crate::plugins::pooling::sources::{AuthoringRoot, BackdropTrack, Placed, Spawner, Wave, WaveTable};
use crate::plugins::pooling::{
    Adversaries, AdversaryMunitions, Backdrop, Blueprint, CategoryKind, Effects, NamedPool,
    Pickups, PlayerMunitions, Pool, PoolCategory, PoolConfig, PoolError, PoolKey, SpawnEntry,
    SpawnRequest, Weapon, WeaponStage, build_category_pool, spawn_pooled,
};

// --------------------------------------------------------------------------------------
// Helpers
// --------------------------------------------------------------------------------------

fn world() -> World {
    let mut world = pool_world();
    world.insert_resource(Tunables::default());
    world
}

fn author(world: &mut World, kind: CategoryKind, template: &Arc<Blueprint>, at: Vec2) -> Entity {
    let existing = world
        .query::<(Entity, &AuthoringRoot)>()
        .iter(world)
        .find(|(_, root)| root.0 == kind)
        .map(|(entity, _)| entity);
    let root = existing.unwrap_or_else(|| world.spawn((AuthoringRoot(kind), Transform::default())).id());

    world
        .spawn((
            Placed(template.clone()),
            Transform::from_translation(at.extend(0.0)),
            ChildOf(root),
        ))
        .id()
}

fn spawner(world: &mut World, entries: Vec<SpawnEntry>) {
    world.spawn((
        Spawner::new(
            "test",
            WaveTable {
                waves: vec![Wave { entries }],
                ..default()
            },
        ),
        Transform::default(),
    ));
}

fn build<C: PoolCategory>(world: &mut World) -> BootResult {
    run_system_once(world, build_category_pool::<C>)
}

fn pool<C: PoolCategory>(world: &World) -> &NamedPool {
    world.resource::<Pool<C>>()
}

fn audit<C: PoolCategory>(world: &World) {
    if let Err(violations) = pool::<C>(world).audit(world) {
        panic!("{} audit failed: {violations:?}", C::KIND);
    }
}

fn gunner(bolt: &Arc<Blueprint>) -> Arc<Blueprint> {
    Blueprint::adversary("Gunner", 4)
        .with_weapon(Weapon::new("Pistol", 0.5).with_stage(WeaponStage::new(bolt, 3)))
        .shared()
}

// --------------------------------------------------------------------------------------
// Adversaries
// --------------------------------------------------------------------------------------

#[test]
fn grunt_scenario_through_the_category_build() {
    let mut world = world();
    world.insert_resource(PoolConfig::default().with_ceiling(CategoryKind::Adversaries, 3));
    let grunt = Blueprint::adversary("Grunt", 3).shared();
    author(&mut world, CategoryKind::Adversaries, &grunt, Vec2::new(0.0, 700.0));
    spawner(&mut world, vec![SpawnEntry::new(&grunt, 4)]);

    build::<Adversaries>(&mut world).unwrap();
    assert_eq!(pool::<Adversaries>(&world).demand_of("Grunt"), Some(5));
    assert_eq!(pool::<Adversaries>(&world).queued_len("Grunt"), 3);

    let request = SpawnRequest::new(PoolKey::new("Grunt").unwrap());
    let spawned: Vec<Entity> = (0..4)
        .filter_map(|_| spawn_pooled::<Adversaries>(&mut world, &request))
        .collect();

    assert_eq!(spawned.len(), 4);
    let pool = pool::<Adversaries>(&world);
    assert_eq!(pool.active_count(), 4);
    assert_eq!(pool.queued_len("Grunt"), 0);
    assert_eq!(pool.constructed("Grunt"), 4);
    audit::<Adversaries>(&world);
}

#[test]
fn non_adversaries_under_the_adversary_root_are_skipped() {
    let mut world = world();
    let gem = Blueprint::pickup("Gem").shared();
    author(&mut world, CategoryKind::Adversaries, &gem, Vec2::ZERO);

    build::<Adversaries>(&mut world).unwrap();

    assert!(!pool::<Adversaries>(&world).contains_key("Gem"));
    audit::<Adversaries>(&world);
}

#[test]
fn key_collision_keeps_first_declaration_under_strict_policy() {
    let mut world = world();
    author(&mut world, CategoryKind::Adversaries, &Blueprint::adversary("Grunt", 3).shared(), Vec2::ZERO);
    spawner(&mut world, vec![SpawnEntry::new(&Blueprint::adversary("Grunt", 30).shared(), 4)]);

    build::<Adversaries>(&mut world).unwrap();

    let pool = pool::<Adversaries>(&world);
    assert_eq!(pool.demand_of("Grunt"), Some(1));
    assert_eq!(pool.indexed()[0].template.role, crate::plugins::pooling::Role::Adversary { hp: 3, ground: false });
    audit::<Adversaries>(&world);
}

// --------------------------------------------------------------------------------------
// Placeholders
// --------------------------------------------------------------------------------------

#[test]
fn placed_adversaries_become_markers_on_the_scroll_frame() {
    let mut world = world();
    run_system_once(&mut world, setup_field).unwrap();
    let grunt = Blueprint::adversary("Grunt", 3).shared();
    let gem = Blueprint::pickup("Gem").shared();
    let authored = author(&mut world, CategoryKind::Adversaries, &grunt, Vec2::new(50.0, 700.0));
    let stray = author(&mut world, CategoryKind::Adversaries, &gem, Vec2::new(0.0, 10.0));

    build::<Adversaries>(&mut world).unwrap();
    run_system_once(&mut world, generate_placeholders).unwrap();

    let frame = world
        .query_filtered::<Entity, With<ScrollFrame>>()
        .single(&world)
        .unwrap();
    let markers: Vec<(String, Vec3, Entity)> = world
        .query::<(&SpawnMarker, &Transform, &ChildOf)>()
        .iter(&world)
        .map(|(marker, t, child_of)| (marker.key.to_string(), t.translation, child_of.parent()))
        .collect();

    assert_eq!(markers, vec![("Grunt".to_string(), Vec3::new(50.0, 700.0, 0.0), frame)]);
    assert!(world.get_entity(authored).is_err());
    assert!(world.get_entity(stray).is_ok(), "non-adversaries are left alone");
    assert_eq!(pool::<Adversaries>(&world).active_count(), 0);
}

#[test]
fn placeholders_without_a_frame_leave_content_alone() {
    let mut world = world();
    let authored = author(
        &mut world,
        CategoryKind::Adversaries,
        &Blueprint::adversary("Grunt", 3).shared(),
        Vec2::ZERO,
    );

    let result = run_system_once(&mut world, generate_placeholders);

    assert!(matches!(result, Err(PoolError::DependencyNotReady { .. })));
    assert!(world.get_entity(authored).is_ok());
}

// --------------------------------------------------------------------------------------
// Munitions
// --------------------------------------------------------------------------------------

#[test]
fn adversary_munitions_scale_with_adversary_demand() {
    let mut world = world();
    let bolt = Blueprint::munition("Bolt", 1).shared();
    spawner(&mut world, vec![SpawnEntry::new(&gunner(&bolt), 2)]);

    build::<Adversaries>(&mut world).unwrap();
    build::<AdversaryMunitions>(&mut world).unwrap();

    assert_eq!(pool::<AdversaryMunitions>(&world).queued_len("Bolt"), 6);
    audit::<AdversaryMunitions>(&world);
}

#[test]
fn composite_parts_contribute_their_own_weapons() {
    let mut world = world();
    let bolt = Blueprint::munition("Bolt", 1).shared();
    let turret = Blueprint::adversary("Turret", 5)
        .with_weapon(Weapon::new("Cannon", 1.0).with_stage(WeaponStage::new(&bolt, 2)))
        .shared();
    let core = Blueprint::adversary("Core", 40)
        .with_part(&turret, Vec2::new(-24.0, 0.0))
        .with_part(&turret, Vec2::new(24.0, 0.0))
        .shared();
    spawner(&mut world, vec![SpawnEntry::new(&core, 1)]);

    build::<Adversaries>(&mut world).unwrap();
    build::<AdversaryMunitions>(&mut world).unwrap();

    assert_eq!(pool::<Adversaries>(&world).demand_of("Turret"), Some(2));
    assert_eq!(pool::<AdversaryMunitions>(&world).queued_len("Bolt"), 4);
}

#[test]
fn adversary_munitions_before_adversaries_build_empty() {
    let mut world = world();

    let result = build::<AdversaryMunitions>(&mut world);

    assert!(matches!(
        result,
        Err(PoolError::DependencyNotReady {
            category: CategoryKind::AdversaryMunitions,
            ..
        })
    ));
    assert!(pool::<AdversaryMunitions>(&world).is_built());
    assert_eq!(pool::<AdversaryMunitions>(&world).queued_total(), 0);
    audit::<AdversaryMunitions>(&world);
}

#[test]
fn player_munitions_follow_the_arsenal() {
    let mut world = world();
    let pellet = Blueprint::munition("Pellet", 1).shared();
    let laser = Blueprint::munition("Laser", 3).shared();
    spawn_player(
        &mut world,
        Arsenal(vec![
            Weapon::new("Main", 0.1)
                .with_stage(WeaponStage::new(&pellet, 10))
                .with_stage(WeaponStage::new(&laser, 4)),
        ]),
    );

    build::<PlayerMunitions>(&mut world).unwrap();

    let pool = pool::<PlayerMunitions>(&world);
    assert_eq!(pool.queued_len("Pellet"), 10);
    assert_eq!(pool.queued_len("Laser"), 4);
}

#[test]
fn player_munitions_without_player_build_empty() {
    let mut world = world();
    assert!(build::<PlayerMunitions>(&mut world).is_err());
    assert!(pool::<PlayerMunitions>(&world).is_built());
    audit::<PlayerMunitions>(&world);
}

// --------------------------------------------------------------------------------------
// Pickups, backdrop, effects
// --------------------------------------------------------------------------------------

#[test]
fn pickups_count_placed_and_drops() {
    let mut world = world();
    let gem = Blueprint::pickup("Gem").shared();
    let bolt = Blueprint::munition("Bolt", 1).shared();
    let carrier = Blueprint::adversary("Carrier", 2).with_drop(&gem, 1).shared();
    author(&mut world, CategoryKind::Pickups, &gem, Vec2::ZERO);
    spawner(&mut world, vec![SpawnEntry::new(&carrier, 2), SpawnEntry::new(&gunner(&bolt), 1)]);

    build::<Adversaries>(&mut world).unwrap();
    build::<Pickups>(&mut world).unwrap();

    assert_eq!(pool::<Pickups>(&world).queued_len("Gem"), 3);
}

#[test]
fn backdrop_track_covers_the_visible_rows() {
    let mut world = world();
    world.insert_resource(BackdropTrack {
        tiles: vec![
            Blueprint::backdrop("Sand").shared(),
            Blueprint::backdrop("Rock").shared(),
        ],
        spacing: 64.0,
    });

    build::<Backdrop>(&mut world).unwrap();

    // (960 + 96) / 64 → 17 rows, + 2 for the edges, split across two tiles.
    let pool = pool::<Backdrop>(&world);
    assert_eq!(pool.queued_len("Sand"), 10);
    assert_eq!(pool.queued_len("Rock"), 10);
}

#[test]
fn effects_gather_muzzle_death_and_impact_demand() {
    let mut world = world();
    let flash = Blueprint::effect("Flash").shared();
    let boom = Blueprint::effect("Boom").shared();
    let spark = Blueprint::effect("Spark").shared();
    let bolt = Blueprint::munition("Bolt", 1).with_impact_effect(&spark).shared();
    let pellet = Blueprint::munition("Pellet", 1).shared();
    let gunner = Blueprint::adversary("Gunner", 4)
        .with_effect(&boom)
        .with_weapon(
            Weapon::new("Pistol", 0.5).with_stage(WeaponStage::new(&bolt, 3).with_muzzle_effect(&flash)),
        )
        .shared();
    spawner(&mut world, vec![SpawnEntry::new(&gunner, 2)]);
    spawn_player(
        &mut world,
        Arsenal(vec![
            Weapon::new("Main", 0.1).with_stage(WeaponStage::new(&pellet, 10).with_muzzle_effect(&flash)),
        ]),
    );

    build::<Adversaries>(&mut world).unwrap();
    build::<PlayerMunitions>(&mut world).unwrap();
    build::<AdversaryMunitions>(&mut world).unwrap();
    build::<Effects>(&mut world).unwrap();

    let pool = pool::<Effects>(&world);
    // player 10 + gunner 3 × 2
    assert_eq!(pool.queued_len("Flash"), 16);
    assert_eq!(pool.queued_len("Boom"), 2);
    // Bolt demand 3 × 2
    assert_eq!(pool.queued_len("Spark"), 6);
    audit::<Effects>(&world);
}

#[test]
fn effects_need_the_munition_pools() {
    let mut world = world();
    build::<Adversaries>(&mut world).unwrap();

    assert!(matches!(
        build::<Effects>(&mut world),
        Err(PoolError::DependencyNotReady { dependency: "player munition pool", .. })
    ));
    audit::<Effects>(&world);
}
