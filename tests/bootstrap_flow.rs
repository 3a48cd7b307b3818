//! The demo level through the real plugin stack: authored content in, sized pools out.

mod common;

use bevy::prelude::*;

use shmup_pools::plugins::bootstrap::BootReport;
use shmup_pools::plugins::field::SpawnMarker;
use shmup_pools::plugins::pooling::components::PoolState;
use shmup_pools::plugins::pooling::sources::{Placed, Spawner};
use shmup_pools::plugins::pooling::{
    Adversaries, AdversaryMunitions, Backdrop, Effects, Pickups, PlayerMunitions, Pool,
    PoolCategory,
};

fn booted() -> App {
    let mut app = common::app_headless();
    common::boot(&mut app);
    app
}

fn demand<C: PoolCategory>(app: &App, key: &str) -> Option<u32> {
    app.world().resource::<Pool<C>>().demand_of(key)
}

fn assert_audit<C: PoolCategory>(app: &App) {
    let world = app.world();
    let pool = world.resource::<Pool<C>>();
    assert!(pool.is_built(), "{} not built", C::KIND);
    if let Err(violations) = pool.audit(world) {
        panic!("{} audit failed: {violations:?}", C::KIND);
    }
}

#[test]
fn every_stage_ran_in_order() {
    let app = booted();
    let report = app.world().resource::<BootReport>();

    let stages: Vec<u32> = report.ran.iter().map(|(stage, _)| *stage).collect();
    let mut sorted = stages.clone();
    sorted.sort();
    assert_eq!(stages, sorted);
    assert!(report.failed.is_empty(), "{:?}", report.failed);
}

#[test]
fn demo_demand_is_indexed_per_category() {
    let app = booted();

    assert_eq!(demand::<Adversaries>(&app, "Grunt"), Some(9));
    assert_eq!(demand::<Adversaries>(&app, "Tank"), Some(2));
    assert_eq!(demand::<Adversaries>(&app, "Fortress"), Some(1));
    assert_eq!(demand::<Adversaries>(&app, "Turret"), Some(2));

    assert_eq!(demand::<AdversaryMunitions>(&app, "Bolt"), Some(28));
    assert_eq!(demand::<PlayerMunitions>(&app, "Pellet"), Some(16));
    assert_eq!(demand::<PlayerMunitions>(&app, "Lance"), Some(8));

    assert_eq!(demand::<Pickups>(&app, "Gem"), Some(11));

    assert_eq!(demand::<Backdrop>(&app, "Sand"), Some(14));
    assert_eq!(demand::<Backdrop>(&app, "Rock"), Some(7));
    assert_eq!(demand::<Backdrop>(&app, "Crater"), Some(1));

    assert_eq!(demand::<Effects>(&app, "Flash"), Some(28));
    assert_eq!(demand::<Effects>(&app, "Boom"), Some(12));
    assert_eq!(demand::<Effects>(&app, "Spark"), Some(24));
}

#[test]
fn composite_parts_are_indexed_but_not_pooled() {
    let app = booted();
    let pool = app.world().resource::<Pool<Adversaries>>();

    assert!(!pool.contains_key("Turret"));
    assert!(pool.contains_key("Fortress"));
    assert!(pool.indexed().iter().any(|t| t.key.as_str() == "Turret" && !t.pooled));
}

#[test]
fn placed_content_is_consumed() {
    let mut app = booted();
    let world = app.world_mut();

    let leftovers = world.query::<&Placed>().iter(world).count();
    assert_eq!(leftovers, 0);

    let markers = world.query::<&SpawnMarker>().iter(world).count();
    assert_eq!(markers, 3);

    let spawners = world.query::<&Spawner>().iter(world).count();
    assert_eq!(spawners, 2);
}

#[test]
fn first_waves_launch_on_entering_the_game() {
    let mut app = booted();
    app.update();

    let pool = app.world().resource::<Pool<Adversaries>>();
    // north-west wave 0 (3) + north-east wave 0 (2)
    assert_eq!(pool.active_count(), 5);
}

#[test]
fn every_pool_passes_its_audit() {
    let mut app = booted();
    app.update();

    assert_audit::<Adversaries>(&app);
    assert_audit::<PlayerMunitions>(&app);
    assert_audit::<AdversaryMunitions>(&app);
    assert_audit::<Pickups>(&app);
    assert_audit::<Backdrop>(&app);
    assert_audit::<Effects>(&app);

    let world = app.world_mut();
    let reserves = world
        .query::<&PoolState>()
        .iter(world)
        .filter(|s| **s == PoolState::Reserve)
        .count();
    // one clone per pooled key: 3 + 2 + 1 + 1 + 3 + 3
    assert_eq!(reserves, 13);
}
