use bevy::prelude::*;

use super::*;
use crate::plugins::pooling::{CategoryKind, PoolError};

#[derive(Resource, Default)]
struct Order(Vec<&'static str>);

fn a(mut order: ResMut<Order>) -> BootResult {
    order.0.push("A");
    Ok(())
}

fn b(mut order: ResMut<Order>) -> BootResult {
    order.0.push("B");
    Ok(())
}

fn c(mut order: ResMut<Order>) -> BootResult {
    order.0.push("C");
    Ok(())
}

fn d(mut order: ResMut<Order>) -> BootResult {
    order.0.push("D");
    Ok(())
}

fn failing(mut order: ResMut<Order>) -> BootResult {
    order.0.push("failing");
    Err(PoolError::DependencyNotReady {
        category: CategoryKind::Effects,
        dependency: "test",
    })
}

fn world_with_order() -> World {
    let mut world = World::new();
    world.init_resource::<Order>();
    world.init_resource::<Bootstrap>();
    world
}

#[test]
fn stages_run_ascending_and_in_registration_order_within_a_stage() {
    let mut world = world_with_order();
    register_boot_stage(&mut world, 2, a);
    register_boot_stage(&mut world, 1, b);
    register_boot_stage(&mut world, 1, c);
    register_boot_stage(&mut world, 0, d);

    let report = run_stages(&mut world);

    assert_eq!(world.resource::<Order>().0, vec!["D", "B", "C", "A"]);
    assert_eq!(
        report.ran.iter().map(|(stage, _)| *stage).collect::<Vec<_>>(),
        vec![0, 1, 1, 2]
    );
    assert!(report.failed.is_empty());
}

#[test]
fn failing_callback_does_not_stop_later_callbacks_or_stages() {
    let mut world = world_with_order();
    register_boot_stage(&mut world, 1, failing);
    register_boot_stage(&mut world, 1, b);
    register_boot_stage(&mut world, 3, a);

    let report = run_stages(&mut world);

    assert_eq!(world.resource::<Order>().0, vec!["failing", "B", "A"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].stage, 1);
    assert!(report.failed[0].reason.contains("dependency not ready"));
}

#[test]
fn stages_run_exactly_once() {
    let mut world = world_with_order();
    register_boot_stage(&mut world, 0, a);

    run_stages(&mut world);
    let second = run_stages(&mut world);

    assert_eq!(world.resource::<Order>().0, vec!["A"]);
    assert!(second.ran.is_empty());
    assert!(world.resource::<Bootstrap>().has_run());
    assert_eq!(world.resource::<Bootstrap>().pending(), 0);
}

#[test]
fn late_registration_is_ignored() {
    let mut world = world_with_order();
    run_stages(&mut world);

    register_boot_stage(&mut world, 0, a);

    assert_eq!(world.resource::<Bootstrap>().pending(), 0);
    run_stages(&mut world);
    assert!(world.resource::<Order>().0.is_empty());
}

#[test]
fn unused_stage_numbers_are_fine() {
    let mut world = world_with_order();
    register_boot_stage(&mut world, 40, a);
    register_boot_stage(&mut world, 7, b);

    run_stages(&mut world);

    assert_eq!(world.resource::<Order>().0, vec!["B", "A"]);
}

#[test]
fn ready_stage_marks_loading_finished() {
    let mut world = World::new();
    world.init_resource::<Bootstrap>();
    register_boot_stage(&mut world, stage::READY, mark_loading_finished);

    assert!(world.get_resource::<LoadingStatus>().is_none_or(|s| !s.finished));
    run_stages(&mut world);

    assert!(world.resource::<LoadingStatus>().finished);
}
