//! Placeholder generation.
//!
//! Pre-placed adversaries are authored where they should appear on the scrolling
//! ground. At bootstrap each one is swapped for a light [`SpawnMarker`] on the scroll
//! frame; the marker asks the adversary pool for a real instance once it reaches the
//! trigger line.
//!
//! Placed pickups and backdrop pieces need no marker; at finalize they are handed
//! their pooled instance directly.

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::bootstrap::BootResult;
use crate::plugins::field::{ScrollFrame, SpawnMarker, TriggerRadius};
use crate::plugins::pooling::sources::{authored_position, placed_under};
use crate::plugins::pooling::{CategoryKind, PoolError, SpawnRequest, spawn_by_kind};

pub fn generate_placeholders(world: &mut World) -> BootResult {
    let Some((frame, frame_at)) = world
        .query_filtered::<(Entity, &Transform), With<ScrollFrame>>()
        .iter(world)
        .next()
        .map(|(entity, transform)| (entity, transform.translation))
    else {
        return Err(PoolError::DependencyNotReady {
            category: CategoryKind::Adversaries,
            dependency: "scroll frame",
        });
    };

    let radius = world
        .get_resource::<Tunables>()
        .map_or(Tunables::default().marker_radius, |t| t.marker_radius);

    let mut replaced = 0;
    for (entity, template) in placed_under(world, CategoryKind::Adversaries) {
        if !template.role.is_adversary() {
            warn!(
                "placeholders: {entity:?} '{}' is not an adversary; left in place",
                template.name
            );
            continue;
        }
        let key = match template.key() {
            Ok(key) => key,
            Err(err) => {
                warn!("placeholders: {entity:?}: {err}; left in place");
                continue;
            }
        };

        let local = authored_position(world, entity) - frame_at;
        world.spawn((
            Name::new(format!("SpawnMarker({key})")),
            SpawnMarker { key },
            TriggerRadius(radius),
            Transform::from_translation(local.truncate().extend(0.0)),
            ChildOf(frame),
        ));
        world.despawn(entity);
        replaced += 1;
    }

    debug!("placeholders: {replaced} adversaries replaced by markers");
    Ok(())
}

/// Swap placed pickups and backdrop pieces for pooled instances at the same spot.
pub fn materialize_placed(world: &mut World) -> BootResult {
    for kind in [CategoryKind::Pickups, CategoryKind::Backdrop] {
        for (entity, template) in placed_under(world, kind) {
            let Ok(key) = template.key() else {
                continue;
            };
            let at = authored_position(world, entity).truncate();
            if spawn_by_kind(world, kind, &SpawnRequest::new(key).at(at)).is_some() {
                world.despawn(entity);
            }
        }
    }
    Ok(())
}
