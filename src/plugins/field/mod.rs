//! Play field: the visible rectangle, the scrolling reference frame and the spawn
//! markers riding it.
//!
//! ```text
//!   FixedUpdate (InGame)
//!     scroll_field           ScrollFrame and ScrollsWithField riders move down
//!     trigger_spawn_markers  marker crosses trigger line → spawn_pooled(Adversaries)
//!     recycle_out_of_field   active instance left the field → despawn_pooled
//! ```

use bevy::prelude::*;

use crate::common::{state::GameState, tunables::Tunables};
use crate::plugins::bootstrap::{BootResult, BootstrapAppExt, stage};
use crate::plugins::pooling::components::{PoolMember, PoolState, ScrollsWithField};
use crate::plugins::pooling::sources::Spawner;
use crate::plugins::pooling::{CategoryKind, PoolCommandsExt, PoolError, PoolKey, SpawnRequest};

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlayField {
    pub half_extents: Vec2,
    /// World y at which spawn markers fire.
    pub trigger_line: f32,
    pub recycle_margin: f32,
}

impl PlayField {
    pub fn from_tunables(tunables: &Tunables) -> Self {
        Self {
            half_extents: tunables.field_half_extents,
            trigger_line: tunables.field_half_extents.y - tunables.trigger_inset,
            recycle_margin: tunables.recycle_margin,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.half_extents.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        -self.half_extents.y
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.half_extents.y * 2.0
    }

    pub fn is_outside(&self, at: Vec2) -> bool {
        let limit = self.half_extents + Vec2::splat(self.recycle_margin);
        at.x.abs() > limit.x || at.y.abs() > limit.y
    }
}

/// Reference frame that scrolls with the ground. Spawn markers are its children.
#[derive(Component, Debug, Clone, Copy)]
pub struct ScrollFrame;

/// Stand-in for a pre-placed adversary; requests a pooled spawn at the trigger line.
#[derive(Component, Debug, Clone)]
pub struct SpawnMarker {
    pub key: PoolKey,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TriggerRadius(pub f32);

/// Velocity given to airborne adversaries entering the field.
pub fn entry_velocity(tunables: &Tunables) -> Vec2 {
    Vec2::NEG_Y * tunables.scroll_speed * 1.5
}

pub fn plugin(app: &mut App) {
    app.add_boot_stage(stage::FIELD, setup_field)
        .add_boot_stage(stage::FINALIZE, align_spawners);

    app.add_systems(
        FixedUpdate,
        (scroll_field, trigger_spawn_markers, recycle_out_of_field)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}

pub fn setup_field(world: &mut World) -> BootResult {
    let tunables = world.get_resource::<Tunables>().cloned().unwrap_or_default();
    world.insert_resource(PlayField::from_tunables(&tunables));

    let has_frame = world
        .query_filtered::<(), With<ScrollFrame>>()
        .iter(world)
        .next()
        .is_some();
    if !has_frame {
        world.spawn((
            Name::new("ScrollFrame"),
            ScrollFrame,
            Transform::default(),
            Visibility::default(),
        ));
    }
    Ok(())
}

/// Spawners sit just above the top edge so their waves enter from off-screen.
pub fn align_spawners(world: &mut World) -> BootResult {
    let Some(field) = world.get_resource::<PlayField>().copied() else {
        return Err(PoolError::DependencyNotReady {
            category: CategoryKind::Adversaries,
            dependency: "play field",
        });
    };

    let mut q = world.query_filtered::<&mut Transform, With<Spawner>>();
    for mut transform in q.iter_mut(world) {
        transform.translation.y = field.top() + field.recycle_margin * 0.5;
    }
    Ok(())
}

pub fn scroll_field(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut q_frame: Query<&mut Transform, With<ScrollFrame>>,
    // Disjoint from the frame: riders are pooled instances, never the frame itself.
    mut q_riders: Query<(&mut Transform, &PoolState), (With<ScrollsWithField>, Without<ScrollFrame>)>,
) {
    let dy = tunables.scroll_speed * time.delta_secs();

    for mut frame in &mut q_frame {
        frame.translation.y -= dy;
    }
    for (mut transform, state) in &mut q_riders {
        if *state == PoolState::Active {
            transform.translation.y -= dy;
        }
    }
}

pub fn trigger_spawn_markers(
    mut commands: Commands,
    field: Res<PlayField>,
    tunables: Res<Tunables>,
    q_frame: Query<&Transform, With<ScrollFrame>>,
    q_markers: Query<(Entity, &SpawnMarker, &TriggerRadius, &Transform), Without<ScrollFrame>>,
) {
    let Ok(frame) = q_frame.single() else {
        return;
    };

    for (entity, marker, radius, local) in &q_markers {
        let at = frame.translation.truncate() + local.translation.truncate();
        if at.y - radius.0 > field.trigger_line {
            continue;
        }

        commands.spawn_pooled(
            CategoryKind::Adversaries,
            SpawnRequest::new(marker.key.clone())
                .at(at)
                .with_velocity(entry_velocity(&tunables)),
        );
        commands.entity(entity).despawn();
    }
}

pub fn recycle_out_of_field(
    mut commands: Commands,
    field: Res<PlayField>,
    q: Query<(Entity, &Transform, &PoolState), With<PoolMember>>,
) {
    for (entity, transform, state) in &q {
        if *state == PoolState::Active && field.is_outside(transform.translation.truncate()) {
            commands.despawn_pooled(entity);
        }
    }
}
