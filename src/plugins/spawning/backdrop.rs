//! Backdrop streaming: rows of the track enter at the top as the field scrolls.

use bevy::prelude::*;

use crate::plugins::bootstrap::BootResult;
use crate::plugins::field::{PlayField, ScrollFrame};
use crate::plugins::pooling::sources::BackdropTrack;
use crate::plugins::pooling::{
    CategoryKind, PoolCommandsExt, PoolError, PoolKey, SpawnRequest, spawn_by_kind,
};

/// Next row to emit. `next_y` is in scroll-frame space.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct BackdropCursor {
    pub next: usize,
    pub next_y: f32,
}

/// Rows that are due given the frame offset; advances the cursor past them.
pub fn due_rows(
    track: &BackdropTrack,
    field: &PlayField,
    frame_y: f32,
    cursor: &mut BackdropCursor,
) -> Vec<(PoolKey, Vec2)> {
    let mut rows = Vec::new();
    if track.tiles.is_empty() || track.spacing <= 0.0 {
        return rows;
    }

    while cursor.next_y + frame_y <= field.top() + track.spacing {
        let tile = &track.tiles[cursor.next % track.tiles.len()];
        match tile.key() {
            Ok(key) => rows.push((key, Vec2::new(0.0, cursor.next_y + frame_y))),
            Err(err) => warn!("backdrop row {}: {err}", cursor.next),
        }
        cursor.next += 1;
        cursor.next_y += track.spacing;
    }
    rows
}

/// Cover the field with backdrop rows before the first frame.
pub fn prefill_backdrop(world: &mut World) -> BootResult {
    let Some(track) = world.get_resource::<BackdropTrack>().cloned() else {
        return Ok(());
    };
    let Some(field) = world.get_resource::<PlayField>().copied() else {
        return Err(PoolError::DependencyNotReady {
            category: CategoryKind::Backdrop,
            dependency: "play field",
        });
    };
    let frame_y = world
        .query_filtered::<&Transform, With<ScrollFrame>>()
        .iter(world)
        .next()
        .map_or(0.0, |t| t.translation.y);

    let mut cursor = BackdropCursor {
        next: 0,
        next_y: field.bottom() - frame_y,
    };
    for (key, at) in due_rows(&track, &field, frame_y, &mut cursor) {
        spawn_by_kind(world, CategoryKind::Backdrop, &SpawnRequest::new(key).at(at));
    }
    world.insert_resource(cursor);
    Ok(())
}

pub fn stream_backdrop(
    mut commands: Commands,
    track: Option<Res<BackdropTrack>>,
    cursor: Option<ResMut<BackdropCursor>>,
    field: Res<PlayField>,
    q_frame: Query<&Transform, With<ScrollFrame>>,
) {
    let (Some(track), Some(mut cursor)) = (track, cursor) else {
        return;
    };
    let Ok(frame) = q_frame.single() else {
        return;
    };

    for (key, at) in due_rows(&track, &field, frame.translation.y, &mut cursor) {
        commands.spawn_pooled(CategoryKind::Backdrop, SpawnRequest::new(key).at(at));
    }
}
