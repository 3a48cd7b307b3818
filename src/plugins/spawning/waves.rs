use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::field::entry_velocity;
use crate::plugins::pooling::sources::Spawner;
use crate::plugins::pooling::{CategoryDrained, CategoryKind, PoolCommandsExt, SpawnRequest};

/// Horizontal gap between members of one wave entry.
const FORMATION_GAP: f32 = 36.0;

/// Queue every spawn of the spawner's current wave. Returns how many were requested.
pub fn launch_wave(commands: &mut Commands, spawner: &Spawner, origin: Vec2, velocity: Vec2) -> u32 {
    let Some(wave) = spawner.table.wave_at(spawner.cursor) else {
        return 0;
    };

    let mut requested = 0;
    for entry in &wave.entries {
        let key = match entry.template.key() {
            Ok(key) => key,
            Err(err) => {
                warn!("spawner '{}': {err}", spawner.name);
                continue;
            }
        };

        let half = (entry.max_concurrent.saturating_sub(1)) as f32 * 0.5;
        for i in 0..entry.max_concurrent {
            let offset = Vec2::new((i as f32 - half) * FORMATION_GAP, 0.0);
            commands.spawn_pooled(
                CategoryKind::Adversaries,
                SpawnRequest::new(key.clone())
                    .at(origin + offset)
                    .with_velocity(velocity),
            );
            requested += 1;
        }
    }
    requested
}

pub fn launch_first_waves(
    mut commands: Commands,
    tunables: Res<Tunables>,
    q: Query<(&Spawner, &Transform)>,
) {
    for (spawner, transform) in &q {
        let n = launch_wave(
            &mut commands,
            spawner,
            transform.translation.truncate(),
            entry_velocity(&tunables),
        );
        debug!("spawner '{}': wave 0 launched ({n})", spawner.name);
    }
}

/// Every spawner moves to its next wave when the adversary category drains.
pub fn advance_waves(
    mut drained: MessageReader<CategoryDrained>,
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut q: Query<(&mut Spawner, &Transform)>,
) {
    let adversaries_drained = drained
        .read()
        .any(|msg| msg.category == CategoryKind::Adversaries);
    if !adversaries_drained {
        return;
    }

    for (mut spawner, transform) in &mut q {
        if spawner.table.wave_at(spawner.cursor).is_none() {
            continue;
        }
        spawner.cursor += 1;

        let n = launch_wave(
            &mut commands,
            &spawner,
            transform.translation.truncate(),
            entry_velocity(&tunables),
        );
        if n == 0 {
            debug!("spawner '{}': no waves left", spawner.name);
        }
    }
}
