use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::player::Player;
use crate::plugins::pooling::components::{Armament, PoolState};
use crate::plugins::pooling::{CategoryKind, PoolCommandsExt, SpawnRequest};

/// Autofire: every armed, live shooter fires its mounts' current stage on cooldown.
///
/// The player draws from the player-munition pool; pooled shooters (adversaries)
/// draw from the adversary-munition pool and only fire while active.
pub fn fire_armaments(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut q: Query<(&Transform, &mut Armament, Has<Player>, Option<&PoolState>)>,
) {
    for (transform, mut armament, is_player, state) in &mut q {
        if !is_player && state != Some(&PoolState::Active) {
            continue;
        }

        let (kind, velocity) = if is_player {
            (
                CategoryKind::PlayerMunitions,
                Vec2::Y * tunables.player_munition_speed,
            )
        } else {
            (
                CategoryKind::AdversaryMunitions,
                Vec2::NEG_Y * tunables.adversary_munition_speed,
            )
        };
        let origin = transform.translation.truncate();

        for mount in &mut armament.mounts {
            mount.cooldown.tick(time.delta());
            if !mount.cooldown.just_finished() {
                continue;
            }
            let Some(stage) = mount.current_stage() else {
                continue;
            };
            let at = origin + mount.offset;

            match stage.munition.key() {
                Ok(key) => commands.spawn_pooled(
                    kind,
                    SpawnRequest::new(key).at(at).with_velocity(velocity),
                ),
                Err(err) => warn!("weapon '{}': {err}", mount.weapon.name),
            }
            if let Some(Ok(key)) = stage.muzzle_effect.as_ref().map(|effect| effect.key()) {
                commands.spawn_pooled(CategoryKind::Effects, SpawnRequest::new(key).at(at));
            }
        }
    }
}
