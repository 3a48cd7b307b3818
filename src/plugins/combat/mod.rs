//! Collision resolution for pooled munitions and pickups.
//!
//! Avian emits `CollisionStart` in `FixedPostUpdate`; everything here reads those
//! messages and hands instances back to their pools through deferred commands.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::player::Player;
use crate::plugins::pooling::components::{
    Armament, Invincible, Munition, PoolMember, PoolState, Template, Vitals,
};
use crate::plugins::pooling::{Blueprint, CategoryKind, PoolCommandsExt, Role, SpawnRequest};

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedPostUpdate,
        (resolve_munition_hits, collect_pickups)
            .chain()
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::InGame)),
    );
}

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget {
            collider: ev.collider1,
            body: ev.body1,
        },
        CollisionTarget {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

fn spawn_template(
    commands: &mut Commands,
    kind: CategoryKind,
    template: &Blueprint,
    at: Vec2,
    velocity: Vec2,
) {
    match template.key() {
        Ok(key) => {
            commands.spawn_pooled(kind, SpawnRequest::new(key).at(at).with_velocity(velocity))
        }
        Err(err) => warn!("{kind}: {err}"),
    }
}

/// Munition hits: damage the target unless it is invincible, always return the
/// munition, and on the killing hit return the target with its effects and first drop.
pub fn resolve_munition_hits(
    mut started: MessageReader<CollisionStart>,
    mut commands: Commands,
    tunables: Res<Tunables>,
    q_munitions: Query<(&Munition, &PoolState, &Template, &Transform)>,
    mut q_targets: Query<
        (
            &mut Vitals,
            Option<&Invincible>,
            Option<&PoolState>,
            Option<&Template>,
            &Transform,
            Has<Player>,
        ),
        Without<Munition>,
    >,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let m1 = q_munitions.contains(t1.collider);
        let m2 = q_munitions.contains(t2.collider);
        if !(m1 ^ m2) {
            continue;
        }
        let (munition_side, other_side) = if m1 { (t1, t2) } else { (t2, t1) };

        // One hit per munition per step, however many pairs touched it.
        if !seen.insert(munition_side.collider) {
            continue;
        }

        let Ok((munition, state, template, transform)) = q_munitions.get(munition_side.collider) else {
            continue;
        };
        if *state != PoolState::Active {
            continue;
        }

        let target = other_side.gameplay_owner();
        let Ok((mut vitals, invincible, target_state, target_template, target_transform, is_player)) =
            q_targets.get_mut(target)
        else {
            continue;
        };
        if target_state.is_some_and(|s| *s != PoolState::Active) {
            continue;
        }

        let at = transform.translation.truncate();
        commands.despawn_pooled(munition_side.collider);
        if let Role::Munition {
            impact_effect: Some(effect),
            ..
        } = &template.0.role
        {
            spawn_template(&mut commands, CategoryKind::Effects, effect, at, Vec2::ZERO);
        }

        if invincible.is_some_and(|i| i.0) {
            continue;
        }

        let before = vitals.hp;
        vitals.hp -= munition.damage;
        if before <= 0 || vitals.hp > 0 {
            continue;
        }

        if is_player {
            info!("player down");
            continue;
        }
        let Some(Template(dead)) = target_template else {
            continue;
        };

        let at = target_transform.translation.truncate();
        debug!("'{}' destroyed at {at}", dead.name);
        commands.despawn_pooled(target);
        for effect in &dead.effects {
            spawn_template(&mut commands, CategoryKind::Effects, effect, at, Vec2::ZERO);
        }
        if let Some(drop) = dead.drops.first() {
            spawn_template(
                &mut commands,
                CategoryKind::Pickups,
                &drop.template,
                at,
                Vec2::NEG_Y * tunables.scroll_speed,
            );
        }
    }
}

/// Player touching an active pickup: the pickup goes back to its pool and every
/// mount moves up one stage.
pub fn collect_pickups(
    mut started: MessageReader<CollisionStart>,
    mut commands: Commands,
    mut q_player: Query<&mut Armament, With<Player>>,
    q_pickups: Query<(&PoolMember, &PoolState)>,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();

    for ev in started.read() {
        let (t1, t2) = targets(ev);
        let (player, other) = if q_player.contains(t1.gameplay_owner()) {
            (t1.gameplay_owner(), t2)
        } else if q_player.contains(t2.gameplay_owner()) {
            (t2.gameplay_owner(), t1)
        } else {
            continue;
        };

        let Ok((member, state)) = q_pickups.get(other.collider) else {
            continue;
        };
        if member.category != CategoryKind::Pickups || *state != PoolState::Active {
            continue;
        }
        if !seen.insert(other.collider) {
            continue;
        }

        commands.despawn_pooled(other.collider);
        if let Ok(mut armament) = q_player.get_mut(player) {
            for mount in &mut armament.mounts {
                let last = mount.weapon.stages.len().saturating_sub(1);
                mount.stage = (mount.stage + 1).min(last);
            }
        }
        debug!("pickup '{}' collected", member.key);
    }
}

#[cfg(test)]
mod tests;
