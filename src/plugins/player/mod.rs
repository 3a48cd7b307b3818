//! Player plugin.
//!
//! The player is authored by the level and owns an [`Arsenal`]: the weapons whose
//! stages size the player-munition pool. Input and movement are driven elsewhere;
//! this module only places the ship and keeps its armament in sync with power-ups.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::plugins::bootstrap::{BootResult, BootstrapAppExt, stage};
use crate::plugins::field::PlayField;
use crate::plugins::pooling::Weapon;
use crate::plugins::pooling::components::{Armament, Vitals};

pub const PLAYER_HP: i32 = 5;

#[derive(Component)]
pub struct Player;

/// Weapons the player can fire, each with its power stages.
#[derive(Component, Debug, Clone, Default)]
pub struct Arsenal(pub Vec<Weapon>);

pub fn plugin(app: &mut App) {
    app.add_boot_stage(stage::FINALIZE, place_player);
}

pub fn spawn_player(world: &mut World, arsenal: Arsenal) -> Entity {
    let layers = CollisionLayers::new(
        Layer::Player,
        [Layer::Adversary, Layer::AdversaryMunition, Layer::Pickup],
    );

    world
        .spawn((
            Name::new("Player"),
            Player,
            Armament::from_weapons(&arsenal.0),
            arsenal,
            Vitals::full(PLAYER_HP),
            Sprite {
                color: Color::srgb(0.2, 0.75, 0.9),
                custom_size: Some(Vec2::splat(26.0)),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, 1.0),
            RigidBody::Kinematic,
            Collider::circle(13.0),
            layers,
            LinearVelocity::ZERO,
            CollisionEventsEnabled,
        ))
        .id()
}

/// Park the player near the bottom edge once the field exists.
pub fn place_player(world: &mut World) -> BootResult {
    let Some(field) = world.get_resource::<PlayField>().copied() else {
        warn!("place_player: no play field; player left where authored");
        return Ok(());
    };

    let mut q = world.query_filtered::<&mut Transform, With<Player>>();
    for mut transform in q.iter_mut(world) {
        transform.translation.y = field.bottom() + field.half_extents.y * 0.2;
    }
    Ok(())
}
