//! Camera plugin (render-only).
//!
//! The camera sits on the field centre and leans toward the player horizontally.
//! Two queries touch `Transform`, so they are kept disjoint with `Without<...>`.
//!
//! ```text
//! Startup:     spawn MainCamera (+ Firefly config)
//! PostUpdate:  lean_toward_player
//! ```

use bevy::prelude::*;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::player::Player;

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
    /// Fraction of the player's x offset the camera follows.
    pub lean: f32,
}

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(Startup, spawn_camera).add_systems(
        PostUpdate,
        lean_toward_player
            .before(TransformSystems::Propagate)
            .run_if(in_state(GameState::InGame)),
    );
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera {
            responsiveness: 5.0,
            lean: 0.25,
        },
        FireflyConfig::default(),
        Transform::from_xyz(0.0, 0.0, 999.0),
    ));
}

fn lean_toward_player(
    time: Res<Time>,
    q_player: Query<&Transform, (With<Player>, Without<MainCamera>)>,
    mut q_cam: Query<(&mut Transform, &MainCamera), Without<Player>>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok((mut tf_cam, cam)) = q_cam.single_mut() else {
        return;
    };

    let alpha = 1.0 - (-cam.responsiveness * time.delta_secs()).exp();
    let target = tf_player.translation.x * cam.lean;
    tf_cam.translation.x += (target - tf_cam.translation.x) * alpha;
}
