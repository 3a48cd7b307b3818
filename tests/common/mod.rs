//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `shmup_pools::game::configure_headless` to install gameplay plugins.

#![allow(dead_code)]

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;

use shmup_pools::common::state::GameState;

pub fn app_headless() -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));

    shmup_pools::game::configure_headless(&mut app);
    app
}

/// Tick until the bootstrap has handed over to `InGame` (or give up after a few frames).
pub fn boot(app: &mut App) {
    for _ in 0..4 {
        app.update();
        if *app.world().resource::<State<GameState>>().get() == GameState::InGame {
            break;
        }
    }
}
