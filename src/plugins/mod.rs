//! Feature plugins.

use bevy::prelude::*;

pub mod bootstrap;
pub mod combat;
pub mod core;
pub mod field;
pub mod level;
pub mod physics;
pub mod player;
pub mod pooling;
pub mod pools;
pub mod spawning;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    bootstrap::plugin(app);
    pooling::plugin(app);
    field::plugin(app);
    level::plugin(app);
    player::plugin(app);
    pools::plugin(app);
    spawning::plugin(app);
    combat::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}
