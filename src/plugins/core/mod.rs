//! Core plugin: shared resources and global settings.

use crate::common::tunables::Tunables;
use crate::plugins::pooling::PoolConfig;
use bevy::prelude::*;

pub fn plugin(app: &mut App) {
    app.insert_resource(Tunables::default());
    app.insert_resource(ClearColor(Color::srgb(0.02, 0.03, 0.06)));
    app.insert_resource(PoolConfig::from_env());
}
