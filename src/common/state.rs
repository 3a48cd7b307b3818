//! Global state machine.

use bevy::prelude::*;

/// `Loading` covers authoring + bootstrap; gameplay systems only run `InGame`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    InGame,
}
