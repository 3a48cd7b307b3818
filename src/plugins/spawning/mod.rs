//! Runtime producers that draw from the pools.
//!
//! ```text
//!   OnEnter(InGame)   launch_first_waves
//!   FixedUpdate       advance_waves     reads CategoryDrained(adversaries)
//!                     fire_armaments    munitions + muzzle effects
//!                     stream_backdrop   next track row once it is due
//! ```

pub mod backdrop;
pub mod waves;
pub mod weapons;

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::bootstrap::{BootstrapAppExt, stage};
use crate::plugins::field::scroll_field;

pub fn plugin(app: &mut App) {
    app.add_boot_stage(stage::FINALIZE, backdrop::prefill_backdrop);

    app.add_systems(OnEnter(GameState::InGame), waves::launch_first_waves);
    app.add_systems(
        FixedUpdate,
        (
            waves::advance_waves,
            weapons::fire_armaments,
            backdrop::stream_backdrop.after(scroll_field),
        )
            .run_if(in_state(GameState::InGame)),
    );
}
