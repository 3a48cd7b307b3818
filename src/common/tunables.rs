//! Tunable gameplay constants.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    /// Half size of the visible play field, centred on the origin.
    pub field_half_extents: Vec2,
    /// Distance below the top edge where spawn markers fire.
    pub trigger_inset: f32,
    pub scroll_speed: f32,
    pub marker_radius: f32,
    pub player_munition_speed: f32,
    pub adversary_munition_speed: f32,
    /// Pooled instances further than this outside the field are returned.
    pub recycle_margin: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            field_half_extents: Vec2::new(320.0, 480.0),
            trigger_inset: 16.0,
            scroll_speed: 60.0,
            marker_radius: 24.0,
            player_munition_speed: 900.0,
            adversary_munition_speed: 320.0,
            recycle_margin: 96.0,
        }
    }
}
