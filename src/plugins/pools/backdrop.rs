use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::bootstrap::stage;
use crate::plugins::pooling::sources::{BackdropTrack, placed_under};
use crate::plugins::pooling::{Backdrop, CategoryKind, DemandIndex, PoolCategory, PoolError, Role};

impl PoolCategory for Backdrop {
    const KIND: CategoryKind = CategoryKind::Backdrop;
    const STAGE: u32 = stage::DEPENDENT;

    fn discover(world: &mut World, index: &mut DemandIndex) -> Result<(), PoolError> {
        for (entity, template) in placed_under(world, Self::KIND) {
            if template.role != Role::Backdrop {
                warn!("{}: placed {entity:?} '{}' is not a backdrop piece; skipped", Self::KIND, template.name);
                continue;
            }
            index.record(format_args!("placed {entity:?}"), &template, 1);
        }

        let Some(track) = world.get_resource::<BackdropTrack>().cloned() else {
            return Ok(());
        };
        // A row lives from just above the top edge until it is recycled below the bottom.
        let tunables = world.get_resource::<Tunables>().cloned().unwrap_or_default();
        let span = tunables.field_half_extents.y * 2.0 + tunables.recycle_margin;

        let per_tile = track.demand_per_tile(span);
        for (n, tile) in track.tiles.iter().enumerate() {
            index.record(format_args!("backdrop track row {n}"), tile, per_tile);
        }
        Ok(())
    }
}
