use bevy::prelude::*;

use crate::plugins::bootstrap::stage;
use crate::plugins::pooling::sources::{placed_under, wave_entries};
use crate::plugins::pooling::{Adversaries, CategoryKind, DemandIndex, PoolCategory, PoolError};

impl PoolCategory for Adversaries {
    const KIND: CategoryKind = CategoryKind::Adversaries;
    const STAGE: u32 = stage::STRUCTURAL;

    fn discover(world: &mut World, index: &mut DemandIndex) -> Result<(), PoolError> {
        for (entity, template) in placed_under(world, Self::KIND) {
            if !template.role.is_adversary() {
                warn!(
                    "{}: placed {entity:?} '{}' is a {} template; skipped",
                    Self::KIND,
                    template.name,
                    template.role.label()
                );
                continue;
            }
            index.record(format_args!("placed {entity:?}"), &template, 1);
        }

        for (spawner, entry) in wave_entries(world) {
            if !entry.template.role.is_adversary() {
                warn!(
                    "{}: spawner '{spawner}' lists '{}', a {} template; skipped",
                    Self::KIND,
                    entry.template.name,
                    entry.template.role.label()
                );
                continue;
            }
            index.record(
                format_args!("spawner '{spawner}'"),
                &entry.template,
                entry.max_concurrent,
            );
        }
        Ok(())
    }
}
