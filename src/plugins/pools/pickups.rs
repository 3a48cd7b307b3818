use bevy::prelude::*;

use crate::plugins::bootstrap::stage;
use crate::plugins::pooling::sources::placed_under;
use crate::plugins::pooling::{
    Adversaries, CategoryKind, DemandIndex, Pickups, PoolCategory, PoolError, Role,
};

use super::built;

impl PoolCategory for Pickups {
    const KIND: CategoryKind = CategoryKind::Pickups;
    const STAGE: u32 = stage::DEPENDENT;

    fn discover(world: &mut World, index: &mut DemandIndex) -> Result<(), PoolError> {
        let indexed = built::<Adversaries, Self>(world, "adversary pool")?
            .indexed()
            .to_vec();

        for (entity, template) in placed_under(world, Self::KIND) {
            if template.role != Role::Pickup {
                warn!("{}: placed {entity:?} '{}' is not a pickup; skipped", Self::KIND, template.name);
                continue;
            }
            index.record(format_args!("placed {entity:?}"), &template, 1);
        }

        for adversary in &indexed {
            for drop in &adversary.template.drops {
                index.record(
                    format_args!("drop table of '{}'", adversary.key),
                    &drop.template,
                    drop.max_concurrent.saturating_mul(adversary.demand),
                );
            }
        }
        Ok(())
    }
}
