//! Munition pools: one per faction.

use bevy::prelude::*;

use crate::plugins::bootstrap::stage;
use crate::plugins::player::{Arsenal, Player};
use crate::plugins::pooling::{
    Adversaries, AdversaryMunitions, CategoryKind, DemandIndex, PlayerMunitions, PoolCategory,
    PoolError,
};

use super::built;

pub(crate) fn player_arsenal(world: &mut World) -> Option<Arsenal> {
    world
        .query_filtered::<&Arsenal, With<Player>>()
        .iter(world)
        .next()
        .cloned()
}

impl PoolCategory for PlayerMunitions {
    const KIND: CategoryKind = CategoryKind::PlayerMunitions;
    const STAGE: u32 = stage::DEPENDENT;

    fn discover(world: &mut World, index: &mut DemandIndex) -> Result<(), PoolError> {
        let Some(arsenal) = player_arsenal(world) else {
            return Err(PoolError::DependencyNotReady {
                category: Self::KIND,
                dependency: "player",
            });
        };

        for weapon in &arsenal.0 {
            for (n, stage) in weapon.stages.iter().enumerate() {
                index.record(
                    format_args!("player weapon '{}' stage {n}", weapon.name),
                    &stage.munition,
                    stage.max_concurrent,
                );
            }
        }
        Ok(())
    }
}

impl PoolCategory for AdversaryMunitions {
    const KIND: CategoryKind = CategoryKind::AdversaryMunitions;
    const STAGE: u32 = stage::DEPENDENT;

    /// Every adversary that can be alive at once may have every stage's munitions
    /// in flight, so each stage counts `max_concurrent × adversary demand`.
    fn discover(world: &mut World, index: &mut DemandIndex) -> Result<(), PoolError> {
        let indexed = built::<Adversaries, Self>(world, "adversary pool")?
            .indexed()
            .to_vec();

        for adversary in &indexed {
            for weapon in &adversary.template.weapons {
                for (n, stage) in weapon.stages.iter().enumerate() {
                    index.record(
                        format_args!("'{}' weapon '{}' stage {n}", adversary.key, weapon.name),
                        &stage.munition,
                        stage.max_concurrent.saturating_mul(adversary.demand),
                    );
                }
            }
        }
        Ok(())
    }
}
