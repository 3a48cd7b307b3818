use bevy::prelude::*;

use crate::plugins::bootstrap::stage;
use crate::plugins::pooling::{
    Adversaries, AdversaryMunitions, CategoryKind, DemandIndex, Effects, IndexedTemplate,
    PlayerMunitions, PoolCategory, PoolError, Role,
};

use super::built;
use super::munitions::player_arsenal;

impl PoolCategory for Effects {
    const KIND: CategoryKind = CategoryKind::Effects;
    const STAGE: u32 = stage::EFFECTS;

    fn discover(world: &mut World, index: &mut DemandIndex) -> Result<(), PoolError> {
        let adversaries = built::<Adversaries, Self>(world, "adversary pool")?
            .indexed()
            .to_vec();
        let mut munitions: Vec<IndexedTemplate> = built::<PlayerMunitions, Self>(world, "player munition pool")?
            .indexed()
            .to_vec();
        munitions.extend_from_slice(built::<AdversaryMunitions, Self>(world, "adversary munition pool")?.indexed());

        match player_arsenal(world) {
            Some(arsenal) => {
                for weapon in &arsenal.0 {
                    for stage in &weapon.stages {
                        if let Some(effect) = &stage.muzzle_effect {
                            index.record(
                                format_args!("player weapon '{}' muzzle", weapon.name),
                                effect,
                                stage.max_concurrent,
                            );
                        }
                    }
                }
            }
            None => debug!("{}: no player; skipping muzzle effects", Self::KIND),
        }

        for adversary in &adversaries {
            for effect in &adversary.template.effects {
                index.record(
                    format_args!("death effect of '{}'", adversary.key),
                    effect,
                    adversary.demand,
                );
            }
            for weapon in &adversary.template.weapons {
                for stage in &weapon.stages {
                    if let Some(effect) = &stage.muzzle_effect {
                        index.record(
                            format_args!("'{}' weapon '{}' muzzle", adversary.key, weapon.name),
                            effect,
                            stage.max_concurrent.saturating_mul(adversary.demand),
                        );
                    }
                }
            }
        }

        for munition in &munitions {
            if let Role::Munition {
                impact_effect: Some(effect),
                ..
            } = &munition.template.role
            {
                index.record(
                    format_args!("impact of '{}'", munition.key),
                    effect,
                    munition.demand,
                );
            }
        }
        Ok(())
    }
}
