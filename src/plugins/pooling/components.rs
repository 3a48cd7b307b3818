//! Components carried by pooled instances.

use std::sync::Arc;

use bevy::prelude::*;

use super::blueprint::{Blueprint, Weapon, WeaponStage};
use super::category::CategoryKind;
use super::key::PoolKey;

/// Lifecycle state (explicit enum).
///
/// `Reserve` marks the one clone-registry instance per key; it is never dequeued.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolState {
    #[default]
    Queued,
    Active,
    Reserve,
}

/// Identity of a pooled instance: which queue it returns to.
///
/// `generation` is bumped on every activation; timers stamped with an older
/// generation are discarded.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct PoolMember {
    pub key: PoolKey,
    pub category: CategoryKind,
    pub generation: u32,
}

/// Storage root every deactivated instance of one category is parented under.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolRoot(pub CategoryKind);

#[derive(Component, Debug, Clone)]
pub struct Template(pub Arc<Blueprint>);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vitals {
    pub hp: i32,
    pub max_hp: i32,
}

impl Vitals {
    pub fn full(max_hp: i32) -> Self {
        Self { hp: max_hp, max_hp }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Invincible(pub bool);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Munition {
    pub damage: i32,
}

/// Sub-template entity riding inside a composite instance. Never pooled on its own.
#[derive(Component, Debug, Clone, Copy)]
pub struct Part;

/// Moves with the scrolling field instead of under its own velocity.
#[derive(Component, Debug, Clone, Copy)]
pub struct ScrollsWithField;

#[derive(Debug, Clone)]
pub struct Mount {
    pub offset: Vec2,
    pub weapon: Weapon,
    pub stage: usize,
    pub cooldown: Timer,
}

impl Mount {
    pub fn new(weapon: &Weapon, offset: Vec2) -> Self {
        Self {
            offset,
            weapon: weapon.clone(),
            stage: 0,
            cooldown: Timer::from_seconds(weapon.cooldown.max(0.01), TimerMode::Repeating),
        }
    }

    pub fn current_stage(&self) -> Option<&WeaponStage> {
        self.weapon.stages.get(self.stage)
    }
}

/// Every weapon an instance fires, including those mounted on composite parts.
#[derive(Component, Debug, Clone, Default)]
pub struct Armament {
    pub mounts: Vec<Mount>,
}

impl Armament {
    pub fn from_weapons(weapons: &[Weapon]) -> Self {
        Self {
            mounts: weapons.iter().map(|w| Mount::new(w, Vec2::ZERO)).collect(),
        }
    }

    pub fn from_blueprint(template: &Blueprint) -> Self {
        let mut mounts = Vec::new();
        collect_mounts(template, Vec2::ZERO, &mut mounts);
        Self { mounts }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Back to stage 0 with fresh cooldowns.
    pub fn reset(&mut self) {
        for mount in &mut self.mounts {
            mount.stage = 0;
            mount.cooldown.reset();
        }
    }
}

fn collect_mounts(template: &Blueprint, offset: Vec2, mounts: &mut Vec<Mount>) {
    for weapon in &template.weapons {
        mounts.push(Mount::new(weapon, offset));
    }
    for part in &template.parts {
        collect_mounts(&part.template, offset + part.offset, mounts);
    }
}
