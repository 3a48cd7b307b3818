//! Consistency check over one pool and the instances it owns.

use bevy::platform::collections::{HashMap, HashSet};
use bevy::prelude::*;
use thiserror::Error;

use super::category::CategoryKind;
use super::components::{PoolMember, PoolState};
use super::key::PoolKey;
use super::pool::NamedPool;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("'{key}': queued {entity:?} no longer exists")]
    MissingEntity { key: PoolKey, entity: Entity },

    #[error("'{key}': queued {entity:?} is {state:?}")]
    NotQueued {
        key: PoolKey,
        entity: Entity,
        state: PoolState,
    },

    #[error("'{key}': queued {entity:?} is visible")]
    Visible { key: PoolKey, entity: Entity },

    #[error("'{key}': queued {entity:?} is not parented under the storage root")]
    Unparented { key: PoolKey, entity: Entity },

    #[error("'{key}': queued {entity:?} carries key '{found}'")]
    WrongQueue {
        key: PoolKey,
        entity: Entity,
        found: PoolKey,
    },

    #[error("{entity:?} is enqueued more than once")]
    Duplicate { entity: Entity },

    #[error("'{key}': reserve clone missing or not in reserve")]
    MissingClone { key: PoolKey },

    #[error("active count {counted} but {checked_out} instances are checked out")]
    ActiveMismatch { counted: u32, checked_out: u32 },

    #[error("'{key}': constructed {constructed} != queued {queued} + checked out {checked_out}")]
    Conservation {
        key: PoolKey,
        constructed: u32,
        queued: u32,
        checked_out: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub category: CategoryKind,
    pub keys: usize,
    pub queued: usize,
    pub checked_out: u32,
}

impl NamedPool {
    /// Check every bookkeeping invariant against the world.
    pub fn audit(&self, world: &World) -> Result<AuditReport, Vec<InvariantViolation>> {
        let category = self.category();
        let mut violations = Vec::new();

        let mut checked_out: HashMap<PoolKey, u32> = HashMap::default();
        let mut total_out = 0;
        if let Some(mut members) = world.try_query::<(&PoolMember, &PoolState)>() {
            for (member, state) in members.iter(world) {
                if member.category == category && *state == PoolState::Active {
                    *checked_out.entry(member.key.clone()).or_default() += 1;
                    total_out += 1;
                }
            }
        }

        let mut seen: HashSet<Entity> = HashSet::default();
        let mut queued_total = 0;
        for (key, queue) in self.queues() {
            queued_total += queue.len();
            for &entity in queue {
                if !seen.insert(entity) {
                    violations.push(InvariantViolation::Duplicate { entity });
                }
                let Ok(e) = world.get_entity(entity) else {
                    violations.push(InvariantViolation::MissingEntity {
                        key: key.clone(),
                        entity,
                    });
                    continue;
                };

                if let Some(&state) = e.get::<PoolState>().filter(|s| **s != PoolState::Queued) {
                    violations.push(InvariantViolation::NotQueued {
                        key: key.clone(),
                        entity,
                        state,
                    });
                }
                if e.get::<Visibility>() != Some(&Visibility::Hidden) {
                    violations.push(InvariantViolation::Visible {
                        key: key.clone(),
                        entity,
                    });
                }
                if e.get::<ChildOf>().map(ChildOf::parent) != self.root() {
                    violations.push(InvariantViolation::Unparented {
                        key: key.clone(),
                        entity,
                    });
                }
                if let Some(member) = e.get::<PoolMember>().filter(|m| m.key != *key) {
                    violations.push(InvariantViolation::WrongQueue {
                        key: key.clone(),
                        entity,
                        found: member.key.clone(),
                    });
                }
            }

            let clone_ok = self
                .clone_of(key.as_str())
                .and_then(|clone| world.get::<PoolState>(clone))
                .is_some_and(|state| *state == PoolState::Reserve);
            if !clone_ok {
                violations.push(InvariantViolation::MissingClone { key: key.clone() });
            }

            let queued = queue.len() as u32;
            let out = checked_out.get(key).copied().unwrap_or(0);
            let constructed = self.constructed(key.as_str());
            if constructed != queued + out {
                violations.push(InvariantViolation::Conservation {
                    key: key.clone(),
                    constructed,
                    queued,
                    checked_out: out,
                });
            }
        }

        if total_out != self.active_count() {
            violations.push(InvariantViolation::ActiveMismatch {
                counted: self.active_count(),
                checked_out: total_out,
            });
        }

        if violations.is_empty() {
            Ok(AuditReport {
                category,
                keys: self.clones().count(),
                queued: queued_total,
                checked_out: total_out,
            })
        } else {
            Err(violations)
        }
    }
}
