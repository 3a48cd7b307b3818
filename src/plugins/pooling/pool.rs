//! The generic named pool.
//!
//! ```text
//!  build:    DemandIndex ──► per key: min(required, ceiling) Queued instances
//!                                     + 1 Reserve clone (growth source)
//!
//!  spawn:    queue.pop_front() ──► activate ──► Active (detached from root)
//!              └─ empty? instantiate from the Reserve clone's template
//!
//!  despawn:  Active ──► deactivate ──► Queued, ChildOf(root), queue.push_back()
//! ```
//!
//! Activation and deactivation only write component values (state, visibility,
//! layers, velocity); the archetype of an instance does not change while it cycles.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use avian2d::prelude::*;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::plugins::bootstrap::LoadingStatus;

use super::blueprint::{self, Blueprint};
use super::category::{CategoryKind, PoolCategory};
use super::components::{
    Armament, Invincible, PoolMember, PoolRoot, PoolState, ScrollsWithField, Template, Vitals,
};
use super::demand::DemandIndex;
use super::key::PoolKey;
use super::lifecycle::ScheduledTasks;
use super::messages::{CategoryDrained, PooledSpawned};

/// Read-only summary of one indexed template, kept after the build so dependent
/// pools can derive their own demand from it.
#[derive(Debug, Clone)]
pub struct IndexedTemplate {
    pub key: PoolKey,
    pub template: Arc<Blueprint>,
    pub demand: u32,
    pub pooled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub key: PoolKey,
    pub at: Vec2,
    pub velocity: Vec2,
}

impl SpawnRequest {
    pub fn new(key: PoolKey) -> Self {
        Self {
            key,
            at: Vec2::ZERO,
            velocity: Vec2::ZERO,
        }
    }

    pub fn at(mut self, at: Vec2) -> Self {
        self.at = at;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }
}

/// Outcome of handing an instance back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Returned,
    /// Already back in its queue; nothing changed.
    AlreadyQueued,
    /// Not an active member of this pool; logged, nothing changed.
    Rejected,
}

#[derive(Debug)]
pub struct NamedPool {
    category: CategoryKind,
    root: Option<Entity>,
    queues: HashMap<PoolKey, VecDeque<Entity>>,
    clones: HashMap<PoolKey, Entity>,
    constructed: HashMap<PoolKey, u32>,
    indexed: Vec<IndexedTemplate>,
    active: u32,
    built: bool,
}

impl NamedPool {
    pub fn new(category: CategoryKind) -> Self {
        Self {
            category,
            root: None,
            queues: HashMap::default(),
            clones: HashMap::default(),
            constructed: HashMap::default(),
            indexed: Vec::new(),
            active: 0,
            built: false,
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    #[inline]
    pub fn category(&self) -> CategoryKind {
        self.category
    }

    #[inline]
    pub fn root(&self) -> Option<Entity> {
        self.root
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.built
    }

    #[inline]
    pub fn active_count(&self) -> u32 {
        self.active
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.queues.contains_key(key)
    }

    pub fn queued_len(&self, key: &str) -> usize {
        self.queues.get(key).map_or(0, VecDeque::len)
    }

    pub fn queued_total(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Instances ever created for `key`, clone excluded.
    pub fn constructed(&self, key: &str) -> u32 {
        self.constructed.get(key).copied().unwrap_or(0)
    }

    pub fn clone_of(&self, key: &str) -> Option<Entity> {
        self.clones.get(key).copied()
    }

    pub fn indexed(&self) -> &[IndexedTemplate] {
        &self.indexed
    }

    pub fn demand_of(&self, key: &str) -> Option<u32> {
        self.indexed
            .iter()
            .find(|entry| entry.key.as_str() == key)
            .map(|entry| entry.demand)
    }

    pub(super) fn queues(&self) -> impl Iterator<Item = (&PoolKey, &VecDeque<Entity>)> {
        self.queues.iter()
    }

    pub(super) fn clones(&self) -> impl Iterator<Item = (&PoolKey, &Entity)> {
        self.clones.iter()
    }

    // -------------------------------------------------------------------------
    // Build
    // -------------------------------------------------------------------------

    fn ensure_root(&mut self, world: &mut World) -> Entity {
        if let Some(root) = self.root.filter(|&root| world.get_entity(root).is_ok()) {
            return root;
        }
        let root = world
            .spawn((
                Name::new(format!("Pool({})", self.category)),
                PoolRoot(self.category),
                Transform::default(),
                Visibility::Hidden,
            ))
            .id();
        self.root = Some(root);
        root
    }

    /// Build queues for every pooled entry and keep the index summary.
    pub fn build_from(&mut self, world: &mut World, index: DemandIndex, ceiling: usize) {
        self.ensure_root(world);

        for entry in index.into_entries() {
            if entry.pooled {
                self.build(world, entry.key.clone(), &entry.template, entry.required, ceiling);
            }
            self.indexed.push(IndexedTemplate {
                key: entry.key,
                template: entry.template,
                demand: entry.required,
                pooled: entry.pooled,
            });
        }

        self.built = true;
        info!(
            "{}: pool built ({} keys, {} queued)",
            self.category,
            self.queues.len(),
            self.queued_total()
        );
    }

    /// Create `min(count, ceiling)` deactivated instances and, if the key is new, its
    /// reserve clone. Returns how many instances were queued.
    pub fn build(
        &mut self,
        world: &mut World,
        key: PoolKey,
        template: &Arc<Blueprint>,
        count: u32,
        ceiling: usize,
    ) -> usize {
        let root = self.ensure_root(world);
        let category = self.category;
        let count = (count as usize).min(ceiling);

        let member = PoolMember {
            key: key.clone(),
            category,
            generation: 0,
        };

        if !self.clones.contains_key(&key) {
            let clone = blueprint::instantiate(world, template, member.clone(), PoolState::Reserve, root);
            self.clones.insert(key.clone(), clone);
        }

        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            created.push(blueprint::instantiate(
                world,
                template,
                member.clone(),
                PoolState::Queued,
                root,
            ));
        }

        *self.constructed.entry(key.clone()).or_default() += count as u32;
        self.queues.entry(key.clone()).or_default().extend(created);
        debug!("{category}: built '{key}' x{count}");
        count
    }

    // -------------------------------------------------------------------------
    // Spawn / despawn
    // -------------------------------------------------------------------------

    /// Hand out an activated instance of `request.key`.
    pub fn spawn(&mut self, world: &mut World, request: &SpawnRequest) -> Option<Entity> {
        let category = self.category;
        let key = &request.key;

        let Some(queue) = self.queues.get_mut(key.as_str()) else {
            warn!("{category}: spawn of unknown key '{key}'");
            return None;
        };

        let mut picked = None;
        while let Some(candidate) = queue.pop_front() {
            match world.get::<PoolState>(candidate) {
                Some(PoolState::Queued) => {
                    picked = Some(candidate);
                    break;
                }
                Some(state) => {
                    error!("{category}: '{key}' queue held {candidate:?} in state {state:?}; dropped");
                }
                None => {
                    warn!("{category}: '{key}' queue held destroyed {candidate:?}; dropped");
                    if let Some(n) = self.constructed.get_mut(key.as_str()) {
                        *n = n.saturating_sub(1);
                    }
                }
            }
        }

        let entity = match picked {
            Some(entity) => entity,
            None => self.grow(world, key)?,
        };

        self.activate(world, entity, request)?;
        self.active += 1;

        let cold_start = world
            .get_resource::<LoadingStatus>()
            .is_none_or(|status| !status.finished);
        world.write_message(PooledSpawned {
            category,
            key: key.clone(),
            entity,
            cold_start,
        });
        Some(entity)
    }

    /// One new instance copied from the reserve clone.
    fn grow(&mut self, world: &mut World, key: &PoolKey) -> Option<Entity> {
        let category = self.category;
        let Some(root) = self.root else {
            error!("{category}: cannot grow '{key}': pool has no storage root");
            return None;
        };
        let Some(&clone) = self.clones.get(key) else {
            error!("{category}: cannot grow '{key}': no reserve clone");
            return None;
        };
        let Some(template) = world.get::<Template>(clone).map(|t| t.0.clone()) else {
            error!("{category}: cannot grow '{key}': reserve clone {clone:?} is gone");
            return None;
        };

        let member = PoolMember {
            key: key.clone(),
            category,
            generation: 0,
        };
        let entity = blueprint::instantiate(world, &template, member, PoolState::Queued, root);
        *self.constructed.entry(key.clone()).or_default() += 1;
        debug!("{category}: grew '{key}' to {}", self.constructed(key.as_str()));
        Some(entity)
    }

    fn activate(&self, world: &mut World, entity: Entity, request: &SpawnRequest) -> Option<()> {
        let category = self.category;
        let Ok(mut e) = world.get_entity_mut(entity) else {
            error!("{category}: cannot activate missing {entity:?}");
            return None;
        };

        let template = e.get::<Template>().map(|t| t.0.clone())?;
        let generation = {
            let mut member = e.get_mut::<PoolMember>()?;
            member.generation = member.generation.wrapping_add(1);
            member.generation
        };

        let velocity = if e.contains::<ScrollsWithField>() {
            Vec2::ZERO
        } else {
            request.velocity
        };

        e.remove::<ChildOf>();
        e.insert((
            PoolState::Active,
            Visibility::Visible,
            Transform::from_translation(request.at.extend(template.look.z)),
            ScheduledTasks::for_activation(&template, generation),
        ));

        if e.contains::<CollisionLayers>() {
            e.insert((blueprint::active_layers(category), LinearVelocity(velocity)));
        }
        if let Some(mut vitals) = e.get_mut::<Vitals>() {
            vitals.hp = vitals.max_hp;
        }
        if let Some(mut invincible) = e.get_mut::<Invincible>() {
            invincible.0 = template.invincible_for.is_some_and(|secs| secs > 0.0);
        }
        if let Some(mut armament) = e.get_mut::<Armament>() {
            armament.reset();
        }
        Some(())
    }

    /// Return an instance to the queue named by its own key.
    ///
    /// Returning an instance that is already queued is a no-op.
    pub fn despawn(&mut self, world: &mut World, entity: Entity) -> Release {
        let category = self.category;

        let Ok(mut e) = world.get_entity_mut(entity) else {
            warn!("{category}: despawn of missing {entity:?}");
            return Release::Rejected;
        };
        let Some(member) = e.get::<PoolMember>().cloned() else {
            warn!("{category}: {entity:?} is not a pooled instance");
            return Release::Rejected;
        };
        if member.category != category {
            error!("{category}: {entity:?} belongs to {}", member.category);
            return Release::Rejected;
        }
        let Some(root) = self.root else {
            error!("{category}: despawn before the pool was built");
            return Release::Rejected;
        };
        if !self.queues.contains_key(&member.key) {
            error!("{category}: despawn of {entity:?} with unknown key '{}'", member.key);
            return Release::Rejected;
        }

        match e.get::<PoolState>().copied() {
            Some(PoolState::Active) => {}
            Some(PoolState::Queued) => return Release::AlreadyQueued,
            state => {
                warn!("{category}: {entity:?} cannot be returned from {state:?}");
                return Release::Rejected;
            }
        }

        e.insert((PoolState::Queued, Visibility::Hidden, ChildOf(root)));
        if let Some(mut transform) = e.get_mut::<Transform>() {
            transform.translation.x = 0.0;
            transform.translation.y = 0.0;
        }
        if let Some(mut velocity) = e.get_mut::<LinearVelocity>() {
            velocity.0 = Vec2::ZERO;
        }
        if e.contains::<CollisionLayers>() {
            e.insert(blueprint::inactive_layers(category));
        }
        if let Some(mut tasks) = e.get_mut::<ScheduledTasks>() {
            tasks.clear();
        }
        if let Some(mut invincible) = e.get_mut::<Invincible>() {
            invincible.0 = false;
        }

        if let Some(queue) = self.queues.get_mut(&member.key) {
            queue.push_back(entity);
        }

        match self.active {
            0 => error!("{category}: active count underflow on {entity:?}"),
            1 => {
                self.active = 0;
                world.write_message(CategoryDrained { category });
                debug!("{category}: drained");
            }
            _ => self.active -= 1,
        }
        Release::Returned
    }
}

/// One named pool per category, stored as a resource.
#[derive(Resource)]
pub struct Pool<C: PoolCategory> {
    inner: NamedPool,
    _category: PhantomData<fn() -> C>,
}

impl<C: PoolCategory> Default for Pool<C> {
    fn default() -> Self {
        Self {
            inner: NamedPool::new(C::KIND),
            _category: PhantomData,
        }
    }
}

impl<C: PoolCategory> Deref for Pool<C> {
    type Target = NamedPool;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<C: PoolCategory> DerefMut for Pool<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
