//! Declarative spawn sources the demand indexers walk.
//!
//! Authored content lives in the world while loading: placed instances are children of
//! an [`AuthoringRoot`], spawners carry wave tables, and the backdrop track is a
//! resource.

use std::sync::Arc;

use bevy::prelude::*;
use serde::Deserialize;

use super::blueprint::{Blueprint, SpawnEntry};
use super::category::CategoryKind;

/// Parent of everything pre-placed for one category.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthoringRoot(pub CategoryKind);

/// A pre-placed instance of a template.
#[derive(Component, Debug, Clone)]
pub struct Placed(pub Arc<Blueprint>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveMode {
    /// Each wave plays once.
    #[default]
    Finite,
    /// Waves loop forever.
    Infinite,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Wave {
    pub entries: Vec<SpawnEntry>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaveTable {
    pub mode: WaveMode,
    pub waves: Vec<Wave>,
}

impl WaveTable {
    pub fn wave_at(&self, cursor: usize) -> Option<&Wave> {
        match self.mode {
            WaveMode::Finite => self.waves.get(cursor),
            WaveMode::Infinite if self.waves.is_empty() => None,
            WaveMode::Infinite => self.waves.get(cursor % self.waves.len()),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &SpawnEntry> {
        self.waves.iter().flat_map(|wave| wave.entries.iter())
    }
}

#[derive(Component, Debug, Clone)]
pub struct Spawner {
    pub name: String,
    pub table: WaveTable,
    /// Index of the wave that launches next.
    pub cursor: usize,
}

impl Spawner {
    pub fn new(name: impl Into<String>, table: WaveTable) -> Self {
        Self {
            name: name.into(),
            table,
            cursor: 0,
        }
    }
}

/// Background tiles streamed in order, one row every `spacing` world units.
#[derive(Resource, Debug, Clone, Default)]
pub struct BackdropTrack {
    pub tiles: Vec<Arc<Blueprint>>,
    pub spacing: f32,
}

impl BackdropTrack {
    /// Rows alive at once when a row lives for `span` world units of scrolling.
    pub fn live_rows(&self, span: f32) -> u32 {
        if self.spacing <= 0.0 {
            return 0;
        }
        (span / self.spacing).ceil() as u32 + 2
    }

    /// Peak concurrent instances contributed by one occurrence in the track.
    pub fn demand_per_tile(&self, span: f32) -> u32 {
        if self.tiles.is_empty() {
            return 0;
        }
        self.live_rows(span).div_ceil(self.tiles.len() as u32)
    }
}

/// Placed templates under the category's authoring roots, in spawn order.
pub fn placed_under(world: &mut World, kind: CategoryKind) -> Vec<(Entity, Arc<Blueprint>)> {
    let roots: Vec<Entity> = world
        .query::<(Entity, &AuthoringRoot)>()
        .iter(world)
        .filter(|(_, root)| root.0 == kind)
        .map(|(entity, _)| entity)
        .collect();

    let mut placed: Vec<(Entity, Arc<Blueprint>)> = world
        .query::<(Entity, &Placed, &ChildOf)>()
        .iter(world)
        .filter(|(_, _, child_of)| roots.contains(&child_of.parent()))
        .map(|(entity, placed, _)| (entity, placed.0.clone()))
        .collect();
    placed.sort_by_key(|(entity, _)| *entity);
    placed
}

/// World-space translation of a placed entity whose parent is an authoring root.
///
/// Used at bootstrap, before transform propagation has run.
pub fn authored_position(world: &World, entity: Entity) -> Vec3 {
    let local = world.get::<Transform>(entity).map_or(Vec3::ZERO, |t| t.translation);
    let root = world
        .get::<ChildOf>(entity)
        .and_then(|child_of| world.get::<Transform>(child_of.parent()))
        .map_or(Vec3::ZERO, |t| t.translation);
    local + root
}

/// Every wave entry of every spawner, tagged with the spawner's name.
pub fn wave_entries(world: &mut World) -> Vec<(String, SpawnEntry)> {
    let mut spawners: Vec<(Entity, Spawner)> = world
        .query::<(Entity, &Spawner)>()
        .iter(world)
        .map(|(entity, spawner)| (entity, spawner.clone()))
        .collect();
    spawners.sort_by_key(|(entity, _)| *entity);

    spawners
        .into_iter()
        .flat_map(|(_, spawner)| {
            let name = spawner.name.clone();
            spawner
                .table
                .entries()
                .cloned()
                .map(move |entry| (name.clone(), entry))
                .collect::<Vec<_>>()
        })
        .collect()
}
