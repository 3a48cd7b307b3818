//! Level loading: turn the JSON manifest into authored world content.
//!
//! Runs in `LoadSet::Author`, before the bootstrap indexes anything. Everything
//! spawned here is authoring data: placed instances under per-category roots,
//! spawners with their wave tables, the player and the backdrop track.

pub mod manifest;

use std::borrow::Cow;

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::bootstrap::LoadSet;
use crate::plugins::player::spawn_player;
use crate::plugins::pooling::CategoryKind;
use crate::plugins::pooling::sources::{AuthoringRoot, Placed};

use manifest::ResolvedLevel;

pub const DEMO_LEVEL: &str = include_str!("../../../assets/levels/demo.json");

/// Which manifest the next load reads.
#[derive(Resource, Debug, Clone)]
pub struct LevelSource {
    pub name: String,
    pub json: Cow<'static, str>,
}

impl Default for LevelSource {
    fn default() -> Self {
        Self {
            name: "demo".into(),
            json: Cow::Borrowed(DEMO_LEVEL),
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<LevelSource>();
    app.add_systems(OnEnter(GameState::Loading), spawn_level.in_set(LoadSet::Author));
}

pub fn spawn_level(world: &mut World) {
    let source = world.get_resource::<LevelSource>().cloned().unwrap_or_default();

    let manifest = match manifest::parse(&source.json) {
        Ok(manifest) => manifest,
        Err(err) => {
            error!("level '{}': {err}; nothing authored", source.name);
            return;
        }
    };

    let (level, issues) = manifest.resolve();
    for issue in &issues {
        warn!("level '{}': {issue}", level.name);
    }

    author_level(world, &level);
    info!(
        "level '{}' authored: {} templates, {} placed, {} spawners",
        level.name,
        level.templates.len(),
        level.placed.len(),
        level.spawners.len()
    );
}

pub fn author_level(world: &mut World, level: &ResolvedLevel) {
    let mut roots: Vec<(CategoryKind, Entity)> = Vec::new();

    for placed in &level.placed {
        let root = match roots.iter().find(|(kind, _)| *kind == placed.category) {
            Some(&(_, root)) => root,
            None => {
                let root = world
                    .spawn((
                        Name::new(format!("Authoring({})", placed.category)),
                        AuthoringRoot(placed.category),
                        Transform::default(),
                        Visibility::Hidden,
                    ))
                    .id();
                roots.push((placed.category, root));
                root
            }
        };

        world.spawn((
            Name::new(format!("{}(Placed)", placed.template.name)),
            Placed(placed.template.clone()),
            Transform::from_translation(placed.at.extend(0.0)),
            Visibility::Inherited,
            ChildOf(root),
        ));
    }

    for content in &level.spawners {
        world.spawn((
            Name::new(format!("Spawner({})", content.spawner.name)),
            content.spawner.clone(),
            Transform::from_xyz(content.x, 0.0, 0.0),
        ));
    }

    if let Some(arsenal) = &level.player {
        spawn_player(world, arsenal.clone());
    }
    if let Some(track) = &level.backdrop {
        world.insert_resource(track.clone());
    }
}
