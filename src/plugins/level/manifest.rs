//! JSON level manifest.
//!
//! Templates reference each other by name; [`LevelManifest::resolve`] turns the
//! name graph into shared [`Blueprint`]s. Problems are collected rather than fatal:
//! whatever resolves is kept, everything else is reported.

use std::sync::Arc;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::plugins::player::Arsenal;
use crate::plugins::pooling::sources::{BackdropTrack, Spawner, Wave, WaveMode, WaveTable};
use crate::plugins::pooling::{
    Blueprint, Body, CategoryKind, Role, SpawnEntry, Weapon, WeaponStage,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("template '{0}' is declared more than once")]
    DuplicateTemplate(String),

    #[error("'{referenced_by}' references unknown template '{name}'")]
    UnknownTemplate { name: String, referenced_by: String },

    #[error("template reference cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("'{referenced_by}' expects '{name}' to be a {expected}, found a {found}")]
    RoleMismatch {
        name: String,
        referenced_by: String,
        expected: &'static str,
        found: &'static str,
    },
}

// -----------------------------------------------------------------------------
// Declarations
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelManifest {
    pub name: String,
    #[serde(default)]
    pub templates: Vec<TemplateDecl>,
    #[serde(default)]
    pub placed: Vec<PlacedDecl>,
    #[serde(default)]
    pub spawners: Vec<SpawnerDecl>,
    #[serde(default)]
    pub player: Option<PlayerDecl>,
    #[serde(default)]
    pub backdrop: Option<BackdropDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateDecl {
    pub name: String,
    pub role: RoleDecl,
    #[serde(default)]
    pub color: Option<[f32; 3]>,
    #[serde(default)]
    pub size: Option<[f32; 2]>,
    /// Absent: the role's default body. `"none"`: no collider.
    #[serde(default)]
    pub body: Option<BodyDecl>,
    #[serde(default)]
    pub parts: Vec<PartDecl>,
    #[serde(default)]
    pub weapons: Vec<WeaponDecl>,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub drops: Vec<EntryDecl>,
    #[serde(default)]
    pub lifetime: Option<f32>,
    #[serde(default)]
    pub invincible_for: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleDecl {
    Adversary {
        hp: i32,
        #[serde(default)]
        ground: bool,
    },
    Munition {
        damage: i32,
        #[serde(default)]
        impact_effect: Option<String>,
    },
    Pickup,
    Effect,
    Backdrop,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyDecl {
    Circle(f32),
    Rect([f32; 2]),
    None,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartDecl {
    pub template: String,
    pub offset: [f32; 2],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeaponDecl {
    pub name: String,
    pub cooldown: f32,
    pub stages: Vec<StageDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageDecl {
    pub munition: String,
    pub max_concurrent: u32,
    #[serde(default)]
    pub muzzle_effect: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryDecl {
    pub template: String,
    pub max_concurrent: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacedDecl {
    pub category: CategoryKind,
    pub template: String,
    pub at: [f32; 2],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpawnerDecl {
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub mode: WaveMode,
    pub waves: Vec<Vec<EntryDecl>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerDecl {
    pub weapons: Vec<WeaponDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackdropDecl {
    pub spacing: f32,
    pub tiles: Vec<String>,
}

pub fn parse(raw: &str) -> Result<LevelManifest, ManifestError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        ManifestError::Parse {
            path,
            message: error.into_inner().to_string(),
        }
    })
}

// -----------------------------------------------------------------------------
// Resolution
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlacedContent {
    pub category: CategoryKind,
    pub template: Arc<Blueprint>,
    pub at: Vec2,
}

#[derive(Debug, Clone)]
pub struct SpawnerContent {
    pub spawner: Spawner,
    pub x: f32,
}

/// A manifest with every name reference replaced by its shared template.
#[derive(Debug, Clone, Default)]
pub struct ResolvedLevel {
    pub name: String,
    pub templates: Vec<Arc<Blueprint>>,
    pub placed: Vec<PlacedContent>,
    pub spawners: Vec<SpawnerContent>,
    pub player: Option<Arsenal>,
    pub backdrop: Option<BackdropTrack>,
}

impl ResolvedLevel {
    pub fn template(&self, name: &str) -> Option<&Arc<Blueprint>> {
        self.templates.iter().find(|t| t.name == name)
    }
}

impl LevelManifest {
    pub fn resolve(&self) -> (ResolvedLevel, Vec<ManifestError>) {
        let mut resolver = Resolver::new(&self.templates);
        let mut level = ResolvedLevel {
            name: self.name.clone(),
            ..default()
        };

        for decl in &self.templates {
            if let Some(template) = resolver.get(&decl.name, "templates") {
                if !level.templates.iter().any(|t| Arc::ptr_eq(t, &template)) {
                    level.templates.push(template);
                }
            }
        }

        for (n, placed) in self.placed.iter().enumerate() {
            let site = format!("placed[{n}]");
            if let Some(template) = resolver.get(&placed.template, &site) {
                level.placed.push(PlacedContent {
                    category: placed.category,
                    template,
                    at: Vec2::from(placed.at),
                });
            }
        }

        for spawner in &self.spawners {
            let site = format!("spawner '{}'", spawner.name);
            let waves = spawner
                .waves
                .iter()
                .map(|entries| Wave {
                    entries: entries
                        .iter()
                        .filter_map(|entry| resolver.entry(entry, &site))
                        .collect(),
                })
                .collect();
            level.spawners.push(SpawnerContent {
                spawner: Spawner::new(
                    spawner.name.clone(),
                    WaveTable {
                        mode: spawner.mode,
                        waves,
                    },
                ),
                x: spawner.x,
            });
        }

        level.player = self.player.as_ref().map(|player| {
            Arsenal(
                player
                    .weapons
                    .iter()
                    .map(|weapon| resolver.weapon(weapon, "player"))
                    .collect(),
            )
        });

        level.backdrop = self.backdrop.as_ref().map(|backdrop| BackdropTrack {
            tiles: backdrop
                .tiles
                .iter()
                .filter_map(|tile| resolver.get(tile, "backdrop"))
                .collect(),
            spacing: backdrop.spacing,
        });

        (level, resolver.issues)
    }
}

struct Resolver<'a> {
    decls: HashMap<&'a str, &'a TemplateDecl>,
    done: HashMap<String, Arc<Blueprint>>,
    visiting: Vec<String>,
    issues: Vec<ManifestError>,
}

impl<'a> Resolver<'a> {
    fn new(templates: &'a [TemplateDecl]) -> Self {
        let mut decls = HashMap::default();
        let mut issues = Vec::new();
        for decl in templates {
            if decls.insert(decl.name.as_str(), decl).is_some() {
                issues.push(ManifestError::DuplicateTemplate(decl.name.clone()));
            }
        }
        Self {
            decls,
            done: HashMap::default(),
            visiting: Vec::new(),
            issues,
        }
    }

    fn get(&mut self, name: &str, referenced_by: &str) -> Option<Arc<Blueprint>> {
        if let Some(template) = self.done.get(name) {
            return Some(template.clone());
        }
        if let Some(start) = self.visiting.iter().position(|n| n == name) {
            let mut cycle = self.visiting[start..].to_vec();
            cycle.push(name.to_string());
            self.issues.push(ManifestError::Cycle(cycle));
            return None;
        }
        let Some(decl) = self.decls.get(name).copied() else {
            self.issues.push(ManifestError::UnknownTemplate {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            });
            return None;
        };

        self.visiting.push(name.to_string());
        let template = Arc::new(self.build(decl));
        self.visiting.pop();

        self.done.insert(name.to_string(), template.clone());
        Some(template)
    }

    /// `get`, then require a role.
    fn get_as(
        &mut self,
        name: &str,
        referenced_by: &str,
        expected: &'static str,
        accepts: fn(&Role) -> bool,
    ) -> Option<Arc<Blueprint>> {
        let template = self.get(name, referenced_by)?;
        if accepts(&template.role) {
            return Some(template);
        }
        self.issues.push(ManifestError::RoleMismatch {
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
            expected,
            found: template.role.label(),
        });
        None
    }

    fn effect(&mut self, name: &str, referenced_by: &str) -> Option<Arc<Blueprint>> {
        self.get_as(name, referenced_by, "effect", |role| *role == Role::Effect)
    }

    fn entry(&mut self, decl: &EntryDecl, referenced_by: &str) -> Option<SpawnEntry> {
        let template = self.get(&decl.template, referenced_by)?;
        Some(SpawnEntry::new(&template, decl.max_concurrent))
    }

    fn weapon(&mut self, decl: &WeaponDecl, owner: &str) -> Weapon {
        let site = format!("{owner} weapon '{}'", decl.name);
        let mut weapon = Weapon::new(decl.name.clone(), decl.cooldown);
        for stage in &decl.stages {
            let Some(munition) = self.get_as(&stage.munition, &site, "munition", |role| {
                matches!(role, Role::Munition { .. })
            }) else {
                continue;
            };
            let mut resolved = WeaponStage::new(&munition, stage.max_concurrent);
            if let Some(effect) = stage
                .muzzle_effect
                .as_deref()
                .and_then(|name| self.effect(name, &site))
            {
                resolved = resolved.with_muzzle_effect(&effect);
            }
            weapon = weapon.with_stage(resolved);
        }
        weapon
    }

    fn build(&mut self, decl: &TemplateDecl) -> Blueprint {
        let owner = decl.name.as_str();

        let role = match &decl.role {
            RoleDecl::Adversary { hp, ground } => Role::Adversary {
                hp: *hp,
                ground: *ground,
            },
            RoleDecl::Munition {
                damage,
                impact_effect,
            } => Role::Munition {
                damage: *damage,
                impact_effect: impact_effect
                    .as_deref()
                    .and_then(|name| self.effect(name, owner)),
            },
            RoleDecl::Pickup => Role::Pickup,
            RoleDecl::Effect => Role::Effect,
            RoleDecl::Backdrop => Role::Backdrop,
        };

        let mut template = Blueprint::new(owner, role);
        if let Some([r, g, b]) = decl.color {
            template.look.color = Color::srgb(r, g, b);
        }
        if let Some(size) = decl.size {
            template.look.size = Vec2::from(size);
        }
        match decl.body {
            Some(BodyDecl::Circle(radius)) => template.body = Some(Body::Circle(radius)),
            Some(BodyDecl::Rect(size)) => template.body = Some(Body::Rect(Vec2::from(size))),
            Some(BodyDecl::None) => template.body = None,
            None => {}
        }

        for part in &decl.parts {
            if let Some(sub) = self.get(&part.template, owner) {
                template = template.with_part(&sub, Vec2::from(part.offset));
            }
        }
        for weapon in &decl.weapons {
            let weapon = self.weapon(weapon, owner);
            template = template.with_weapon(weapon);
        }
        for effect in &decl.effects {
            if let Some(effect) = self.effect(effect, owner) {
                template = template.with_effect(&effect);
            }
        }
        for drop in &decl.drops {
            if let Some(pickup) =
                self.get_as(&drop.template, owner, "pickup", |role| *role == Role::Pickup)
            {
                template = template.with_drop(&pickup, drop.max_concurrent);
            }
        }
        template.lifetime = decl.lifetime;
        template.invincible_for = decl.invincible_for;
        template
    }
}
