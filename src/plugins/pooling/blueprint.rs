//! Templates: the immutable authoring source every pooled instance is built from.
//!
//! A [`Blueprint`] is plain data shared through `Arc`. Nested references (composite
//! parts, weapon munitions, effects, drops) point at other blueprints, which is what
//! the demand indexers walk at bootstrap.

use std::sync::Arc;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;

use super::category::CategoryKind;
use super::components::{
    Armament, Invincible, Munition, Part, PoolMember, PoolState, ScrollsWithField, Template,
    Vitals,
};
use super::error::PoolError;
use super::key::PoolKey;

#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Adversary { hp: i32, ground: bool },
    Munition {
        damage: i32,
        impact_effect: Option<Arc<Blueprint>>,
    },
    Pickup,
    Effect,
    Backdrop,
}

impl Role {
    #[inline]
    pub fn is_adversary(&self) -> bool {
        matches!(self, Role::Adversary { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Adversary { .. } => "adversary",
            Role::Munition { .. } => "munition",
            Role::Pickup => "pickup",
            Role::Effect => "effect",
            Role::Backdrop => "backdrop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body {
    Circle(f32),
    Rect(Vec2),
}

impl Body {
    fn collider(self) -> Collider {
        match self {
            Body::Circle(radius) => Collider::circle(radius),
            Body::Rect(size) => Collider::rectangle(size.x, size.y),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Look {
    pub color: Color,
    pub size: Vec2,
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartSlot {
    pub template: Arc<Blueprint>,
    pub offset: Vec2,
}

/// One declared usage site: "up to `max_concurrent` of `template` alive at once".
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnEntry {
    pub template: Arc<Blueprint>,
    pub max_concurrent: u32,
}

impl SpawnEntry {
    pub fn new(template: &Arc<Blueprint>, max_concurrent: u32) -> Self {
        Self {
            template: template.clone(),
            max_concurrent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponStage {
    pub munition: Arc<Blueprint>,
    pub max_concurrent: u32,
    pub muzzle_effect: Option<Arc<Blueprint>>,
}

impl WeaponStage {
    pub fn new(munition: &Arc<Blueprint>, max_concurrent: u32) -> Self {
        Self {
            munition: munition.clone(),
            max_concurrent,
            muzzle_effect: None,
        }
    }

    pub fn with_muzzle_effect(mut self, effect: &Arc<Blueprint>) -> Self {
        self.muzzle_effect = Some(effect.clone());
        self
    }
}

/// A weapon is a table of power stages; each stage names the munition it fires.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub name: String,
    pub cooldown: f32,
    pub stages: Vec<WeaponStage>,
}

impl Weapon {
    pub fn new(name: impl Into<String>, cooldown: f32) -> Self {
        Self {
            name: name.into(),
            cooldown,
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: WeaponStage) -> Self {
        self.stages.push(stage);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub name: String,
    pub role: Role,
    pub look: Look,
    pub body: Option<Body>,
    /// Sub-templates riding inside this one (a multi-part boss).
    pub parts: Vec<PartSlot>,
    pub weapons: Vec<Weapon>,
    /// Effects played when an instance of this template is destroyed.
    pub effects: Vec<Arc<Blueprint>>,
    pub drops: Vec<SpawnEntry>,
    /// Seconds until a live instance returns itself to its pool.
    pub lifetime: Option<f32>,
    /// Seconds of invincibility after each activation.
    pub invincible_for: Option<f32>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        let (color, size, z, body) = match role {
            Role::Adversary { .. } => (Color::srgb(0.9, 0.25, 0.25), 32.0, 1.0, Some(Body::Circle(16.0))),
            Role::Munition { .. } => (Color::srgb(1.0, 0.85, 0.3), 8.0, 2.0, Some(Body::Circle(4.0))),
            Role::Pickup => (Color::srgb(0.3, 0.9, 0.4), 14.0, 1.5, Some(Body::Circle(7.0))),
            Role::Effect => (Color::srgb(1.0, 1.0, 1.0), 24.0, 3.0, None),
            Role::Backdrop => (Color::srgb(0.14, 0.14, 0.16), 64.0, 0.0, None),
        };

        Self {
            name: name.into(),
            role,
            look: Look {
                color,
                size: Vec2::splat(size),
                z,
            },
            body,
            parts: Vec::new(),
            weapons: Vec::new(),
            effects: Vec::new(),
            drops: Vec::new(),
            lifetime: None,
            invincible_for: None,
        }
    }

    pub fn adversary(name: impl Into<String>, hp: i32) -> Self {
        Self::new(name, Role::Adversary { hp, ground: false })
    }

    /// Adversary that sits on the scrolling ground instead of entering from an edge.
    pub fn ground_adversary(name: impl Into<String>, hp: i32) -> Self {
        Self::new(name, Role::Adversary { hp, ground: true })
    }

    pub fn munition(name: impl Into<String>, damage: i32) -> Self {
        Self::new(
            name,
            Role::Munition {
                damage,
                impact_effect: None,
            },
        )
    }

    pub fn pickup(name: impl Into<String>) -> Self {
        Self::new(name, Role::Pickup)
    }

    pub fn effect(name: impl Into<String>) -> Self {
        Self::new(name, Role::Effect)
    }

    pub fn backdrop(name: impl Into<String>) -> Self {
        Self::new(name, Role::Backdrop)
    }

    pub fn with_look(mut self, color: Color, size: Vec2) -> Self {
        self.look.color = color;
        self.look.size = size;
        self
    }

    pub fn with_body(mut self, body: Option<Body>) -> Self {
        self.body = body;
        self
    }

    pub fn with_part(mut self, template: &Arc<Blueprint>, offset: Vec2) -> Self {
        self.parts.push(PartSlot {
            template: template.clone(),
            offset,
        });
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapons.push(weapon);
        self
    }

    pub fn with_effect(mut self, effect: &Arc<Blueprint>) -> Self {
        self.effects.push(effect.clone());
        self
    }

    pub fn with_drop(mut self, template: &Arc<Blueprint>, max_concurrent: u32) -> Self {
        self.drops.push(SpawnEntry::new(template, max_concurrent));
        self
    }

    pub fn with_impact_effect(mut self, effect: &Arc<Blueprint>) -> Self {
        if let Role::Munition { impact_effect, .. } = &mut self.role {
            *impact_effect = Some(effect.clone());
        }
        self
    }

    pub fn with_lifetime(mut self, secs: f32) -> Self {
        self.lifetime = Some(secs);
        self
    }

    pub fn with_invincibility(mut self, secs: f32) -> Self {
        self.invincible_for = Some(secs);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn key(&self) -> Result<PoolKey, PoolError> {
        PoolKey::new(&self.name)
    }

    #[inline]
    pub fn is_composite(&self) -> bool {
        !self.parts.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Collision intent per category
// -----------------------------------------------------------------------------

fn membership(kind: CategoryKind) -> Layer {
    match kind {
        CategoryKind::Adversaries => Layer::Adversary,
        CategoryKind::PlayerMunitions => Layer::PlayerMunition,
        CategoryKind::AdversaryMunitions => Layer::AdversaryMunition,
        CategoryKind::Pickups => Layer::Pickup,
        CategoryKind::Backdrop | CategoryKind::Effects => Layer::Default,
    }
}

pub fn active_layers(kind: CategoryKind) -> CollisionLayers {
    match kind {
        CategoryKind::Adversaries => {
            CollisionLayers::new(Layer::Adversary, [Layer::Player, Layer::PlayerMunition])
        }
        CategoryKind::PlayerMunitions => CollisionLayers::new(Layer::PlayerMunition, [Layer::Adversary]),
        CategoryKind::AdversaryMunitions => CollisionLayers::new(Layer::AdversaryMunition, [Layer::Player]),
        CategoryKind::Pickups => CollisionLayers::new(Layer::Pickup, [Layer::Player]),
        CategoryKind::Backdrop | CategoryKind::Effects => inactive_layers(kind),
    }
}

/// "Disabled" without structural changes: empty filters means we collide with nothing.
pub fn inactive_layers(kind: CategoryKind) -> CollisionLayers {
    CollisionLayers::new(membership(kind), [] as [Layer; 0])
}

// -----------------------------------------------------------------------------
// Instantiation
// -----------------------------------------------------------------------------

/// Spawn one deactivated instance of `template` under `root`.
///
/// Composite parts are spawned as children of the instance; they ride inside it and
/// are never pooled on their own.
pub(crate) fn instantiate(
    world: &mut World,
    template: &Arc<Blueprint>,
    member: PoolMember,
    state: PoolState,
    root: Entity,
) -> Entity {
    let category = member.category;

    let mut entity = world.spawn((
        Name::new(format!("{}(Pooled)", template.name)),
        member,
        state,
        Template(template.clone()),
        Sprite {
            color: template.look.color,
            custom_size: Some(template.look.size),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, template.look.z),
        Visibility::Hidden,
        ChildOf(root),
    ));

    match &template.role {
        Role::Adversary { hp, ground } => {
            entity.insert((Vitals::full(*hp), Invincible::default()));
            if *ground {
                entity.insert(ScrollsWithField);
            }
        }
        Role::Munition { damage, .. } => {
            entity.insert(Munition { damage: *damage });
        }
        Role::Backdrop => {
            entity.insert(ScrollsWithField);
        }
        Role::Pickup | Role::Effect => {}
    }

    if let Some(body) = template.body {
        let rigid_body = match template.role {
            Role::Munition { .. } => RigidBody::Dynamic,
            _ => RigidBody::Kinematic,
        };
        entity.insert((
            rigid_body,
            body.collider(),
            inactive_layers(category),
            LinearVelocity::ZERO,
            CollisionEventsEnabled,
        ));
        if matches!(template.role, Role::Munition { .. } | Role::Pickup) {
            entity.insert(Sensor);
        }
    }

    let armament = Armament::from_blueprint(template);
    if !armament.is_empty() {
        entity.insert(armament);
    }

    let id = entity.id();
    for part in &template.parts {
        spawn_part(world, &part.template, part.offset, id);
    }
    id
}

fn spawn_part(world: &mut World, template: &Arc<Blueprint>, offset: Vec2, parent: Entity) {
    let id = world
        .spawn((
            Name::new(format!("{}(Part)", template.name)),
            Part,
            Template(template.clone()),
            Sprite {
                color: template.look.color,
                custom_size: Some(template.look.size),
                ..default()
            },
            Transform::from_translation(offset.extend(0.1)),
            Visibility::Inherited,
            ChildOf(parent),
        ))
        .id();

    for part in &template.parts {
        spawn_part(world, &part.template, part.offset, id);
    }
}
