//! Staged bootstrap.
//!
//! Collaborators register one-shot systems against a numbered stage at plugin build
//! time. When the level enters `Loading`, every stage runs once, strictly ascending,
//! each fully finished before the next starts:
//!
//! ```text
//!   0 FIELD       play field, scroll frame
//!   1 STRUCTURAL  adversary pool, then placeholders
//!   2 DEPENDENT   munitions, pickups, backdrop (read the adversary pool)
//!   3 EFFECTS     effects (reads player, adversary and munition pools)
//!   4 FINALIZE    positions, backdrop prefill
//!   5 READY       LoadingStatus::finished, request InGame
//! ```
//!
//! A failing callback is logged and the remaining callbacks still run.

use std::any::type_name;
use std::collections::BTreeMap;

use bevy::ecs::system::SystemId;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::pooling::PoolError;

pub mod stage {
    pub const FIELD: u32 = 0;
    pub const STRUCTURAL: u32 = 1;
    pub const DEPENDENT: u32 = 2;
    pub const EFFECTS: u32 = 3;
    pub const FINALIZE: u32 = 4;
    pub const READY: u32 = 5;
}

pub type BootResult = Result<(), PoolError>;

#[derive(Debug, Clone, Copy)]
struct StageCallback {
    label: &'static str,
    system: SystemId<(), BootResult>,
}

/// Registered stage callbacks, consumed by the first [`run_stages`].
#[derive(Resource, Debug, Default)]
pub struct Bootstrap {
    stages: BTreeMap<u32, Vec<StageCallback>>,
    ran: bool,
}

impl Bootstrap {
    pub fn has_run(&self) -> bool {
        self.ran
    }

    pub fn pending(&self) -> usize {
        self.stages.values().map(Vec::len).sum()
    }
}

/// Flipped by the last stage. Pools use it to tell cold-start construction apart
/// from live activation.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadingStatus {
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootFailure {
    pub stage: u32,
    pub label: &'static str,
    pub reason: String,
}

/// Outcome of the bootstrap run, kept as a resource for inspection.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct BootReport {
    /// `(stage, label)` in execution order, failures included.
    pub ran: Vec<(u32, &'static str)>,
    pub failed: Vec<BootFailure>,
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadSet {
    /// Authored level content is spawned.
    Author,
    /// Bootstrap stages run.
    Boot,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Bootstrap>()
        .init_resource::<LoadingStatus>();

    app.configure_sets(
        OnEnter(GameState::Loading),
        (LoadSet::Author, LoadSet::Boot).chain(),
    );
    app.add_systems(OnEnter(GameState::Loading), run_bootstrap.in_set(LoadSet::Boot));

    app.add_boot_stage(stage::READY, mark_loading_finished);
}

pub trait BootstrapAppExt {
    /// Run `system` once during bootstrap, at `stage`, after everything registered
    /// earlier for the same stage.
    fn add_boot_stage<M>(
        &mut self,
        stage: u32,
        system: impl IntoSystem<(), BootResult, M> + 'static,
    ) -> &mut Self;
}

impl BootstrapAppExt for App {
    fn add_boot_stage<M>(
        &mut self,
        stage: u32,
        system: impl IntoSystem<(), BootResult, M> + 'static,
    ) -> &mut Self {
        register_boot_stage(self.world_mut(), stage, system);
        self
    }
}

pub fn register_boot_stage<S, M>(world: &mut World, stage: u32, system: S)
where
    S: IntoSystem<(), BootResult, M> + 'static,
{
    let label = type_name::<S>();
    if world.get_resource::<Bootstrap>().is_some_and(Bootstrap::has_run) {
        warn!("bootstrap already ran; ignoring late registration of {label} at stage {stage}");
        return;
    }

    let system = world.register_system(system);
    world
        .get_resource_or_init::<Bootstrap>()
        .stages
        .entry(stage)
        .or_default()
        .push(StageCallback { label, system });
}

/// Run every registered stage once, ascending.
pub fn run_stages(world: &mut World) -> BootReport {
    let mut report = BootReport::default();

    let stages = {
        let mut bootstrap = world.get_resource_or_init::<Bootstrap>();
        if bootstrap.ran {
            warn!("bootstrap already ran; skipping");
            return report;
        }
        bootstrap.ran = true;
        std::mem::take(&mut bootstrap.stages)
    };

    for (stage, callbacks) in stages {
        debug!("bootstrap: stage {stage} ({} callbacks)", callbacks.len());
        for callback in callbacks {
            report.ran.push((stage, callback.label));

            let reason = match world.run_system(callback.system) {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err.to_string()),
                Err(err) => Some(err.to_string()),
            };
            if let Some(reason) = reason {
                warn!("bootstrap: stage {stage} {} failed: {reason}", callback.label);
                report.failed.push(BootFailure {
                    stage,
                    label: callback.label,
                    reason,
                });
            }

            if let Err(err) = world.unregister_system(callback.system) {
                debug!("bootstrap: could not unregister {}: {err}", callback.label);
            }
        }
    }

    report
}

pub fn run_bootstrap(world: &mut World) {
    let report = run_stages(world);
    info!(
        "bootstrap finished: {} callbacks, {} failed",
        report.ran.len(),
        report.failed.len()
    );
    world.insert_resource(report);
}

pub fn mark_loading_finished(world: &mut World) -> BootResult {
    world.get_resource_or_init::<LoadingStatus>().finished = true;
    if let Some(mut next) = world.get_resource_mut::<NextState<GameState>>() {
        next.set(GameState::InGame);
    }
    Ok(())
}

#[cfg(test)]
mod tests;
