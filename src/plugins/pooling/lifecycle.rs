//! Per-instance timers.
//!
//! Every task is stamped with the activation generation it was scheduled for. A
//! re-spawn bumps the generation, so a timer left over from an earlier activation
//! is dropped instead of firing into the new one. Queued instances never tick.

use std::time::Duration;

use bevy::prelude::*;

use super::blueprint::Blueprint;
use super::commands::PoolCommandsExt;
use super::components::{Invincible, PoolMember, PoolState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedAction {
    /// Return the instance to its pool.
    Release,
    EndInvincibility,
}

#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub timer: Timer,
    pub action: TimedAction,
    pub generation: u32,
}

#[derive(Component, Debug, Clone, Default)]
pub struct ScheduledTasks {
    pub tasks: Vec<ScheduledTask>,
}

impl ScheduledTasks {
    /// Lifetime and spawn invincibility declared by the template.
    pub fn for_activation(template: &Blueprint, generation: u32) -> Self {
        let mut tasks = Self::default();
        if let Some(secs) = template.lifetime {
            tasks.schedule(secs, TimedAction::Release, generation);
        }
        if let Some(secs) = template.invincible_for.filter(|secs| *secs > 0.0) {
            tasks.schedule(secs, TimedAction::EndInvincibility, generation);
        }
        tasks
    }

    pub fn schedule(&mut self, secs: f32, action: TimedAction, generation: u32) {
        self.tasks.push(ScheduledTask {
            timer: Timer::from_seconds(secs.max(0.0), TimerMode::Once),
            action,
            generation,
        });
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advance every task of `generation`; returns the actions that came due.
    pub fn tick(&mut self, delta: Duration, generation: u32) -> Vec<TimedAction> {
        self.tasks.retain(|task| task.generation == generation);

        let mut due = Vec::new();
        self.tasks.retain_mut(|task| {
            task.timer.tick(delta);
            if task.timer.is_finished() {
                due.push(task.action);
                false
            } else {
                true
            }
        });
        due
    }
}

pub fn tick_scheduled_tasks(
    time: Res<Time>,
    mut commands: Commands,
    mut q: Query<(
        Entity,
        &PoolMember,
        &PoolState,
        &mut ScheduledTasks,
        Option<&mut Invincible>,
    )>,
) {
    for (entity, member, state, mut tasks, mut invincible) in &mut q {
        if *state != PoolState::Active || tasks.is_empty() {
            continue;
        }

        for action in tasks.tick(time.delta(), member.generation) {
            match action {
                TimedAction::Release => commands.despawn_pooled(entity),
                TimedAction::EndInvincibility => {
                    if let Some(invincible) = invincible.as_deref_mut() {
                        invincible.0 = false;
                    }
                }
            }
        }
    }
}
