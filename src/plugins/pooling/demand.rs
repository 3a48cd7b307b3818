//! Demand indexing: how many instances of each template a category needs up front.

use std::fmt::Display;
use std::sync::Arc;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::blueprint::Blueprint;
use super::category::CategoryKind;
use super::config::KeyPolicy;
use super::error::PoolError;
use super::key::PoolKey;

/// Accumulated demand for one key.
///
/// `pooled` is false for templates that only ever appear as composite parts; they are
/// indexed so dependent pools can see them, but get no queue of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolEntry {
    pub key: PoolKey,
    pub template: Arc<Blueprint>,
    pub required: u32,
    pub pooled: bool,
}

/// Per-key demand for one category, in first-seen order.
#[derive(Debug)]
pub struct DemandIndex {
    category: CategoryKind,
    policy: KeyPolicy,
    entries: Vec<PoolEntry>,
    slots: HashMap<PoolKey, usize>,
    rejected: Vec<PoolError>,
}

impl DemandIndex {
    pub fn new(category: CategoryKind, policy: KeyPolicy) -> Self {
        Self {
            category,
            policy,
            entries: Vec::new(),
            slots: HashMap::default(),
            rejected: Vec::new(),
        }
    }

    #[inline]
    pub fn category(&self) -> CategoryKind {
        self.category
    }

    /// Index one usage site; configuration errors are logged with the site and skipped.
    pub fn record(&mut self, site: impl Display, template: &Arc<Blueprint>, count: u32) {
        if let Err(err) = self.index_template(template, count) {
            warn!("{}: skipping {site}: {err}", self.category);
            self.rejected.push(err);
        }
    }

    /// Add `count` of `template`, recursing into its composite parts.
    ///
    /// Each part occurrence is indexed with the parent's count.
    pub fn index_template(&mut self, template: &Arc<Blueprint>, count: u32) -> Result<(), PoolError> {
        self.add(template, count, true)?;
        self.index_parts(template, count);
        Ok(())
    }

    fn index_parts(&mut self, template: &Arc<Blueprint>, count: u32) {
        for part in &template.parts {
            match self.add(&part.template, count, false) {
                Ok(()) => self.index_parts(&part.template, count),
                Err(err) => {
                    warn!(
                        "{}: skipping part '{}' of '{}': {err}",
                        self.category, part.template.name, template.name
                    );
                    self.rejected.push(err);
                }
            }
        }
    }

    fn add(&mut self, template: &Arc<Blueprint>, count: u32, pooled: bool) -> Result<(), PoolError> {
        let key = template.key()?;

        let Some(&slot) = self.slots.get(&key) else {
            self.slots.insert(key.clone(), self.entries.len());
            self.entries.push(PoolEntry {
                key,
                template: template.clone(),
                required: count,
                pooled,
            });
            return Ok(());
        };

        let entry = &mut self.entries[slot];
        let same = Arc::ptr_eq(&entry.template, template) || *entry.template == **template;
        if !same {
            match self.policy {
                KeyPolicy::Strict => {
                    return Err(PoolError::KeyCollision {
                        category: self.category,
                        key,
                    });
                }
                KeyPolicy::MergeFirstWins => {
                    warn!(
                        "{}: key '{key}' names two different templates; keeping the first",
                        self.category
                    );
                }
            }
        }

        entry.required = entry.required.saturating_add(count);
        entry.pooled |= pooled;
        Ok(())
    }

    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    pub fn required(&self, key: &str) -> Option<u32> {
        self.slots.get(key).map(|&slot| self.entries[slot].required)
    }

    /// Declarations that were skipped, in the order they were seen.
    pub fn rejected(&self) -> &[PoolError] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<PoolEntry> {
        self.entries
    }
}
