//! Bounded membership cache for special elements.
//!
//! The registry only speeds up connection checks. It can forget ids through
//! eviction, so every check that reads it also falls back to the element's
//! own type tag.

use std::fmt;

use axon_core::identifier::Id;
use indexmap::IndexSet;
use log::debug;

use crate::model::{Element, ElementKind, LayerKind};

/// Chooses which entry leaves a full [`BoundedIdSet`].
pub trait EvictionPolicy: fmt::Debug {
    /// Index of the entry to evict from a non-empty set.
    fn victim(&self, entries: &IndexSet<Id>) -> usize;
}

/// Evicts the entry that was inserted first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertionOrder;

impl EvictionPolicy for InsertionOrder {
    fn victim(&self, _entries: &IndexSet<Id>) -> usize {
        0
    }
}

/// A set of ids holding at most `capacity` entries.
///
/// Re-inserting a present id neither moves nor evicts anything. A capacity of
/// zero stores nothing.
#[derive(Debug, Clone)]
pub struct BoundedIdSet<P = InsertionOrder> {
    entries: IndexSet<Id>,
    capacity: usize,
    policy: P,
}

impl BoundedIdSet<InsertionOrder> {
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, InsertionOrder)
    }
}

impl<P: EvictionPolicy> BoundedIdSet<P> {
    pub fn with_policy(capacity: usize, policy: P) -> Self {
        Self {
            entries: IndexSet::with_capacity(capacity.min(1024)),
            capacity,
            policy,
        }
    }

    /// Inserts `id`, returning the evicted id if the set was full.
    pub fn insert(&mut self, id: Id) -> Option<Id> {
        if self.capacity == 0 || self.entries.contains(&id) {
            return None;
        }
        let mut evicted = None;
        while self.entries.len() >= self.capacity {
            let victim = self.policy.victim(&self.entries);
            // An out-of-range victim leaves the set full; drop the newcomer.
            evicted = Some(self.entries.shift_remove_index(victim)?);
        }
        self.entries.insert(id);
        evicted
    }

    pub fn contains(&self, id: Id) -> bool {
        self.entries.contains(&id)
    }

    pub fn remove(&mut self, id: Id) -> bool {
        self.entries.shift_remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Members, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.entries.iter().copied()
    }
}

/// Known containers and configuration nodes.
#[derive(Debug, Clone)]
pub struct ElementRegistry {
    containers: BoundedIdSet,
    configurations: BoundedIdSet,
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ElementRegistry {
    /// Creates a registry holding up to `capacity` ids per category.
    pub fn new(capacity: usize) -> Self {
        Self {
            containers: BoundedIdSet::new(capacity),
            configurations: BoundedIdSet::new(capacity),
        }
    }

    /// Records `element` if it is a container or configuration node.
    ///
    /// Returns `true` if the element belongs to either category.
    pub fn register(&mut self, element: &Element) -> bool {
        let id = element.id();
        let evicted = match element.kind() {
            ElementKind::Container => self.register_container(id),
            ElementKind::Layer(LayerKind::Configuration) => self.register_configuration(id),
            _ => return false,
        };
        if let Some(evicted) = evicted {
            debug!(evicted:% = evicted, registered:% = id; "Registry evicted an id");
        }
        true
    }

    /// Records a container id, returning the id evicted to make room.
    pub fn register_container(&mut self, id: Id) -> Option<Id> {
        self.containers.insert(id)
    }

    pub fn register_configuration(&mut self, id: Id) -> Option<Id> {
        self.configurations.insert(id)
    }

    pub fn is_container(&self, id: Id) -> bool {
        self.containers.contains(id)
    }

    pub fn is_configuration(&self, id: Id) -> bool {
        self.configurations.contains(id)
    }

    /// Drops `id` from every category.
    pub fn forget(&mut self, id: Id) {
        self.containers.remove(id);
        self.configurations.remove(id);
    }

    pub fn containers(&self) -> &BoundedIdSet {
        &self.containers
    }

    pub fn configurations(&self) -> &BoundedIdSet {
        &self.configurations
    }
}
