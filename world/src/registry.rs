//! Ordered entity storage with monotonic identifier allocation.

use std::collections::BTreeMap;

use village_defence_core::{EnemyId, PickupId, ProjectileId, TowerId};

/// Identifier type that a registry can allocate.
pub(crate) trait EntityId: Copy + Ord {
    /// Builds the identifier from its raw counter value.
    fn from_raw(value: u32) -> Self;
}

macro_rules! entity_id {
    ($($name:ident),*) => {
        $(impl EntityId for $name {
            fn from_raw(value: u32) -> Self {
                $name::new(value)
            }
        })*
    };
}

entity_id!(EnemyId, TowerId, ProjectileId, PickupId);

/// Entities keyed by identifier, iterated in allocation order.
#[derive(Debug)]
pub(crate) struct Registry<I, T> {
    entries: BTreeMap<I, T>,
    /// `None` once the last identifier has been handed out.
    next_id: Option<u32>,
}

impl<I: EntityId, T> Registry<I, T> {
    /// Creates an empty registry whose first identifier is zero.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: Some(0),
        }
    }

    /// Allocates an identifier and stores the entity built from it.
    ///
    /// Returns `None` without calling `build` once identifiers run out.
    pub(crate) fn insert_with<F>(&mut self, build: F) -> Option<I>
    where
        F: FnOnce(I) -> T,
    {
        let raw = self.next_id?;
        self.next_id = raw.checked_add(1);
        let id = I::from_raw(raw);
        let _ = self.entries.insert(id, build(id));
        Some(id)
    }

    pub(crate) fn get(&self, id: I) -> Option<&T> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }

    /// Identifiers currently stored, in allocation order.
    pub(crate) fn ids(&self) -> Vec<I> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes every entity rejected by `keep` and returns their identifiers.
    pub(crate) fn prune<F>(&mut self, mut keep: F) -> Vec<I>
    where
        F: FnMut(&T) -> bool,
    {
        let removed: Vec<I> = self
            .entries
            .iter()
            .filter(|(_, entity)| !keep(entity))
            .map(|(id, _)| *id)
            .collect();
        for id in &removed {
            let _ = self.entries.remove(id);
        }
        removed
    }
}
