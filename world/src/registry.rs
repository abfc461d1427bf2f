//! Authoritative entity storage and identifier allocation.

use std::collections::BTreeMap;

use subjunctive_core::{Entity, EntityId};

/// Registry that owns every entity known to the world, placed or not.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, Box<dyn Entity>>,
    next_entity_id: EntityId,
}

impl EntityRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_entity_id: EntityId::new(0),
        }
    }

    /// Stores the entity under a freshly allocated identifier.
    pub(crate) fn insert(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = EntityId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, entity);
        id
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&(dyn Entity + 'static)> {
        self.entries.get(&id).map(Box::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut (dyn Entity + 'static)> {
        self.entries.get_mut(&id).map(Box::as_mut)
    }

    /// Detaches the entity so it can be borrowed mutably alongside others.
    ///
    /// Must be paired with [`EntityRegistry::restore`].
    pub(crate) fn take(&mut self, id: EntityId) -> Option<Box<dyn Entity>> {
        self.entries.remove(&id)
    }

    pub(crate) fn restore(&mut self, id: EntityId, entity: Box<dyn Entity>) {
        let _ = self.entries.insert(id, entity);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops every entity. Identifiers keep counting up so stale ids never
    /// alias new entities.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
