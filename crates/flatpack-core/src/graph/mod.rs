//! Arena holding one entity graph.
//!
//! Entities reference each other through `EntityKey`s into the owning
//! `Graph`, so cycles need no shared ownership. Identity on the wire is the
//! entity's `EntityId`; identity in memory is its key.

mod entity;


pub use entity::Entity;

use crate::{types::EntityId, value::Value};
use std::ops::{Index, IndexMut};

///
/// EntityKey
/// Position of an entity inside its `Graph`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntityKey(usize);

impl EntityKey {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

///
/// Graph
///

#[derive(Clone, Debug, Default)]
pub struct Graph {
    entities: Vec<Entity>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an entity and return its key.
    pub fn insert(&mut self, entity: Entity) -> EntityKey {
        let key = EntityKey(self.entities.len());
        self.entities.push(entity);

        key
    }

    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key.0)
    }

    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key.0)
    }

    #[must_use]
    pub fn contains(&self, key: EntityKey) -> bool {
        key.0 < self.entities.len()
    }

    /// Set a property on the entity at `key`; false when the key or name is unknown.
    pub fn set(&mut self, key: EntityKey, name: &str, value: impl Into<Value>) -> bool {
        self.get_mut(key)
            .is_some_and(|entity| entity.set(name, value.into()))
    }

    /// Identity of the entity at `key`, assigning one if it has none yet.
    #[must_use]
    pub fn id(&self, key: EntityKey) -> Option<EntityId> {
        self.get(key).map(Entity::id)
    }

    /// Find the entity carrying an identity. Does not assign identities.
    #[must_use]
    pub fn find(&self, id: EntityId) -> Option<EntityKey> {
        self.entities
            .iter()
            .position(|entity| entity.peek_id() == Some(id))
            .map(EntityKey)
    }

    /// Resolve a key-valued property to the entity it points at.
    #[must_use]
    pub fn follow(&self, key: EntityKey, name: &str) -> Option<&Entity> {
        let target = self.get(key)?.get(name)?.as_reference()?;

        self.get(target)
    }

    /// Resolve a reference-list property to the keys it holds, skipping holes.
    #[must_use]
    pub fn follow_all(&self, key: EntityKey, name: &str) -> Vec<EntityKey> {
        self.get(key)
            .and_then(|entity| entity.get(name))
            .and_then(Value::as_reference_list)
            .map(|keys| keys.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, entity)| (EntityKey(i), entity))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Index<EntityKey> for Graph {
    type Output = Entity;

    fn index(&self, key: EntityKey) -> &Self::Output {
        &self.entities[key.0]
    }
}

impl IndexMut<EntityKey> for Graph {
    fn index_mut(&mut self, key: EntityKey) -> &mut Self::Output {
        &mut self.entities[key.0]
    }
}
