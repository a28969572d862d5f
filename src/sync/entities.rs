//! Change sets shared by the local and remote sides

use std::collections::HashSet;

use crate::models::Entity;

/// Entities to remove and entities to insert or replace in one write
#[derive(Debug, Clone, PartialEq)]
pub struct EntitiesToSync<T> {
    pub to_delete: Vec<T>,
    pub to_upsert: Vec<T>,
}

impl<T> Default for EntitiesToSync<T> {
    fn default() -> Self {
        Self {
            to_delete: Vec::new(),
            to_upsert: Vec::new(),
        }
    }
}

impl<T: Entity> EntitiesToSync<T> {
    /// Turn `current` into `desired`: delete what `desired` no longer has, upsert all of `desired`
    pub fn between(current: &[T], desired: &[T]) -> Self {
        let kept: HashSet<T::Key> = desired.iter().map(Entity::key).collect();
        Self {
            to_delete: current
                .iter()
                .filter(|entity| !kept.contains(&entity.key()))
                .cloned()
                .collect(),
            to_upsert: desired.to_vec(),
        }
    }

    /// Delete every entity in `current`, then upsert every entity in `desired`
    pub fn replace_all(current: Vec<T>, desired: Vec<T>) -> Self {
        Self {
            to_delete: current,
            to_upsert: desired,
        }
    }

    pub fn delete_only(entities: Vec<T>) -> Self {
        Self {
            to_delete: entities,
            to_upsert: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_upsert.is_empty()
    }
}
