//! In-process storage backend

use super::traits::{Entity, EntityStore, StorageError, StorageResult};
use crate::validate::Validator;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Ordered in-memory store
///
/// Entities are kept in id order, so `find_all` is stable between calls.
/// Thread-safe via an internal `RwLock`; the conflict check and the insert
/// happen under the same write guard.
pub struct MemoryStore<E: Entity> {
    entities: RwLock<BTreeMap<E::Id, E>>,
    validator: Option<Arc<dyn Validator<E>>>,
}

impl<E: Entity> MemoryStore<E> {
    /// An empty store that accepts any entity
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
            validator: None,
        }
    }

    /// An empty store that validates before every save and update
    pub fn with_validator(validator: Arc<dyn Validator<E>>) -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
            validator: Some(validator),
        }
    }

    pub fn len(&self) -> usize {
        self.entities.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self, entity: &E) -> StorageResult<()> {
        if let Some(validator) = &self.validator {
            validator.validate(entity)?;
        }
        Ok(())
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityStore<E> for MemoryStore<E> {
    fn find_one(&self, id: &E::Id) -> StorageResult<Option<E>> {
        let entities = self.entities.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entities.get(id).cloned())
    }

    fn find_all(&self) -> StorageResult<Vec<E>> {
        let entities = self.entities.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entities.values().cloned().collect())
    }

    fn save(&self, entity: E) -> StorageResult<Option<E>> {
        self.validate(&entity)?;

        let mut entities = self.entities.write().map_err(|_| StorageError::Poisoned)?;
        let id = entity.id();
        if entities.contains_key(&id) || entities.values().any(|e| e.conflicts_with(&entity)) {
            return Ok(None);
        }
        entities.insert(id, entity.clone());
        Ok(Some(entity))
    }

    fn update(&self, entity: E) -> StorageResult<Option<E>> {
        let id = entity.id();
        if self.find_one(&id)?.is_none() {
            return Ok(None);
        }
        self.validate(&entity)?;

        let mut entities = self.entities.write().map_err(|_| StorageError::Poisoned)?;
        // Removed between the check and the write
        if !entities.contains_key(&id) {
            return Ok(None);
        }
        if entities
            .iter()
            .any(|(other_id, e)| other_id != &id && e.conflicts_with(&entity))
        {
            return Ok(None);
        }
        entities.insert(id, entity.clone());
        Ok(Some(entity))
    }

    fn delete(&self, id: &E::Id) -> StorageResult<Option<E>> {
        let mut entities = self.entities.write().map_err(|_| StorageError::Poisoned)?;
        Ok(entities.remove(id))
    }
}
