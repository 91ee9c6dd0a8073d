//! Entity state storage
//!
//! The store is owned by the caller for the duration of one processing run. Entities
//! are created lazily on first appearance, starting from their seed when one was
//! supplied and from the model's initial state otherwise. Entities are never removed.

use crate::rating::population::PopulationSnapshot;
use crate::types::{EntityId, EntityState, Seed, SeedMap};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// In-memory entity state store keyed by identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    entities: BTreeMap<EntityId, EntityState>,
    seeds: SeedMap,
}

impl EntityStore {
    /// Create an empty store with no seeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose entities start from `seeds` on first appearance
    pub fn with_seeds(seeds: SeedMap) -> Self {
        Self {
            entities: BTreeMap::new(),
            seeds,
        }
    }

    /// Get an entity's current state
    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.entities.get(entity_id)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.entities.contains_key(entity_id)
    }

    /// Seed registered for an entity, if any
    pub fn seed(&self, entity_id: &str) -> Option<&Seed> {
        self.seeds.get(entity_id)
    }

    /// Create the entity if it is not known yet. Returns true when it was created.
    pub fn ensure(&mut self, entity_id: &str, initial: &EntityState) -> bool {
        if self.contains(entity_id) {
            return false;
        }

        let state = match self.seeds.get(entity_id) {
            Some(seed) => EntityState::new(seed.rating, seed.confidence),
            None => initial.clone(),
        };
        self.entities.insert(entity_id.to_string(), state);
        true
    }

    /// Store an entity's new state
    pub fn store(&mut self, entity_id: &str, state: EntityState) {
        self.entities.insert(entity_id.to_string(), state);
    }

    /// Number of known entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate known entities in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &EntityState)> {
        self.entities.iter()
    }

    /// Mean and floored standard deviation over all known ratings
    pub fn population(&self, min_std_dev: f64) -> PopulationSnapshot {
        PopulationSnapshot::from_ratings(self.entities.values().map(|e| e.rating), min_std_dev)
    }

    /// All entities ordered by rating (desc), then wins (desc), then identifier
    pub fn leaderboard(&self) -> Vec<(&EntityId, &EntityState)> {
        let mut ranked: Vec<_> = self.entities.iter().collect();
        ranked.sort_by(|a, b| rank_order(a, b));
        ranked
    }

    /// 1-based ranks of all known entities
    pub fn ranks(&self) -> BTreeMap<EntityId, usize> {
        self.leaderboard()
            .into_iter()
            .enumerate()
            .map(|(index, (id, _))| (id.clone(), index + 1))
            .collect()
    }

    /// Consume the store, returning the final entity states
    pub fn into_entities(self) -> BTreeMap<EntityId, EntityState> {
        self.entities
    }
}

fn rank_order(a: &(&EntityId, &EntityState), b: &(&EntityId, &EntityState)) -> Ordering {
    b.1.rating
        .total_cmp(&a.1.rating)
        .then_with(|| b.1.wins.cmp(&a.1.wins))
        .then_with(|| a.0.cmp(b.0))
}
