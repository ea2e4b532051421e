//! Maps save keys to entity factories.
//!
//! Built explicitly at startup rather than through registration side
//! effects, so the set of reconstructable entity types is visible in one
//! place.

use std::collections::HashMap;

use serde_json::Value;

use crate::asset::GameData;
use crate::entity::asteroid::Asteroid;
use crate::entity::powerup::Powerup;
use crate::entity::saucer::Saucer;
use crate::entity::ship::Ship;
use crate::entity::GameObject;
use crate::error::{EntityError, GameResult};

pub type SpawnFn = fn(&GameData, &Value) -> GameResult<Box<dyn GameObject>>;

pub struct EntityRegistry {
    factories: HashMap<&'static str, SpawnFn>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// The registry covering every persistable entity in the game.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Ship::SAVE_KEY, Ship::from_save);
        registry.register(Asteroid::SAVE_KEY, Asteroid::from_save);
        registry.register(Saucer::SAVE_KEY, Saucer::from_save);
        registry.register(Powerup::SAVE_KEY, Powerup::from_save);
        registry
    }

    /// Registering the same key twice is a programmer error.
    pub fn register(&mut self, key: &'static str, factory: SpawnFn) {
        let replaced = self.factories.insert(key, factory);
        assert!(replaced.is_none(), "spawner already registered for {key}");
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Reconstructs an entity from its save record.
    pub fn spawn(&self, data: &GameData, key: &str, fields: &Value) -> GameResult<Box<dyn GameObject>> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| EntityError::UnknownSaveKey(key.to_string()))?;
        factory(data, fields)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
