//! Neighborhood directory
//!
//! Hashed lookup of registered neighborhoods. The engine only asks whether an
//! id exists; names are kept for reports.

use crate::models::registry::RegistryError;
use std::collections::HashMap;

/// Registered neighborhoods by id
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodDirectory {
    names: HashMap<i32, String>,
}

impl NeighborhoodDirectory {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    /// Register a neighborhood; fails if the id is already taken
    pub fn register(&mut self, id: i32, name: impl Into<String>) -> Result<(), RegistryError> {
        if self.names.contains_key(&id) {
            return Err(RegistryError::DuplicateNeighborhood(id));
        }
        self.names.insert(id, name.into());
        Ok(())
    }

    pub fn contains(&self, id: i32) -> bool {
        self.names.contains_key(&id)
    }

    pub fn get(&self, id: i32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Remove a neighborhood, returning its name
    pub fn remove(&mut self, id: i32) -> Result<String, RegistryError> {
        self.names
            .remove(&id)
            .ok_or(RegistryError::UnknownNeighborhood(id))
    }

    /// All neighborhoods sorted by id
    pub fn iter(&self) -> Vec<(i32, &str)> {
        let mut entries: Vec<(i32, &str)> = self
            .names
            .iter()
            .map(|(id, name)| (*id, name.as_str()))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
