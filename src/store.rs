//! Saved circuits, keyed by an opaque circuit id.

use log::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::snapshot::CircuitSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CircuitId(String);

impl CircuitId {
    pub fn new(id: impl Into<String>) -> Self {
        CircuitId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id reduced to characters that are safe in a file name
    fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CircuitId {
    fn from(id: &str) -> Self {
        CircuitId::new(id)
    }
}

/// Persistence collaborator
pub trait CircuitStore: Send {
    fn save(&mut self, id: &CircuitId, snapshot: &CircuitSnapshot) -> Result<(), StoreError>;
    fn load(&self, id: &CircuitId) -> Result<CircuitSnapshot, StoreError>;
    fn list(&self) -> Result<Vec<CircuitId>, StoreError>;
    fn delete(&mut self, id: &CircuitId) -> Result<(), StoreError>;

    fn contains(&self, id: &CircuitId) -> bool {
        self.load(id).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    circuits: BTreeMap<CircuitId, CircuitSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl CircuitStore for MemoryStore {
    fn save(&mut self, id: &CircuitId, snapshot: &CircuitSnapshot) -> Result<(), StoreError> {
        self.circuits.insert(id.clone(), snapshot.clone());
        Ok(())
    }

    fn load(&self, id: &CircuitId) -> Result<CircuitSnapshot, StoreError> {
        self.circuits
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownCircuit(id.to_string()))
    }

    fn list(&self) -> Result<Vec<CircuitId>, StoreError> {
        Ok(self.circuits.keys().cloned().collect())
    }

    fn delete(&mut self, id: &CircuitId) -> Result<(), StoreError> {
        self.circuits
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::UnknownCircuit(id.to_string()))
    }
}

/// One pretty-printed JSON file per circuit
#[derive(Debug, Clone)]
pub struct JsonDirectoryStore {
    root: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonDirectoryStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, id: &CircuitId) -> PathBuf {
        self.root.join(format!("{}.json", id.file_stem()))
    }
}

impl CircuitStore for JsonDirectoryStore {
    fn save(&mut self, id: &CircuitId, snapshot: &CircuitSnapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_of(id);
        fs::write(&path, snapshot.to_json()?)?;
        debug!("Saved circuit '{}' to {}", id, path.display());
        Ok(())
    }

    fn load(&self, id: &CircuitId) -> Result<CircuitSnapshot, StoreError> {
        let path = self.path_of(id);
        if !path.exists() {
            return Err(StoreError::UnknownCircuit(id.to_string()));
        }
        let content = fs::read_to_string(&path)?;
        Ok(CircuitSnapshot::from_json(&content)?)
    }

    fn list(&self) -> Result<Vec<CircuitId>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(CircuitId::new(stem));
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn delete(&mut self, id: &CircuitId) -> Result<(), StoreError> {
        let path = self.path_of(id);
        if !path.exists() {
            return Err(StoreError::UnknownCircuit(id.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        let id = CircuitId::new("adder");
        assert!(!store.contains(&id));

        let snapshot = CircuitSnapshot {
            name: "adder".to_string(),
            ..Default::default()
        };
        store.save(&id, &snapshot).unwrap();
        assert_eq!(store.load(&id).unwrap(), snapshot);
        assert_eq!(store.list().unwrap(), vec![id.clone()]);

        store.delete(&id).unwrap();
        assert!(matches!(store.load(&id), Err(StoreError::UnknownCircuit(_))));
        assert!(store.delete(&id).is_err());
    }

    #[test]
    fn test_file_stem_sanitised() {
        assert_eq!(CircuitId::new("my circuit/../x").file_stem(), "my_circuit____x");
    }
}
