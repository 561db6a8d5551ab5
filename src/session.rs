//! # Workbench Session
//!
//! Holds the one circuit currently being edited. The circuit lives behind a
//! single `Arc<Mutex<_>>` so a UI thread and the engine never mutate or read
//! it concurrently. Switching circuits rebuilds a fresh [`Circuit`] (and with
//! it a fresh IC pin registry) from the store and drops the previous one.

use log::info;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::circuit::Circuit;
use crate::config::SimulationConfig;
use crate::error::StoreError;
use crate::store::{CircuitId, CircuitStore};

pub struct Workbench {
    store: Box<dyn CircuitStore>,
    config: SimulationConfig,
    active_id: CircuitId,
    active: Arc<Mutex<Circuit>>,
}

impl Workbench {
    /// Start on an empty circuit called `id`
    pub fn new(store: Box<dyn CircuitStore>, config: SimulationConfig, id: CircuitId) -> Self {
        let circuit = Circuit::with_config(id.as_str(), config);
        Workbench {
            store,
            config,
            active_id: id,
            active: Arc::new(Mutex::new(circuit)),
        }
    }

    pub fn active_id(&self) -> &CircuitId {
        &self.active_id
    }

    /// Shared handle to the active circuit
    pub fn handle(&self) -> Arc<Mutex<Circuit>> {
        Arc::clone(&self.active)
    }

    fn lock(&self) -> MutexGuard<'_, Circuit> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_circuit<R>(&self, f: impl FnOnce(&mut Circuit) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Replace the active circuit with an empty one
    pub fn new_circuit(&mut self, id: CircuitId) {
        info!("Switched to new circuit '{}'", id);
        self.swap(id.clone(), Circuit::with_config(id.as_str(), self.config));
    }

    /// Replace the active circuit with a saved one
    pub fn open(&mut self, id: CircuitId) -> Result<(), StoreError> {
        let snapshot = self.store.load(&id)?;
        let circuit = snapshot.restore(self.config)?;
        info!("Opened circuit '{}': {}", id, circuit.summary());
        self.swap(id, circuit);
        Ok(())
    }

    /// Open `id` if it was saved before, otherwise start it empty
    pub fn open_or_create(&mut self, id: CircuitId) -> Result<(), StoreError> {
        match self.open(id.clone()) {
            Err(StoreError::UnknownCircuit(_)) => {
                self.new_circuit(id);
                Ok(())
            }
            other => other,
        }
    }

    fn swap(&mut self, id: CircuitId, circuit: Circuit) {
        *self.lock() = circuit;
        self.active_id = id;
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        let snapshot = self.lock().snapshot();
        self.store.save(&self.active_id, &snapshot)?;
        info!("Saved circuit '{}'", self.active_id);
        Ok(())
    }

    pub fn saved_circuits(&self) -> Result<Vec<CircuitId>, StoreError> {
        self.store.list()
    }

    pub fn delete(&mut self, id: &CircuitId) -> Result<(), StoreError> {
        self.store.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::gates::GateKind;
    use crate::components::ComponentKind;
    use crate::store::MemoryStore;
    use crate::types::Coordinate;

    fn workbench() -> Workbench {
        Workbench::new(
            Box::new(MemoryStore::new()),
            SimulationConfig::default(),
            CircuitId::new("first"),
        )
    }

    #[test]
    fn test_save_and_reopen() {
        let mut bench = workbench();
        bench
            .with_circuit(|c| c.place_ic(Coordinate::new(1, 0, 5), GateKind::Nor))
            .unwrap();
        bench.save().unwrap();

        bench.new_circuit(CircuitId::new("second"));
        assert_eq!(bench.with_circuit(|c| c.summary().ic_count), 0);
        assert_eq!(bench.active_id().as_str(), "second");

        bench.open(CircuitId::new("first")).unwrap();
        assert_eq!(bench.with_circuit(|c| c.summary().ic_count), 1);
        assert_eq!(bench.saved_circuits().unwrap(), vec![CircuitId::new("first")]);
    }

    #[test]
    fn test_registry_scoped_to_active_circuit() {
        let mut bench = workbench();
        let anchor = Coordinate::new(1, 0, 5);
        bench
            .with_circuit(|c| c.place_ic(anchor, GateKind::And))
            .unwrap();
        let handle = bench.handle();

        bench.new_circuit(CircuitId::new("other"));
        let circuit = handle.lock().unwrap();
        assert!(!circuit.registry().is_ic_pin(anchor));
        assert_eq!(circuit.name(), "other");
    }

    #[test]
    fn test_open_unknown_keeps_active_circuit() {
        let mut bench = workbench();
        bench
            .with_circuit(|c| c.place_component(Coordinate::new(0, 0, 0), ComponentKind::Vcc))
            .unwrap();
        assert!(bench.open(CircuitId::new("missing")).is_err());
        assert_eq!(bench.active_id().as_str(), "first");
        assert_eq!(bench.with_circuit(|c| c.summary().power_pin_count), 1);

        bench.open_or_create(CircuitId::new("missing")).unwrap();
        assert_eq!(bench.active_id().as_str(), "missing");
    }
}
