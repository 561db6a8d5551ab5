//! Save/load tests against a real circuit directory
//!
//! Each test gets its own directory under the system temp dir and removes it
//! when done.

use rusty_breadboard::config::{AppConfig, SimulationConfig};
use rusty_breadboard::error::StoreError;
use rusty_breadboard::session::Workbench;
use rusty_breadboard::snapshot::CircuitSnapshot;
use rusty_breadboard::store::{CircuitId, CircuitStore, JsonDirectoryStore};
use rusty_breadboard::{Circuit, ComponentKind, Coordinate, GateKind, PinState};
use std::fs;
use std::path::PathBuf;

fn c(section: u8, row: u8, column: u8) -> Coordinate {
    Coordinate::new(section, row, column)
}

struct TempDir(PathBuf);

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "rusty_breadboard_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        TempDir(path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// Inverter with its input tied to a switch and its output to an LED
fn inverter_circuit() -> Circuit {
    let mut circuit = Circuit::new("inverter");
    circuit.place_ic(c(1, 0, 10), GateKind::Not).unwrap();
    circuit.place_component(c(0, 0, 10), ComponentKind::Vcc).unwrap();
    circuit.place_component(c(1, 4, 16), ComponentKind::Gnd).unwrap();
    circuit.place_named_input("SW", c(1, 2, 10)).unwrap();
    circuit.place_component(c(1, 3, 11), ComponentKind::Output).unwrap();
    circuit.add_wire(c(1, 2, 11), c(0, 2, 40)).unwrap();
    circuit
}

#[cfg(test)]
mod directory_store_tests {
    use super::*;

    #[test]
    fn test_save_load_list_delete() {
        let dir = TempDir::new("store");
        let mut store = JsonDirectoryStore::new(&dir.0);
        assert_eq!(store.root(), dir.0.as_path());
        assert!(store.list().unwrap().is_empty());

        let snapshot = inverter_circuit().snapshot();
        let id = CircuitId::new("inverter");
        store.save(&id, &snapshot).unwrap();
        assert!(dir.0.join("inverter.json").exists());
        assert_eq!(store.list().unwrap(), vec![id.clone()]);
        assert_eq!(store.load(&id).unwrap(), snapshot);

        store.delete(&id).unwrap();
        assert!(matches!(store.load(&id), Err(StoreError::UnknownCircuit(_))));
    }

    #[test]
    fn test_corrupt_file_is_a_json_error() {
        let dir = TempDir::new("corrupt");
        fs::create_dir_all(&dir.0).unwrap();
        fs::write(dir.0.join("broken.json"), "{ not json").unwrap();

        let store = JsonDirectoryStore::new(&dir.0);
        let err = store.load(&CircuitId::new("broken")).unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[test]
    fn test_hand_written_snapshot_loads() {
        let json = r#"{
            "name": "hand",
            "ics": [{"kind": "NAND", "anchor": {"section": 1, "row": 0, "column": 2}}],
            "power": [{"kind": "VCC", "coordinate": {"section": 1, "row": 3, "column": 2}}]
        }"#;
        let snapshot = CircuitSnapshot::from_json(json).unwrap();
        assert!(snapshot.wires.is_empty());

        let mut circuit = Circuit::rehydrate(&snapshot).unwrap();
        let report = circuit.run();
        assert_eq!(report.summary.ic_count, 1);
        // pin 1 high, pin 2 floating low
        assert_eq!(circuit.pin_value(c(1, 0, 4)), 1);
    }
}

#[cfg(test)]
mod rehydration_tests {
    use super::*;

    #[test]
    fn test_rehydrated_circuit_behaves_like_original() {
        let mut original = inverter_circuit();
        original.toggle_input(c(1, 2, 10)).unwrap();
        let original_report = original.run();

        let mut restored = Circuit::rehydrate(&original.snapshot()).unwrap();
        assert_eq!(restored.grid().state(c(1, 2, 10)), Some(PinState::Low));
        assert!(restored.take_events().is_empty());

        let restored_report = restored.run();
        assert_eq!(restored_report.summary, original_report.summary);
        assert_eq!(restored_report.lit_outputs, vec![c(1, 3, 11)]);
        assert!(original_report.lit_outputs.is_empty());
        assert_eq!(restored.effective_value(c(0, 2, 40)), Some(1));
    }

    #[test]
    fn test_workbench_round_trip_through_directory() {
        let dir = TempDir::new("workbench");
        let config = AppConfig {
            store_dir: dir.0.clone(),
            ..AppConfig::default()
        };

        let mut bench = Workbench::new(
            Box::new(JsonDirectoryStore::new(config.store_dir.clone())),
            config.simulation,
            CircuitId::new("inverter"),
        );
        bench.with_circuit(|circuit| *circuit = inverter_circuit());
        bench.save().unwrap();

        let mut second = Workbench::new(
            Box::new(JsonDirectoryStore::new(config.store_dir.clone())),
            SimulationConfig::default(),
            CircuitId::new("scratch"),
        );
        second.open_or_create(CircuitId::new("inverter")).unwrap();
        let summary = second.with_circuit(|circuit| circuit.summary());
        assert_eq!(summary.ic_count, 1);
        assert_eq!(summary.input_count, 1);
        assert_eq!(summary.wire_count, 1);

        second.open_or_create(CircuitId::new("fresh")).unwrap();
        assert_eq!(second.with_circuit(|circuit| circuit.summary().ic_count), 0);
        assert_eq!(second.saved_circuits().unwrap(), vec![CircuitId::new("inverter")]);
    }
}
