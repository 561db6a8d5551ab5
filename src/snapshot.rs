//! # Circuit Snapshots
//!
//! The flat entity list the persistence layer stores for one circuit.
//! Restoring a snapshot replays the same placement operations a user would
//! perform (parts, then ICs in their saved order, then wires) so the registry
//! and connectivity graph are rebuilt rather than copied. Input values are not
//! saved; every input comes back Low.
//!
//! ```json
//! {
//!   "name": "half_adder",
//!   "inputs": [{"name": "A", "coordinate": {"section": 1, "row": 2, "column": 10}}],
//!   "outputs": [{"section": 1, "row": 3, "column": 12}],
//!   "ics": [{"kind": "XOR", "anchor": {"section": 1, "row": 0, "column": 10}}],
//!   "power": [{"kind": "VCC", "coordinate": {"section": 0, "row": 0, "column": 10}}],
//!   "wires": [{"a": {"section": 1, "row": 1, "column": 10}, "b": {"section": 1, "row": 1, "column": 30}}]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::components::gates::GateKind;
use crate::components::ComponentKind;
use crate::config::SimulationConfig;
use crate::connection::Wire;
use crate::error::CircuitError;
use crate::pin::PinState;
use crate::types::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEntry {
    pub name: String,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcEntry {
    pub kind: GateKind,
    pub anchor: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerEntry {
    pub kind: ComponentKind,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitSnapshot {
    pub name: String,
    pub inputs: Vec<InputEntry>,
    pub outputs: Vec<Coordinate>,
    pub ics: Vec<IcEntry>,
    pub power: Vec<PowerEntry>,
    pub wires: Vec<Wire>,
}

impl CircuitSnapshot {
    pub fn capture(circuit: &Circuit) -> Self {
        let power = circuit
            .grid()
            .iter()
            .filter_map(|(coordinate, attr)| {
                let kind = match attr.state {
                    PinState::Vcc => ComponentKind::Vcc,
                    PinState::Gnd => ComponentKind::Gnd,
                    _ => return None,
                };
                Some(PowerEntry { kind, coordinate })
            })
            .collect();

        CircuitSnapshot {
            name: circuit.name().to_string(),
            inputs: circuit
                .inputs()
                .map(|(coordinate, name)| InputEntry {
                    name: name.to_string(),
                    coordinate,
                })
                .collect(),
            outputs: circuit.outputs().collect(),
            ics: circuit
                .gates()
                .map(|(_, gate)| IcEntry {
                    kind: gate.kind,
                    anchor: gate.anchor,
                })
                .collect(),
            power,
            wires: circuit.wires().copied().collect(),
        }
    }

    /// Build a fresh circuit by replaying every saved entity
    pub fn restore(&self, config: SimulationConfig) -> Result<Circuit, CircuitError> {
        let mut circuit = Circuit::with_config(self.name.clone(), config);

        for entry in &self.power {
            if !entry.kind.is_power() {
                return Err(CircuitError::PlacementConflict(
                    entry.coordinate,
                    "power entry is not VCC or GND",
                ));
            }
            circuit.place_component(entry.coordinate, entry.kind)?;
        }
        for entry in &self.inputs {
            circuit.place_named_input(entry.name.clone(), entry.coordinate)?;
        }
        for coord in &self.outputs {
            circuit.place_component(*coord, ComponentKind::Output)?;
        }
        for entry in &self.ics {
            circuit.place_ic(entry.anchor, entry.kind)?;
        }
        for wire in &self.wires {
            circuit.add_wire(wire.a, wire.b)?;
        }

        // Loading is not a user-visible change
        circuit.take_events();
        Ok(circuit)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

impl Circuit {
    pub fn snapshot(&self) -> CircuitSnapshot {
        CircuitSnapshot::capture(self)
    }

    pub fn rehydrate(snapshot: &CircuitSnapshot) -> Result<Circuit, CircuitError> {
        snapshot.restore(SimulationConfig::default())
    }
}
