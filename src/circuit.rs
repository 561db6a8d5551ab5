//! # Circuit
//!
//! One breadboard with everything placed on it. Owns the pin grid, the wires,
//! the connectivity graph and the IC pin registry, and is the only thing that
//! mutates them.
//!
//! Every accepted edit re-derives the graph and all propagated signals, then
//! re-reads the OUTPUT parts and queues a [`CircuitEvent`] for each one whose
//! lit state changed. Rejected edits return a [`CircuitError`] and leave the
//! circuit exactly as it was.
//!
//! ## Running
//!
//! [`Circuit::run`] drives the power rails, evaluates every gate of every IC
//! exactly once in placement order and then resolves the outputs. There is no
//! iteration to a fixed point: an IC fed by another IC's output sees the new
//! value only if the upstream IC was placed first. Otherwise it sees the value
//! from the previous run.

use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::components::gates::{GateKind, GND_PIN, VCC_PIN};
use crate::components::ic::{self, Gate, LOWER_ROW, LOWER_SECTION};
use crate::components::ComponentKind;
use crate::config::SimulationConfig;
use crate::connection::{ConnectivityGraph, Wire, WireSet};
use crate::error::CircuitError;
use crate::grid::PinGrid;
use crate::pin::{PinState, SignalResolver};
use crate::propagation::{self, WireConflict};
use crate::registry::IcPinRegistry;
use crate::types::{Coordinate, GateId};

/// An OUTPUT part switched on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualStateChange {
    pub coordinate: Coordinate,
    pub on: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitEvent {
    VisualStateChanged(VisualStateChange),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CircuitSummary {
    pub ic_count: usize,
    pub input_count: usize,
    pub output_count: usize,
    pub power_pin_count: usize,
    pub wire_count: usize,
}

impl fmt::Display for CircuitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ICs, {} inputs, {} outputs, {} power pins, {} wires",
            self.ic_count, self.input_count, self.output_count, self.power_pin_count, self.wire_count
        )
    }
}

/// Result of one simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub summary: CircuitSummary,
    pub changes: Vec<VisualStateChange>,
    pub conflicts: Vec<WireConflict>,
    pub lit_outputs: Vec<Coordinate>,
}

#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    config: SimulationConfig,
    grid: PinGrid,
    wires: WireSet,
    graph: ConnectivityGraph,
    registry: IcPinRegistry,
    gates: Vec<(GateId, Gate)>,
    next_gate_id: u32,
    next_input_id: u32,
    inputs: BTreeMap<Coordinate, String>,
    outputs: BTreeSet<Coordinate>,
    visuals: BTreeMap<Coordinate, bool>,
    events: Vec<CircuitEvent>,
    conflicts: Vec<WireConflict>,
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Self {
        Circuit::with_config(name, SimulationConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: SimulationConfig) -> Self {
        Circuit {
            name: name.into(),
            config,
            grid: PinGrid::new(),
            wires: WireSet::new(),
            graph: ConnectivityGraph::new(),
            registry: IcPinRegistry::new(),
            gates: Vec::new(),
            next_gate_id: 1,
            next_input_id: 1,
            inputs: BTreeMap::new(),
            outputs: BTreeSet::new(),
            visuals: BTreeMap::new(),
            events: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &PinGrid {
        &self.grid
    }

    pub fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    pub fn registry(&self) -> &IcPinRegistry {
        &self.registry
    }

    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.wires.iter()
    }

    /// Placed ICs in placement (and evaluation) order
    pub fn gates(&self) -> impl Iterator<Item = (GateId, &Gate)> {
        self.gates.iter().map(|(id, gate)| (*id, gate))
    }

    pub fn inputs(&self) -> impl Iterator<Item = (Coordinate, &str)> {
        self.inputs.iter().map(|(c, name)| (*c, name.as_str()))
    }

    pub fn outputs(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.outputs.iter().copied()
    }

    /// Conflicts found by the most recent rescan
    pub fn conflicts(&self) -> &[WireConflict] {
        &self.conflicts
    }

    fn resolver(&self) -> SignalResolver {
        SignalResolver {
            output_marker_drives_high: self.config.output_marker_drives_high,
        }
    }

    fn check_free(&self, coord: Coordinate) -> Result<(), CircuitError> {
        let attr = self
            .grid
            .attribute(coord)
            .ok_or(CircuitError::OutOfBounds(coord))?;
        if attr.is_wired() {
            return Err(CircuitError::PlacementConflict(coord, "pin is wired"));
        }
        if attr.state != PinState::Empty {
            return Err(CircuitError::PlacementConflict(coord, "pin is occupied"));
        }
        Ok(())
    }

    pub fn place_component(
        &mut self,
        coord: Coordinate,
        kind: ComponentKind,
    ) -> Result<(), CircuitError> {
        if kind == ComponentKind::Input {
            let name = format!("IN{}", self.next_input_id);
            self.place_named_input(name, coord)?;
            self.next_input_id += 1;
            return Ok(());
        }

        self.check_free(coord)?;
        self.grid.set_state(coord, kind.initial_state());
        if kind == ComponentKind::Output {
            self.outputs.insert(coord);
        }
        debug!("Placed {} at {}", kind, coord);
        self.refresh();
        Ok(())
    }

    /// Inputs always start Low
    pub fn place_named_input(
        &mut self,
        name: impl Into<String>,
        coord: Coordinate,
    ) -> Result<(), CircuitError> {
        self.check_free(coord)?;
        let name = name.into();
        self.grid.set_state(coord, ComponentKind::Input.initial_state());
        debug!("Placed input '{}' at {}", name, coord);
        self.inputs.insert(coord, name);
        self.refresh();
        Ok(())
    }

    /// Place a 14-pin package with pin 1 at `anchor`
    pub fn place_ic(&mut self, anchor: Coordinate, kind: GateKind) -> Result<GateId, CircuitError> {
        if !anchor.is_in_bounds() {
            return Err(CircuitError::OutOfBounds(anchor));
        }
        if anchor.section != LOWER_SECTION || anchor.row != LOWER_ROW {
            return Err(CircuitError::InvalidIcPosition {
                anchor,
                reason: "pin 1 must sit on row 0 of section 1",
            });
        }

        let gate = Gate::new(kind, anchor);
        let pins = gate.physical_pins().ok_or(CircuitError::InvalidIcPosition {
            anchor,
            reason: "not enough columns for 7 pins per side",
        })?;
        if pins.iter().any(|(_, c)| self.grid.is_occupied(*c)) {
            return Err(CircuitError::InvalidIcPosition {
                anchor,
                reason: "package pins are already in use",
            });
        }

        let id = GateId(self.next_gate_id);
        if !self.registry.register_ic(&mut self.grid, id, &gate) {
            return Err(CircuitError::InvalidIcPosition {
                anchor,
                reason: "package does not fit on the board",
            });
        }
        self.next_gate_id += 1;
        self.gates.push((id, gate));
        self.refresh();
        Ok(id)
    }

    pub fn remove_ic(&mut self, id: GateId) -> Result<(), CircuitError> {
        let position = self
            .gates
            .iter()
            .position(|(gid, _)| *gid == id)
            .ok_or(CircuitError::UnknownGate(id))?;

        if let Some(pins) = self.registry.pins_of(id) {
            let pins = pins.to_vec();
            let dropped = self.wires.disconnect_all(&pins);
            if !dropped.is_empty() {
                debug!("Dropped {} wires attached to {}", dropped.len(), id);
            }
        }
        self.registry.unregister(&mut self.grid, id);
        let (_, gate) = self.gates.remove(position);
        debug!("Removed {} {}", gate.kind, id);

        self.wires.relabel(&mut self.grid);
        self.refresh();
        Ok(())
    }

    /// Clear whatever sits at `coord`. Any pin of an IC removes the whole
    /// package; wires ending on removed pins go with them.
    pub fn remove_component(&mut self, coord: Coordinate) -> Result<(), CircuitError> {
        let attr = *self
            .grid
            .attribute(coord)
            .ok_or(CircuitError::OutOfBounds(coord))?;

        if let Some(info) = self.registry.info(coord) {
            let owner = info.owner;
            return self.remove_ic(owner);
        }
        if !attr.is_occupied() {
            return Err(CircuitError::NothingPlaced(coord));
        }

        self.wires.disconnect_all(&[coord]);
        self.grid.reset(coord);
        self.inputs.remove(&coord);
        self.outputs.remove(&coord);
        self.visuals.remove(&coord);
        debug!("Cleared {}", coord);

        self.wires.relabel(&mut self.grid);
        self.refresh();
        Ok(())
    }

    pub fn add_wire(&mut self, a: Coordinate, b: Coordinate) -> Result<(), CircuitError> {
        for end in [a, b] {
            if self.registry.is_ic_pin(end) {
                return Err(CircuitError::WireOnIcPin(end));
            }
        }
        self.wires.connect(a, b)?;
        self.wires.relabel(&mut self.grid);
        debug!("Wired {} -> {}", a, b);
        self.refresh();
        Ok(())
    }

    pub fn remove_wire(&mut self, a: Coordinate, b: Coordinate) -> Result<(), CircuitError> {
        self.wires.disconnect(a, b)?;
        self.wires.relabel(&mut self.grid);
        debug!("Unwired {} -> {}", a, b);
        self.refresh();
        Ok(())
    }

    /// Flip an input part, returning its new value
    pub fn toggle_input(&mut self, coord: Coordinate) -> Result<u8, CircuitError> {
        let current = self.input_value(coord)?;
        self.set_input(coord, current == 0)
    }

    pub fn set_input(&mut self, coord: Coordinate, high: bool) -> Result<u8, CircuitError> {
        self.input_value(coord)?;
        let state = PinState::from_bool(high);
        self.grid.set_state(coord, state);
        debug!("Input {} set {}", coord, state);
        self.refresh();
        Ok(high as u8)
    }

    fn input_value(&self, coord: Coordinate) -> Result<u8, CircuitError> {
        if !coord.is_in_bounds() {
            return Err(CircuitError::OutOfBounds(coord));
        }
        if !self.inputs.contains_key(&coord) {
            return Err(CircuitError::NotAnInput(coord));
        }
        Ok(self
            .grid
            .state(coord)
            .and_then(|s| s.resolve())
            .unwrap_or(0))
    }

    fn rebuild(&mut self) {
        let resolver = self.resolver();
        self.graph = ConnectivityGraph::build(&self.grid, &self.wires);
        self.conflicts = propagation::rescan_all(&mut self.grid, &self.graph, resolver);
    }

    fn refresh(&mut self) {
        self.rebuild();
        self.refresh_visuals();
    }

    /// Re-read every OUTPUT part and queue events for the ones that changed
    fn refresh_visuals(&mut self) -> Vec<VisualStateChange> {
        let mut changes = Vec::new();
        for coord in &self.outputs {
            let on = self.registry.output_value(&self.grid, *coord) == 1;
            let previous = self.visuals.insert(*coord, on).unwrap_or(false);
            if previous != on {
                changes.push(VisualStateChange {
                    coordinate: *coord,
                    on,
                });
            }
        }
        self.events
            .extend(changes.iter().copied().map(CircuitEvent::VisualStateChanged));
        changes
    }

    /// Drain the queued events
    pub fn take_events(&mut self) -> Vec<CircuitEvent> {
        std::mem::take(&mut self.events)
    }

    /// One simulation pass
    pub fn run(&mut self) -> RunReport {
        self.rebuild();
        let resolver = self.resolver();

        if self.config.warn_unpowered_ics {
            self.warn_unpowered();
        }

        for (id, gate) in &self.gates {
            for index in 0..gate.kind.gate_count() {
                let inputs: Vec<u8> = gate
                    .kind
                    .input_pins(index)
                    .iter()
                    .map(|pin| {
                        self.registry
                            .coordinate_of(*id, *pin)
                            .map_or(0, |c| self.registry.pin_value(&self.grid, c))
                    })
                    .collect();
                let value = gate.kind.apply(&inputs);

                let output = gate
                    .kind
                    .output_pin(index)
                    .and_then(|pin| self.registry.coordinate_of(*id, pin));
                if let Some(coord) = output {
                    self.registry.set_output_value(&mut self.grid, coord, value);
                    propagation::propagate_from(&mut self.grid, &self.graph, coord, resolver);
                }
            }
        }

        self.conflicts = propagation::rescan_all(&mut self.grid, &self.graph, resolver);
        let changes = self.refresh_visuals();
        let lit_outputs = self
            .outputs
            .iter()
            .copied()
            .filter(|c| self.visuals.get(c).copied().unwrap_or(false))
            .collect();

        let summary = self.summary();
        info!("Ran circuit '{}': {}", self.name, summary);
        RunReport {
            summary,
            changes,
            conflicts: self.conflicts.clone(),
            lit_outputs,
        }
    }

    fn warn_unpowered(&self) {
        for (id, _) in &self.gates {
            let rail = |pin: u8| {
                self.registry
                    .coordinate_of(*id, pin)
                    .map(|c| {
                        self.grid
                            .column(c)
                            .any(|(_, attr)| attr.state.is_power())
                    })
                    .unwrap_or(false)
            };
            if !rail(VCC_PIN) || !rail(GND_PIN) {
                warn!("{} is missing a Vcc or Gnd connection", id);
            }
        }
    }

    /// Reading of the OUTPUT part at `coord`
    pub fn output_value(&self, coord: Coordinate) -> u8 {
        self.registry.output_value(&self.grid, coord)
    }

    pub fn visual_state(&self, coord: Coordinate) -> bool {
        self.output_value(coord) == 1
    }

    /// Own state read with this circuit's resolver, else the propagated value
    pub fn effective_value(&self, coord: Coordinate) -> Option<u8> {
        self.grid.effective_value_with(coord, self.resolver())
    }

    pub fn pin_value(&self, coord: Coordinate) -> u8 {
        self.registry.pin_value(&self.grid, coord)
    }

    /// Value on a logical pin of a placed IC
    pub fn ic_pin_value(&self, id: GateId, logical_pin: u8) -> Option<u8> {
        self.registry
            .coordinate_of(id, logical_pin)
            .map(|c| self.pin_value(c))
    }

    pub fn ic_pin_coordinate(&self, id: GateId, logical_pin: u8) -> Option<Coordinate> {
        self.registry.coordinate_of(id, logical_pin)
    }

    /// Logical pin number of an IC coordinate, with its owner
    pub fn ic_logical_pin(&self, coord: Coordinate) -> Option<(GateId, u8)> {
        let info = self.registry.info(coord)?;
        let (_, gate) = self.gates.iter().find(|(id, _)| *id == info.owner)?;
        ic::logical_pin(gate.anchor, coord).map(|pin| (info.owner, pin))
    }

    pub fn summary(&self) -> CircuitSummary {
        CircuitSummary {
            ic_count: self.gates.len(),
            input_count: self.inputs.len(),
            output_count: self.outputs.len(),
            power_pin_count: self.grid.count_state(PinState::Vcc)
                + self.grid.count_state(PinState::Gnd),
            wire_count: self.wires.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(section: u8, row: u8, column: u8) -> Coordinate {
        Coordinate::new(section, row, column)
    }

    #[test]
    fn test_output_next_to_vcc() {
        let mut circuit = Circuit::new("rail");
        circuit.place_component(c(0, 1, 10), ComponentKind::Vcc).unwrap();
        circuit.place_component(c(0, 3, 10), ComponentKind::Output).unwrap();
        assert_eq!(circuit.output_value(c(0, 3, 10)), 1);
        assert!(circuit.visual_state(c(0, 3, 10)));
    }

    #[test]
    fn test_placement_conflicts_leave_state_unchanged() {
        let mut circuit = Circuit::new("conflict");
        circuit.place_component(c(0, 0, 0), ComponentKind::Gnd).unwrap();
        let before = circuit.grid().clone();

        assert_eq!(
            circuit.place_component(c(0, 0, 0), ComponentKind::Vcc),
            Err(CircuitError::PlacementConflict(c(0, 0, 0), "pin is occupied"))
        );
        assert_eq!(
            circuit.place_component(c(0, 0, 64), ComponentKind::Vcc),
            Err(CircuitError::OutOfBounds(c(0, 0, 64)))
        );

        circuit.add_wire(c(0, 2, 3), c(1, 2, 3)).unwrap();
        let wired = circuit.place_component(c(0, 2, 3), ComponentKind::Output);
        assert_eq!(wired.map_err(|e| e.reason_tag()), Err("placement_conflict"));
        assert_eq!(circuit.grid().state(c(0, 0, 0)), before.state(c(0, 0, 0)));
        assert_eq!(circuit.summary().output_count, 0);
    }

    #[test]
    fn test_ic_position_rules() {
        let mut circuit = Circuit::new("ics");
        let err = circuit.place_ic(c(0, 0, 10), GateKind::And).unwrap_err();
        assert_eq!(err.reason_tag(), "invalid_ic_position");

        let err = circuit.place_ic(c(1, 0, 60), GateKind::And).unwrap_err();
        assert_eq!(err.reason_tag(), "invalid_ic_position");

        circuit.place_component(c(0, 4, 13), ComponentKind::Vcc).unwrap();
        let err = circuit.place_ic(c(1, 0, 10), GateKind::And).unwrap_err();
        assert_eq!(err.reason_tag(), "invalid_ic_position");
        assert_eq!(circuit.summary().ic_count, 0);
        assert!(!circuit.registry().is_ic_pin(c(1, 0, 10)));

        let id = circuit.place_ic(c(1, 0, 20), GateKind::Or).unwrap();
        assert_eq!(circuit.ic_logical_pin(c(0, 4, 26)), Some((id, 8)));
    }

    #[test]
    fn test_and_gate_evaluation() {
        let mut circuit = Circuit::new("and");
        let id = circuit.place_ic(c(1, 0, 10), GateKind::And).unwrap();
        circuit.place_component(c(1, 2, 10), ComponentKind::Vcc).unwrap();
        circuit.place_component(c(1, 2, 11), ComponentKind::Vcc).unwrap();

        assert_eq!(circuit.ic_pin_value(id, 3), Some(0));
        circuit.run();
        assert_eq!(circuit.ic_pin_value(id, 3), Some(1));
        assert_eq!(circuit.pin_value(c(1, 0, 12)), 1);
    }

    #[test]
    fn test_toggle_input_emits_visual_events() {
        let mut circuit = Circuit::new("toggle");
        let input = c(0, 0, 4);
        let led = c(0, 3, 4);
        circuit.place_named_input("A", input).unwrap();
        circuit.place_component(led, ComponentKind::Output).unwrap();
        assert!(circuit.take_events().is_empty());

        assert_eq!(circuit.toggle_input(input), Ok(1));
        assert_eq!(
            circuit.take_events(),
            vec![CircuitEvent::VisualStateChanged(VisualStateChange {
                coordinate: led,
                on: true
            })]
        );

        circuit.run();
        assert!(circuit.take_events().is_empty());

        assert_eq!(circuit.toggle_input(input), Ok(0));
        assert_eq!(circuit.take_events().len(), 1);
        assert_eq!(circuit.toggle_input(led), Err(CircuitError::NotAnInput(led)));
    }

    #[test]
    fn test_remove_ic_from_any_pin() {
        let mut circuit = Circuit::new("remove");
        circuit.place_ic(c(1, 0, 30), GateKind::Not).unwrap();
        circuit.add_wire(c(1, 3, 31), c(0, 0, 50)).unwrap();
        circuit.remove_component(c(0, 4, 33)).unwrap();

        assert_eq!(circuit.summary().ic_count, 0);
        assert_eq!(circuit.grid().count_state(PinState::IcMarker), 0);
        assert_eq!(circuit.summary().wire_count, 1);
        assert_eq!(
            circuit.remove_component(c(1, 0, 30)),
            Err(CircuitError::NothingPlaced(c(1, 0, 30)))
        );
    }

    #[test]
    fn test_wire_to_ic_pin_rejected() {
        let mut circuit = Circuit::new("wire");
        circuit.place_ic(c(1, 0, 0), GateKind::Nand).unwrap();
        assert_eq!(
            circuit.add_wire(c(1, 0, 0), c(0, 0, 40)),
            Err(CircuitError::WireOnIcPin(c(1, 0, 0)))
        );
        assert_eq!(circuit.summary().wire_count, 0);
    }

    #[test]
    fn test_remove_wire_clears_signal() {
        let mut circuit = Circuit::new("unwire");
        let input = c(0, 0, 2);
        let far_led = c(1, 3, 40);
        circuit.place_named_input("A", input).unwrap();
        circuit.place_component(far_led, ComponentKind::Output).unwrap();
        circuit.add_wire(c(0, 1, 2), c(1, 1, 40)).unwrap();
        circuit.set_input(input, true).unwrap();
        assert!(circuit.visual_state(far_led));

        circuit.remove_wire(c(1, 1, 40), c(0, 1, 2)).unwrap();
        assert!(!circuit.visual_state(far_led));
        assert_eq!(circuit.grid().link(c(0, 1, 2)), None);
        assert_eq!(
            circuit.remove_wire(c(0, 1, 2), c(1, 1, 40)),
            Err(CircuitError::UnknownWire(c(0, 1, 2), c(1, 1, 40)))
        );
    }

    #[test]
    fn test_default_input_names_not_reused() {
        let mut circuit = Circuit::new("names");
        circuit.place_component(c(0, 0, 1), ComponentKind::Input).unwrap();
        circuit.place_component(c(0, 0, 2), ComponentKind::Input).unwrap();
        circuit.remove_component(c(0, 0, 1)).unwrap();
        circuit.place_component(c(0, 0, 3), ComponentKind::Input).unwrap();
        assert!(circuit.place_component(c(0, 0, 3), ComponentKind::Input).is_err());
        circuit.place_component(c(0, 0, 4), ComponentKind::Input).unwrap();

        let names: Vec<&str> = circuit.inputs().map(|(_, name)| name).collect();
        assert_eq!(names, vec!["IN2", "IN3", "IN4"]);
    }

    #[test]
    fn test_summary_counts() {
        let mut circuit = Circuit::new("summary");
        circuit.place_ic(c(1, 0, 10), GateKind::Xor).unwrap();
        circuit.place_component(c(0, 0, 1), ComponentKind::Vcc).unwrap();
        circuit.place_component(c(1, 4, 1), ComponentKind::Gnd).unwrap();
        circuit.place_component(c(0, 2, 1), ComponentKind::Input).unwrap();
        circuit.place_component(c(0, 2, 60), ComponentKind::Output).unwrap();

        let report = circuit.run();
        assert_eq!(
            report.summary,
            CircuitSummary {
                ic_count: 1,
                input_count: 1,
                output_count: 1,
                power_pin_count: 2,
                wire_count: 0,
            }
        );
        assert_eq!(circuit.inputs().next(), Some((c(0, 2, 1), "IN1")));
    }
}
