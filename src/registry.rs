//! # IC Pin Registry
//!
//! Maps physical coordinates to the logical DIP pin and role they play for a
//! placed package. One registry belongs to one circuit; it is rebuilt from
//! scratch whenever a circuit is loaded.
//!
//! The registry also owns the column-scan rules used to read pins:
//!
//! - an IC output reads back the value the evaluator last wrote into it
//! - an IC input reads the first driving pin on its strip, skipping other IC
//!   pins: Vcc gives 1, Gnd gives 0, an input part gives its own value, a wired
//!   pin gives its propagated value
//! - any other pin reads its strip the same way, except that an IC output on
//!   the strip wins as soon as it is reached

use log::debug;
use std::collections::{BTreeMap, HashMap};

use crate::components::ic::Gate;
use crate::grid::PinGrid;
use crate::pin::PinState;
use crate::types::{Coordinate, GateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinFunction {
    Input,
    Output,
    Vcc,
    Gnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcPinInfo {
    pub function: PinFunction,
    pub owner: GateId,
    pub logical_pin: u8,
}

#[derive(Debug, Clone, Default)]
pub struct IcPinRegistry {
    pins: HashMap<Coordinate, IcPinInfo>,
    packages: BTreeMap<GateId, Vec<Coordinate>>,
}

impl IcPinRegistry {
    pub fn new() -> Self {
        IcPinRegistry::default()
    }

    /// Record all 14 pins of `gate` and mark them on the grid.
    ///
    /// Outputs start Low, every other pin holds the IC marker. Returns false
    /// without touching anything when a pin would fall outside the board.
    pub fn register_ic(&mut self, grid: &mut PinGrid, id: GateId, gate: &Gate) -> bool {
        let Some(pins) = gate.physical_pins() else {
            debug!("{} {} at {} does not fit on the board", gate.kind, id, gate.anchor);
            return false;
        };

        let mut coords = Vec::with_capacity(pins.len());
        for (logical_pin, coord) in pins {
            let function = gate.kind.pin_function(logical_pin);
            self.pins.insert(
                coord,
                IcPinInfo {
                    function,
                    owner: id,
                    logical_pin,
                },
            );
            let state = match function {
                PinFunction::Output => PinState::Low,
                _ => PinState::IcMarker,
            };
            grid.set_state(coord, state);
            coords.push(coord);
        }

        debug!("Registered {} {} at {}", gate.kind, id, gate.anchor);
        self.packages.insert(id, coords);
        true
    }

    /// Drop every entry of one package and reset its pins to Empty
    pub fn unregister(&mut self, grid: &mut PinGrid, id: GateId) -> Option<Vec<Coordinate>> {
        let coords = self.packages.remove(&id)?;
        for coord in &coords {
            self.pins.remove(coord);
            grid.reset(*coord);
        }
        debug!("Unregistered {}", id);
        Some(coords)
    }

    pub fn info(&self, coord: Coordinate) -> Option<&IcPinInfo> {
        self.pins.get(&coord)
    }

    pub fn is_ic_pin(&self, coord: Coordinate) -> bool {
        self.pins.contains_key(&coord)
    }

    pub fn pins_of(&self, id: GateId) -> Option<&[Coordinate]> {
        self.packages.get(&id).map(Vec::as_slice)
    }

    pub fn coordinate_of(&self, id: GateId, logical_pin: u8) -> Option<Coordinate> {
        self.packages.get(&id)?.iter().copied().find(|c| {
            self.pins
                .get(c)
                .map_or(false, |info| info.logical_pin == logical_pin)
        })
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Value a gate sees on `coord`, or the general strip reading for
    /// coordinates that are not IC pins
    pub fn pin_value(&self, grid: &PinGrid, coord: Coordinate) -> u8 {
        match self.info(coord) {
            Some(info) if info.function == PinFunction::Output => {
                grid.state(coord).and_then(|s| s.resolve()).unwrap_or(0)
            }
            Some(_) => self.scan_strip(grid, coord, false),
            None => self.scan_strip(grid, coord, true),
        }
    }

    /// Reading of an OUTPUT part at `coord`
    pub fn output_value(&self, grid: &PinGrid, coord: Coordinate) -> u8 {
        self.scan_strip(grid, coord, true)
    }

    fn scan_strip(&self, grid: &PinGrid, coord: Coordinate, ic_outputs_win: bool) -> u8 {
        for (other, attr) in grid.column(coord) {
            if other == coord {
                continue;
            }
            if let Some(info) = self.info(other) {
                if ic_outputs_win && info.function == PinFunction::Output {
                    return self.pin_value(grid, other);
                }
                continue;
            }
            if attr.state.is_marker() {
                continue;
            }
            match attr.state {
                PinState::Vcc => return 1,
                PinState::Gnd => return 0,
                PinState::Low | PinState::High => return attr.state.resolve().unwrap_or(0),
                _ => {
                    if let Some(value) = grid.signal(other) {
                        return value;
                    }
                }
            }
        }
        0
    }

    /// Store a gate result on its output pin and hand it to the wired pins
    /// and OUTPUT parts on the same strip. False if `coord` is not an IC
    /// output.
    pub fn set_output_value(&self, grid: &mut PinGrid, coord: Coordinate, value: u8) -> bool {
        match self.info(coord) {
            Some(info) if info.function == PinFunction::Output => {}
            _ => return false,
        }

        grid.set_state(coord, PinState::from_bool(value != 0));

        let targets: Vec<Coordinate> = grid
            .column(coord)
            .filter(|(other, attr)| {
                *other != coord
                    && !self.is_ic_pin(*other)
                    && (attr.is_wired() || attr.state == PinState::OutputMarker)
            })
            .map(|(other, _)| other)
            .collect();
        for target in targets {
            grid.set_signal(target, Some(value));
        }
        true
    }
}
