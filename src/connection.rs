use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::error::CircuitError;
use crate::grid::PinGrid;
use crate::types::{Coordinate, NetId, PIN_COUNT};

/// An explicit jumper between two pins. Endpoint order carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub a: Coordinate,
    pub b: Coordinate,
}

impl Wire {
    pub fn new(a: Coordinate, b: Coordinate) -> Self {
        Wire { a, b }
    }

    pub fn touches(&self, coord: Coordinate) -> bool {
        self.a == coord || self.b == coord
    }

    pub fn joins(&self, a: Coordinate, b: Coordinate) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }
}

/// Wires of one circuit in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireSet {
    wires: Vec<Wire>,
}

impl WireSet {
    pub fn new() -> Self {
        WireSet { wires: Vec::new() }
    }

    /// Validate and record a wire. Does not touch the grid; call
    /// [`WireSet::relabel`] afterwards.
    pub fn connect(&mut self, a: Coordinate, b: Coordinate) -> Result<Wire, CircuitError> {
        for end in [a, b] {
            if !end.is_in_bounds() {
                return Err(CircuitError::OutOfBounds(end));
            }
        }
        if a.same_strip(&b) {
            return Err(CircuitError::RedundantWire(a, b));
        }
        if self.contains(a, b) {
            return Err(CircuitError::DuplicateWire(a, b));
        }

        let wire = Wire::new(a, b);
        self.wires.push(wire);
        Ok(wire)
    }

    pub fn disconnect(&mut self, a: Coordinate, b: Coordinate) -> Result<Wire, CircuitError> {
        let position = self
            .wires
            .iter()
            .position(|w| w.joins(a, b))
            .ok_or(CircuitError::UnknownWire(a, b))?;
        Ok(self.wires.remove(position))
    }

    /// Drop every wire with an end on one of `coords`
    pub fn disconnect_all(&mut self, coords: &[Coordinate]) -> Vec<Wire> {
        let (removed, kept): (Vec<Wire>, Vec<Wire>) = self
            .wires
            .iter()
            .copied()
            .partition(|w| coords.iter().any(|c| w.touches(*c)));
        self.wires = kept;
        removed
    }

    pub fn contains(&self, a: Coordinate, b: Coordinate) -> bool {
        self.wires.iter().any(|w| w.joins(a, b))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wire> {
        self.wires.iter()
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    /// Re-derive every NetId from the current wires.
    ///
    /// Pins joined through any chain of wires share one NetId; pins no longer
    /// on a wire get their link cleared. Ids are numbered by first appearance
    /// in insertion order.
    pub fn relabel(&self, grid: &mut PinGrid) {
        let stale: Vec<Coordinate> = grid
            .iter()
            .filter(|(_, attr)| attr.is_wired())
            .map(|(c, _)| c)
            .collect();
        for coord in stale {
            grid.set_link(coord, None);
        }

        let mut parent: HashMap<Coordinate, Coordinate> = HashMap::new();
        fn find(parent: &mut HashMap<Coordinate, Coordinate>, c: Coordinate) -> Coordinate {
            let p = *parent.entry(c).or_insert(c);
            if p == c {
                return c;
            }
            let root = find(parent, p);
            parent.insert(c, root);
            root
        }

        for wire in &self.wires {
            let ra = find(&mut parent, wire.a);
            let rb = find(&mut parent, wire.b);
            if ra != rb {
                parent.insert(rb, ra);
            }
        }

        let mut ids: HashMap<Coordinate, NetId> = HashMap::new();
        for wire in &self.wires {
            for end in [wire.a, wire.b] {
                let root = find(&mut parent, end);
                let next = NetId(ids.len() as u32 + 1);
                let id = *ids.entry(root).or_insert(next);
                grid.set_link(end, Some(id));
            }
        }
        debug!("Relabelled {} wires into {} nets", self.wires.len(), ids.len());
    }
}

/// Undirected adjacency of electrically joined pins.
///
/// Edges come from explicit wires and from every pair of occupied pins on the
/// same section+column strip. Neighbour sets are sorted so two builds over the
/// same topology compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityGraph {
    adjacency: Vec<BTreeSet<usize>>,
}

impl ConnectivityGraph {
    pub fn new() -> Self {
        ConnectivityGraph {
            adjacency: vec![BTreeSet::new(); PIN_COUNT],
        }
    }

    pub fn build(grid: &PinGrid, wires: &WireSet) -> Self {
        let mut graph = ConnectivityGraph::new();

        for wire in wires.iter() {
            graph.connect_pins(wire.a, wire.b);
        }

        for (coord, _) in grid.iter().filter(|(c, _)| c.row == 0) {
            let occupied: Vec<Coordinate> = grid
                .column(coord)
                .filter(|(_, attr)| attr.is_occupied())
                .map(|(c, _)| c)
                .collect();
            for i in 0..occupied.len() {
                for j in i + 1..occupied.len() {
                    graph.connect_pins(occupied[i], occupied[j]);
                }
            }
        }

        debug!("Built connectivity graph with {} edges", graph.edge_count());
        graph
    }

    fn connect_pins(&mut self, a: Coordinate, b: Coordinate) {
        if let (Some(ia), Some(ib)) = (a.index(), b.index()) {
            if ia != ib {
                self.adjacency[ia].insert(ib);
                self.adjacency[ib].insert(ia);
            }
        }
    }

    pub fn neighbors(&self, coord: Coordinate) -> Vec<Coordinate> {
        coord
            .index()
            .map(|i| {
                self.adjacency[i]
                    .iter()
                    .filter_map(|n| Coordinate::from_index(*n))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Direct edge between the two pins
    pub fn are_connected(&self, a: Coordinate, b: Coordinate) -> bool {
        match (a.index(), b.index()) {
            (Some(ia), Some(ib)) => self.adjacency[ia].contains(&ib),
            _ => false,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Breadth-first visit order from `start`, `start` first
    pub fn flood(&self, start: Coordinate) -> Vec<Coordinate> {
        let Some(first) = start.index() else {
            return Vec::new();
        };

        let mut visited = vec![false; PIN_COUNT];
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        visited[first] = true;
        queue.push_back(first);

        while let Some(current) = queue.pop_front() {
            if let Some(coord) = Coordinate::from_index(current) {
                order.push(coord);
            }
            for &next in &self.adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        order
    }

    /// Groups of two or more mutually reachable pins
    pub fn groups(&self) -> Vec<Vec<Coordinate>> {
        let mut seen = vec![false; PIN_COUNT];
        let mut groups = Vec::new();

        for index in 0..PIN_COUNT {
            if seen[index] || self.adjacency[index].is_empty() {
                continue;
            }
            let Some(coord) = Coordinate::from_index(index) else {
                continue;
            };
            let group = self.flood(coord);
            for member in &group {
                if let Some(i) = member.index() {
                    seen[i] = true;
                }
            }
            groups.push(group);
        }

        groups
    }
}

impl Default for ConnectivityGraph {
    fn default() -> Self {
        ConnectivityGraph::new()
    }
}
