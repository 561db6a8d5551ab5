//! # Signal Propagation
//!
//! Flood-fill of a resolved value across the [`ConnectivityGraph`].
//!
//! A single [`propagate_from`] call overwrites whatever the visited pins held,
//! so between two sources the last call wins. [`rescan_all`] re-derives every
//! signal from scratch and, inside that one pass, settles disagreeing sources
//! on a shared pin with `max(value1, value2)`, reporting each such pin as a
//! [`WireConflict`].

use log::{debug, warn};

use crate::connection::ConnectivityGraph;
use crate::grid::PinGrid;
use crate::pin::SignalResolver;
use crate::types::{Coordinate, PIN_COUNT};

/// Two sources drove different values onto one pin during a rescan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireConflict {
    pub coordinate: Coordinate,
    pub values: (u8, u8),
    pub resolved: u8,
}

/// Flood `coord`'s own resolved value over its connected pins.
///
/// Returns the number of pins assigned; zero when `coord` carries no signal.
pub fn propagate_from(
    grid: &mut PinGrid,
    graph: &ConnectivityGraph,
    coord: Coordinate,
    resolver: SignalResolver,
) -> usize {
    let Some(value) = grid.state(coord).and_then(|s| s.resolve_with(resolver)) else {
        return 0;
    };

    let visited = graph.flood(coord);
    for node in &visited {
        grid.set_signal(*node, Some(value));
    }
    visited.len()
}

/// Clear every signal and propagate from each source pin in grid order
pub fn rescan_all(
    grid: &mut PinGrid,
    graph: &ConnectivityGraph,
    resolver: SignalResolver,
) -> Vec<WireConflict> {
    grid.clear_signals();

    let sources: Vec<(Coordinate, u8)> = grid
        .iter()
        .filter(|(_, attr)| attr.state.is_source())
        .filter_map(|(c, attr)| attr.state.resolve_with(resolver).map(|v| (c, v)))
        .collect();

    let mut owner: Vec<Option<Coordinate>> = vec![None; PIN_COUNT];
    let mut conflicts = Vec::new();

    for (source, value) in &sources {
        for node in graph.flood(*source) {
            let Some(index) = node.index() else {
                continue;
            };
            match (owner[index], grid.signal(node)) {
                (Some(previous), Some(existing)) if previous != *source && existing != *value => {
                    let resolved = existing.max(*value);
                    conflicts.push(WireConflict {
                        coordinate: node,
                        values: (existing, *value),
                        resolved,
                    });
                    grid.set_signal(node, Some(resolved));
                }
                _ => grid.set_signal(node, Some(*value)),
            }
            owner[index] = Some(*source);
        }
    }

    if !conflicts.is_empty() {
        warn!(
            "Rescan found {} conflicting pins, first at {}",
            conflicts.len(),
            conflicts[0].coordinate
        );
    }
    debug!("Rescanned {} signal sources", sources.len());
    conflicts
}
