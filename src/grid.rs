//! # Pin Grid
//!
//! The authoritative per-pin state store. Every consumer (propagator,
//! registry, evaluator) reads and writes pins through these accessors, which
//! all go through the bounds-checked [`Coordinate::index`].
//!
//! Besides the raw [`Attribute`] of each slot the grid keeps the last value a
//! propagation pass assigned to it. Reads outside the board return `None`,
//! writes outside the board are ignored.

use log::debug;

use crate::pin::{Attribute, PinState, SignalResolver};
use crate::types::{Coordinate, NetId, PIN_COUNT};

#[derive(Debug, Clone, PartialEq)]
pub struct PinGrid {
    attributes: Vec<Attribute>,
    signals: Vec<Option<u8>>,
}

impl PinGrid {
    pub fn new() -> Self {
        PinGrid {
            attributes: vec![Attribute::default(); PIN_COUNT],
            signals: vec![None; PIN_COUNT],
        }
    }

    pub fn attribute(&self, coord: Coordinate) -> Option<&Attribute> {
        coord.index().map(|i| &self.attributes[i])
    }

    pub fn state(&self, coord: Coordinate) -> Option<PinState> {
        self.attribute(coord).map(|attr| attr.state)
    }

    pub fn link(&self, coord: Coordinate) -> Option<NetId> {
        self.attribute(coord).and_then(|attr| attr.link)
    }

    pub fn set_state(&mut self, coord: Coordinate, state: PinState) {
        match coord.index() {
            Some(i) => self.attributes[i].state = state,
            None => debug!("Ignoring state write outside the board at {}", coord),
        }
    }

    pub fn set_link(&mut self, coord: Coordinate, link: Option<NetId>) {
        match coord.index() {
            Some(i) => self.attributes[i].link = link,
            None => debug!("Ignoring link write outside the board at {}", coord),
        }
    }

    /// Last value assigned by propagation
    pub fn signal(&self, coord: Coordinate) -> Option<u8> {
        coord.index().and_then(|i| self.signals[i])
    }

    pub fn set_signal(&mut self, coord: Coordinate, value: Option<u8>) {
        if let Some(i) = coord.index() {
            self.signals[i] = value;
        }
    }

    pub fn clear_signals(&mut self) {
        self.signals.iter_mut().for_each(|s| *s = None);
    }

    /// Own resolved state first, then the propagated value
    pub fn effective_value(&self, coord: Coordinate) -> Option<u8> {
        self.effective_value_with(coord, SignalResolver::default())
    }

    pub fn effective_value_with(&self, coord: Coordinate, resolver: SignalResolver) -> Option<u8> {
        let attr = self.attribute(coord)?;
        attr.state
            .resolve_with(resolver)
            .or_else(|| self.signal(coord))
    }

    pub fn is_occupied(&self, coord: Coordinate) -> bool {
        self.attribute(coord).map_or(false, Attribute::is_occupied)
    }

    /// Back to an empty, unwired slot
    pub fn reset(&mut self, coord: Coordinate) {
        if let Some(i) = coord.index() {
            self.attributes[i] = Attribute::default();
            self.signals[i] = None;
        }
    }

    /// The pins of one section+column strip in row order
    pub fn column(&self, coord: Coordinate) -> impl Iterator<Item = (Coordinate, &Attribute)> {
        coord
            .strip()
            .filter_map(move |c| self.attribute(c).map(|attr| (c, attr)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &Attribute)> {
        self.attributes
            .iter()
            .enumerate()
            .filter_map(|(i, attr)| Coordinate::from_index(i).map(|c| (c, attr)))
    }

    pub fn count_state(&self, state: PinState) -> usize {
        self.attributes.iter().filter(|a| a.state == state).count()
    }
}

impl Default for PinGrid {
    fn default() -> Self {
        PinGrid::new()
    }
}
