//! DIP-14 placement arithmetic.
//!
//! Pin 1 sits at the anchor column on row 0 of section 1, pins 1..7 run left
//! to right along that row. Pins 8..14 run right to left along row 4 of
//! section 0, so pin 14 sits directly across the gap from pin 1.

use serde::{Deserialize, Serialize};

use super::gates::GateKind;
use crate::types::Coordinate;

pub const DIP_PINS: u8 = 14;
pub const PINS_PER_SIDE: u8 = DIP_PINS / 2;

/// Section and row that carry pins 1..7
pub const LOWER_SECTION: u8 = 1;
pub const LOWER_ROW: u8 = 0;
/// Section and row that carry pins 8..14
pub const UPPER_SECTION: u8 = 0;
pub const UPPER_ROW: u8 = 4;

/// One placed logic package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    pub kind: GateKind,
    pub anchor: Coordinate,
}

impl Gate {
    pub fn new(kind: GateKind, anchor: Coordinate) -> Self {
        Gate { kind, anchor }
    }

    /// All 14 pins as (logical, physical), `None` if any leaves the board
    pub fn physical_pins(&self) -> Option<Vec<(u8, Coordinate)>> {
        (1..=DIP_PINS)
            .map(|pin| physical_pin(self.anchor, pin).map(|c| (pin, c)))
            .collect()
    }
}

/// Grid coordinate of `logical_pin` for a package anchored at `anchor`
pub fn physical_pin(anchor: Coordinate, logical_pin: u8) -> Option<Coordinate> {
    let coord = match logical_pin {
        1..=7 => Coordinate::new(
            LOWER_SECTION,
            LOWER_ROW,
            anchor.column.checked_add(logical_pin - 1)?,
        ),
        8..=14 => Coordinate::new(
            UPPER_SECTION,
            UPPER_ROW,
            anchor.column.checked_add(DIP_PINS - logical_pin)?,
        ),
        _ => return None,
    };
    coord.is_in_bounds().then_some(coord)
}

/// Inverse of [`physical_pin`]
pub fn logical_pin(anchor: Coordinate, coord: Coordinate) -> Option<u8> {
    let offset = coord.column.checked_sub(anchor.column)?;
    if offset >= PINS_PER_SIDE || !coord.is_in_bounds() {
        return None;
    }
    match (coord.section, coord.row) {
        (LOWER_SECTION, LOWER_ROW) => Some(offset + 1),
        (UPPER_SECTION, UPPER_ROW) => Some(DIP_PINS - offset),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dip_mapping_at_column_ten() {
        let anchor = Coordinate::new(1, 0, 10);
        assert_eq!(physical_pin(anchor, 1), Some(Coordinate::new(1, 0, 10)));
        assert_eq!(physical_pin(anchor, 7), Some(Coordinate::new(1, 0, 16)));
        assert_eq!(physical_pin(anchor, 8), Some(Coordinate::new(0, 4, 16)));
        assert_eq!(physical_pin(anchor, 14), Some(Coordinate::new(0, 4, 10)));
        assert_eq!(physical_pin(anchor, 0), None);
        assert_eq!(physical_pin(anchor, 15), None);
    }

    #[test]
    fn test_dip_mapping_is_bijective() {
        let anchor = Coordinate::new(1, 0, 10);
        let gate = Gate::new(GateKind::And, anchor);
        let pins = gate.physical_pins().unwrap();
        assert_eq!(pins.len(), 14);
        for (logical, coord) in pins {
            assert_eq!(logical_pin(anchor, coord), Some(logical));
        }
        assert_eq!(logical_pin(anchor, Coordinate::new(1, 0, 17)), None);
        assert_eq!(logical_pin(anchor, Coordinate::new(1, 1, 10)), None);
        assert_eq!(logical_pin(anchor, Coordinate::new(0, 4, 9)), None);
    }

    #[test]
    fn test_package_off_the_edge() {
        let gate = Gate::new(GateKind::Not, Coordinate::new(1, 0, 58));
        assert!(gate.physical_pins().is_none());
        let gate = Gate::new(GateKind::Not, Coordinate::new(1, 0, 57));
        assert!(gate.physical_pins().is_some());
    }
}
