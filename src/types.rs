use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of independent pin fields (top and bottom of the IC gap)
pub const SECTIONS: u8 = 2;
/// Rows per section
pub const ROWS: u8 = 5;
/// Columns per section
pub const COLUMNS: u8 = 64;
/// Total number of pin slots on the board
pub const PIN_COUNT: usize = SECTIONS as usize * ROWS as usize * COLUMNS as usize;

/// Identity of one pin slot on the breadboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub section: u8,
    pub row: u8,
    pub column: u8,
}

impl Coordinate {
    pub const fn new(section: u8, row: u8, column: u8) -> Self {
        Coordinate {
            section,
            row,
            column,
        }
    }

    pub fn is_in_bounds(&self) -> bool {
        self.section < SECTIONS && self.row < ROWS && self.column < COLUMNS
    }

    /// Flat index into the pin grid, `None` when outside the board
    pub fn index(&self) -> Option<usize> {
        if !self.is_in_bounds() {
            return None;
        }
        Some(
            (self.section as usize * ROWS as usize + self.row as usize) * COLUMNS as usize
                + self.column as usize,
        )
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index >= PIN_COUNT {
            return None;
        }
        let column = (index % COLUMNS as usize) as u8;
        let row = ((index / COLUMNS as usize) % ROWS as usize) as u8;
        let section = (index / (COLUMNS as usize * ROWS as usize)) as u8;
        Some(Coordinate::new(section, row, column))
    }

    /// True when both pins sit on the same internal bus strip
    pub fn same_strip(&self, other: &Coordinate) -> bool {
        self.section == other.section && self.column == other.column
    }

    /// Every coordinate of this pin's strip in row order, itself included
    pub fn strip(&self) -> impl Iterator<Item = Coordinate> {
        let (section, column) = (self.section, self.column);
        (0..ROWS).map(move |row| Coordinate::new(section, row, column))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.section, self.row, self.column)
    }
}

impl From<(u8, u8, u8)> for Coordinate {
    fn from((section, row, column): (u8, u8, u8)) -> Self {
        Coordinate::new(section, row, column)
    }
}

/// Net formed by explicit wires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(pub u32);

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Placed IC package, unique within one circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GateId(pub u32);

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IC{}", self.0)
    }
}
