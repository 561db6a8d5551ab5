pub mod gates;
pub mod ic;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pin::PinState;

/// Single-pin parts the user can drop on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComponentKind {
    Input,
    Output,
    Vcc,
    Gnd,
}

impl ComponentKind {
    /// Pin state written when the part is placed
    pub fn initial_state(&self) -> PinState {
        match self {
            ComponentKind::Input => PinState::Low,
            ComponentKind::Output => PinState::OutputMarker,
            ComponentKind::Vcc => PinState::Vcc,
            ComponentKind::Gnd => PinState::Gnd,
        }
    }

    pub fn is_power(&self) -> bool {
        matches!(self, ComponentKind::Vcc | ComponentKind::Gnd)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Input => "INPUT",
            ComponentKind::Output => "OUTPUT",
            ComponentKind::Vcc => "VCC",
            ComponentKind::Gnd => "GND",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "input" | "in" => Ok(ComponentKind::Input),
            "output" | "out" | "led" => Ok(ComponentKind::Output),
            "vcc" | "power" => Ok(ComponentKind::Vcc),
            "gnd" | "ground" => Ok(ComponentKind::Gnd),
            _ => Err(format!("Unknown component kind: {}", s)),
        }
    }
}
