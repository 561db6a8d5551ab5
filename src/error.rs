use thiserror::Error;

use crate::types::{Coordinate, GateId};

/// Rejected circuit edits. The circuit is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    #[error("placement conflict at {0}: {1}")]
    PlacementConflict(Coordinate, &'static str),

    #[error("invalid IC position at {anchor}: {reason}")]
    InvalidIcPosition {
        anchor: Coordinate,
        reason: &'static str,
    },

    #[error("coordinate {0} is outside the board")]
    OutOfBounds(Coordinate),

    #[error("wire {0} -> {1} joins pins that are already connected")]
    RedundantWire(Coordinate, Coordinate),

    #[error("wire {0} -> {1} already exists")]
    DuplicateWire(Coordinate, Coordinate),

    #[error("wire cannot end on IC pin {0}")]
    WireOnIcPin(Coordinate),

    #[error("no wire between {0} and {1}")]
    UnknownWire(Coordinate, Coordinate),

    #[error("no input component at {0}")]
    NotAnInput(Coordinate),

    #[error("nothing placed at {0}")]
    NothingPlaced(Coordinate),

    #[error("unknown IC {0}")]
    UnknownGate(GateId),
}

impl CircuitError {
    /// Classified reason reported to the UI layer
    pub fn reason_tag(&self) -> &'static str {
        match self {
            CircuitError::PlacementConflict(..) => "placement_conflict",
            CircuitError::InvalidIcPosition { .. } => "invalid_ic_position",
            CircuitError::OutOfBounds(_) => "out_of_bounds",
            CircuitError::RedundantWire(..) => "redundant_wire",
            CircuitError::DuplicateWire(..) => "duplicate_wire",
            CircuitError::WireOnIcPin(_) => "wire_on_ic_pin",
            CircuitError::UnknownWire(..) => "unknown_wire",
            CircuitError::NotAnInput(_) => "not_an_input",
            CircuitError::NothingPlaced(_) => "nothing_placed",
            CircuitError::UnknownGate(_) => "unknown_gate",
        }
    }
}

/// Persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed circuit file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no saved circuit named '{0}'")]
    UnknownCircuit(String),

    #[error("saved circuit could not be rebuilt: {0}")]
    Rehydrate(#[from] CircuitError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_tags() {
        let c = Coordinate::new(0, 0, 0);
        assert_eq!(
            CircuitError::PlacementConflict(c, "occupied").reason_tag(),
            "placement_conflict"
        );
        assert_eq!(CircuitError::OutOfBounds(c).reason_tag(), "out_of_bounds");
        assert_eq!(
            CircuitError::InvalidIcPosition {
                anchor: c,
                reason: "wrong row"
            }
            .reason_tag(),
            "invalid_ic_position"
        );
        assert_eq!(CircuitError::WireOnIcPin(c).reason_tag(), "wire_on_ic_pin");
    }

    #[test]
    fn test_messages() {
        let err = CircuitError::OutOfBounds(Coordinate::new(0, 0, 64));
        assert_eq!(err.to_string(), "coordinate (0,0,64) is outside the board");

        let err = StoreError::UnknownCircuit("adder".to_string());
        assert_eq!(err.to_string(), "no saved circuit named 'adder'");
    }
}
