//! Gate tables for the supported 14-pin logic packages.
//!
//! Every package puts Gnd on logical pin 7 and Vcc on pin 14. Two-input
//! packages carry four gates, the inverter carries six.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::registry::PinFunction;

pub const GND_PIN: u8 = 7;
pub const VCC_PIN: u8 = 14;

const TWO_INPUT_PINS: [[u8; 2]; 4] = [[1, 2], [4, 5], [8, 9], [11, 12]];
const TWO_INPUT_OUTPUTS: [u8; 4] = [3, 6, 10, 13];

const NOT_INPUTS: [[u8; 1]; 6] = [[1], [3], [5], [8], [10], [12]];
const NOT_OUTPUTS: [u8; 6] = [2, 4, 6, 9, 11, 13];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
    And,
    Or,
    Not,
    Nand,
    Nor,
    Xor,
}

impl GateKind {
    pub const ALL: [GateKind; 6] = [
        GateKind::And,
        GateKind::Or,
        GateKind::Not,
        GateKind::Nand,
        GateKind::Nor,
        GateKind::Xor,
    ];

    /// Gates per package
    pub fn gate_count(&self) -> usize {
        match self {
            GateKind::Not => NOT_OUTPUTS.len(),
            _ => TWO_INPUT_OUTPUTS.len(),
        }
    }

    /// Logical input pins of gate `index`, empty when out of range
    pub fn input_pins(&self, index: usize) -> &'static [u8] {
        match self {
            GateKind::Not => NOT_INPUTS.get(index).map_or(&[], |p| p.as_slice()),
            _ => TWO_INPUT_PINS.get(index).map_or(&[], |p| p.as_slice()),
        }
    }

    pub fn output_pin(&self, index: usize) -> Option<u8> {
        match self {
            GateKind::Not => NOT_OUTPUTS.get(index).copied(),
            _ => TWO_INPUT_OUTPUTS.get(index).copied(),
        }
    }

    pub fn pin_function(&self, logical_pin: u8) -> PinFunction {
        let outputs: &[u8] = match self {
            GateKind::Not => &NOT_OUTPUTS,
            _ => &TWO_INPUT_OUTPUTS,
        };
        match logical_pin {
            GND_PIN => PinFunction::Gnd,
            VCC_PIN => PinFunction::Vcc,
            pin if outputs.contains(&pin) => PinFunction::Output,
            _ => PinFunction::Input,
        }
    }

    /// Boolean function of one gate over 0/1 inputs
    pub fn apply(&self, inputs: &[u8]) -> u8 {
        let a = inputs.first().copied().unwrap_or(0) != 0;
        let b = inputs.get(1).copied().unwrap_or(0) != 0;
        let out = match self {
            GateKind::And => a & b,
            GateKind::Or => a | b,
            GateKind::Not => !a,
            GateKind::Nand => !(a & b),
            GateKind::Nor => !(a | b),
            GateKind::Xor => a ^ b,
        };
        out as u8
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Not => "NOT",
            GateKind::Nand => "NAND",
            GateKind::Nor => "NOR",
            GateKind::Xor => "XOR",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for GateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GateKind::ALL
            .iter()
            .find(|kind| kind.to_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown gate kind: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: [(u8, u8); 4] = [(0, 0), (0, 1), (1, 0), (1, 1)];

    fn table(kind: GateKind) -> Vec<u8> {
        PAIRS.iter().map(|(a, b)| kind.apply(&[*a, *b])).collect()
    }

    #[test]
    fn test_truth_tables() {
        assert_eq!(GateKind::Not.apply(&[1]), 0);
        assert_eq!(GateKind::Not.apply(&[0]), 1);
        assert_eq!(table(GateKind::And), vec![0, 0, 0, 1]);
        assert_eq!(table(GateKind::Or), vec![0, 1, 1, 1]);
        assert_eq!(table(GateKind::Nand), vec![1, 1, 1, 0]);
        assert_eq!(table(GateKind::Nor), vec![1, 0, 0, 0]);
        assert_eq!(table(GateKind::Xor), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_pin_tables() {
        assert_eq!(GateKind::And.gate_count(), 4);
        assert_eq!(GateKind::Not.gate_count(), 6);
        assert_eq!(GateKind::Nand.input_pins(2), &[8, 9]);
        assert_eq!(GateKind::Xor.output_pin(3), Some(13));
        assert_eq!(GateKind::Not.input_pins(5), &[12]);
        assert_eq!(GateKind::Not.output_pin(3), Some(9));
        assert_eq!(GateKind::Or.output_pin(4), None);
        assert!(GateKind::Or.input_pins(4).is_empty());
    }

    #[test]
    fn test_every_pin_has_one_role() {
        for kind in GateKind::ALL {
            let mut inputs = 0;
            let mut outputs = 0;
            for pin in 1..=14 {
                match kind.pin_function(pin) {
                    PinFunction::Input => inputs += 1,
                    PinFunction::Output => outputs += 1,
                    PinFunction::Vcc => assert_eq!(pin, VCC_PIN),
                    PinFunction::Gnd => assert_eq!(pin, GND_PIN),
                }
            }
            assert_eq!(outputs, kind.gate_count());
            assert_eq!(inputs + outputs, 12);

            let mapped: usize = (0..kind.gate_count())
                .map(|i| kind.input_pins(i).len())
                .sum();
            assert_eq!(mapped, inputs, "{} input map", kind);
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("nand".parse::<GateKind>(), Ok(GateKind::Nand));
        assert_eq!("XOR".parse::<GateKind>(), Ok(GateKind::Xor));
        assert!("latch".parse::<GateKind>().is_err());
    }
}
