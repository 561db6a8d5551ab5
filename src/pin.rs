use crate::types::NetId;
use std::fmt;

/// Raw state held by one pin slot.
///
/// Legacy integer encoding: Empty=-1, Low=0, High=1, Vcc=1, Gnd=-2,
/// OutputMarker=2, IcMarker=-3. `Vcc` and `High` share 1, so the integer form
/// alone cannot tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PinState {
    #[default]
    Empty,
    Low,
    High,
    Vcc,
    Gnd,
    OutputMarker,
    IcMarker,
}

/// How raw pin states are read as signals.
///
/// `output_marker_drives_high` reproduces the legacy helper that read an
/// OutputMarker (integer 2) as High. Off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalResolver {
    pub output_marker_drives_high: bool,
}

impl PinState {
    pub fn to_legacy(&self) -> i8 {
        match self {
            PinState::Empty => -1,
            PinState::Low => 0,
            PinState::High => 1,
            PinState::Vcc => 1,
            PinState::Gnd => -2,
            PinState::OutputMarker => 2,
            PinState::IcMarker => -3,
        }
    }

    /// `1` always decodes to `High`
    pub fn from_legacy(value: i8) -> Option<Self> {
        match value {
            -1 => Some(PinState::Empty),
            0 => Some(PinState::Low),
            1 => Some(PinState::High),
            -2 => Some(PinState::Gnd),
            2 => Some(PinState::OutputMarker),
            -3 => Some(PinState::IcMarker),
            _ => None,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            PinState::High
        } else {
            PinState::Low
        }
    }

    /// 1 for High/Vcc, 0 for Low/Gnd, no signal otherwise
    pub fn resolve(&self) -> Option<u8> {
        match self {
            PinState::High | PinState::Vcc => Some(1),
            PinState::Low | PinState::Gnd => Some(0),
            PinState::Empty | PinState::OutputMarker | PinState::IcMarker => None,
        }
    }

    pub fn resolve_with(&self, resolver: SignalResolver) -> Option<u8> {
        match self {
            PinState::OutputMarker if resolver.output_marker_drives_high => Some(1),
            other => other.resolve(),
        }
    }

    /// States that start a flood during a full rescan
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            PinState::Vcc | PinState::Gnd | PinState::Low | PinState::High | PinState::OutputMarker
        )
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, PinState::OutputMarker | PinState::IcMarker)
    }

    pub fn is_power(&self) -> bool {
        matches!(self, PinState::Vcc | PinState::Gnd)
    }

    pub fn to_char(&self) -> char {
        match self {
            PinState::Empty => '.',
            PinState::Low => '0',
            PinState::High => '1',
            PinState::Vcc => '+',
            PinState::Gnd => '-',
            PinState::OutputMarker => 'o',
            PinState::IcMarker => '#',
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            PinState::Empty => "Empty",
            PinState::Low => "Low",
            PinState::High => "High",
            PinState::Vcc => "Vcc",
            PinState::Gnd => "Gnd",
            PinState::OutputMarker => "Output",
            PinState::IcMarker => "IC",
        }
    }
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Per-slot record: the wire net it belongs to and its raw state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attribute {
    pub link: Option<NetId>,
    pub state: PinState,
}

impl Attribute {
    /// Holds a component or a wire end
    pub fn is_occupied(&self) -> bool {
        self.state != PinState::Empty || self.link.is_some()
    }

    pub fn is_wired(&self) -> bool {
        self.link.is_some()
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.link {
            Some(net) => write!(f, "{} [{}]", self.state, net),
            None => write!(f, "{}", self.state),
        }
    }
}
