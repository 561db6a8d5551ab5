//! Text commands accepted by the console.
//!
//! Coordinates are written as `section row column`, separated by spaces or
//! commas: `wire 0 1 5 1,2,20`.

use thiserror::Error;

use crate::components::gates::GateKind;
use crate::components::ic::{LOWER_ROW, LOWER_SECTION};
use crate::components::ComponentKind;
use crate::session::Workbench;
use crate::store::CircuitId;
use crate::types::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Place(ComponentKind, Coordinate),
    Input(String, Coordinate),
    Ic(GateKind, Coordinate),
    Wire(Coordinate, Coordinate),
    Unwire(Coordinate, Coordinate),
    Toggle(Coordinate),
    Remove(Coordinate),
    Run,
    Save,
    Open(String),
    New(String),
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' expects {expected}")]
    Usage {
        command: &'static str,
        expected: &'static str,
    },
    #[error("'{0}' is not a number")]
    BadNumber(String),
    #[error("{0}")]
    BadKind(String),
}

pub const HELP: &[(&str, &str)] = &[
    ("place <input|output|vcc|gnd> s r c", "drop a part on a pin"),
    ("input <name> s r c", "drop a named input"),
    ("ic <and|or|not|nand|nor|xor> column", "place an IC with pin 1 at (1,0,column)"),
    ("wire s r c s r c", "join two pins"),
    ("unwire s r c s r c", "remove a wire"),
    ("toggle s r c", "flip an input"),
    ("remove s r c", "clear a pin (or a whole IC)"),
    ("run", "evaluate the circuit once"),
    ("save / open <id> / new <id> / list", "manage saved circuits"),
    ("help / quit", ""),
];

fn number(token: &str) -> Result<u8, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::BadNumber(token.to_string()))
}

fn coordinates(
    args: &[&str],
    count: usize,
    command: &'static str,
    expected: &'static str,
) -> Result<Vec<Coordinate>, CommandError> {
    if args.len() != count * 3 {
        return Err(CommandError::Usage { command, expected });
    }
    args.chunks(3)
        .map(|chunk| Ok(Coordinate::new(number(chunk[0])?, number(chunk[1])?, number(chunk[2])?)))
        .collect()
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let tokens: Vec<&str> = line
            .split(|ch: char| ch.is_whitespace() || ch == ',')
            .filter(|t| !t.is_empty())
            .collect();
        let (head, args) = tokens.split_first().ok_or(CommandError::Empty)?;

        let command = match head.to_ascii_lowercase().as_str() {
            "place" | "p" => {
                let (kind, rest) = args.split_first().ok_or(CommandError::Usage {
                    command: "place",
                    expected: "a part kind and a coordinate",
                })?;
                let kind = kind.parse().map_err(CommandError::BadKind)?;
                let coords = coordinates(rest, 1, "place", "a part kind and a coordinate")?;
                Command::Place(kind, coords[0])
            }
            "input" | "in" => {
                let (name, rest) = args.split_first().ok_or(CommandError::Usage {
                    command: "input",
                    expected: "a name and a coordinate",
                })?;
                let coords = coordinates(rest, 1, "input", "a name and a coordinate")?;
                Command::Input(name.to_string(), coords[0])
            }
            "ic" => match args {
                [kind, column] => Command::Ic(
                    kind.parse().map_err(CommandError::BadKind)?,
                    Coordinate::new(LOWER_SECTION, LOWER_ROW, number(column)?),
                ),
                _ => {
                    return Err(CommandError::Usage {
                        command: "ic",
                        expected: "a gate kind and a column",
                    })
                }
            },
            "wire" | "w" => {
                let coords = coordinates(args, 2, "wire", "two coordinates")?;
                Command::Wire(coords[0], coords[1])
            }
            "unwire" => {
                let coords = coordinates(args, 2, "unwire", "two coordinates")?;
                Command::Unwire(coords[0], coords[1])
            }
            "toggle" | "t" => Command::Toggle(coordinates(args, 1, "toggle", "a coordinate")?[0]),
            "remove" | "rm" => Command::Remove(coordinates(args, 1, "remove", "a coordinate")?[0]),
            "run" | "r" => Command::Run,
            "save" => Command::Save,
            "open" => match args {
                [id] => Command::Open(id.to_string()),
                _ => {
                    return Err(CommandError::Usage {
                        command: "open",
                        expected: "a circuit id",
                    })
                }
            },
            "new" => match args {
                [id] => Command::New(id.to_string()),
                _ => {
                    return Err(CommandError::Usage {
                        command: "new",
                        expected: "a circuit id",
                    })
                }
            },
            "list" | "ls" => Command::List,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// What the console should show after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub message: String,
    pub quit: bool,
    pub show_help: bool,
}

impl CommandOutcome {
    fn message(message: impl Into<String>) -> Self {
        CommandOutcome {
            message: message.into(),
            quit: false,
            show_help: false,
        }
    }
}

/// Apply one command to the active circuit
pub fn execute(workbench: &mut Workbench, command: Command) -> CommandOutcome {
    let result: Result<String, String> = match command {
        Command::Place(kind, coord) => workbench
            .with_circuit(|c| c.place_component(coord, kind))
            .map(|_| format!("Placed {} at {}", kind, coord))
            .map_err(|e| format!("[{}] {}", e.reason_tag(), e)),
        Command::Input(name, coord) => workbench
            .with_circuit(|c| c.place_named_input(name.clone(), coord))
            .map(|_| format!("Placed input '{}' at {}", name, coord))
            .map_err(|e| format!("[{}] {}", e.reason_tag(), e)),
        Command::Ic(kind, anchor) => workbench
            .with_circuit(|c| c.place_ic(anchor, kind))
            .map(|id| format!("Placed {} {} at {}", kind, id, anchor))
            .map_err(|e| format!("[{}] {}", e.reason_tag(), e)),
        Command::Wire(a, b) => workbench
            .with_circuit(|c| c.add_wire(a, b))
            .map(|_| format!("Wired {} -> {}", a, b))
            .map_err(|e| format!("[{}] {}", e.reason_tag(), e)),
        Command::Unwire(a, b) => workbench
            .with_circuit(|c| c.remove_wire(a, b))
            .map(|_| format!("Removed wire {} -> {}", a, b))
            .map_err(|e| format!("[{}] {}", e.reason_tag(), e)),
        Command::Toggle(coord) => workbench
            .with_circuit(|c| c.toggle_input(coord))
            .map(|v| format!("Input {} is now {}", coord, v))
            .map_err(|e| format!("[{}] {}", e.reason_tag(), e)),
        Command::Remove(coord) => workbench
            .with_circuit(|c| c.remove_component(coord))
            .map(|_| format!("Cleared {}", coord))
            .map_err(|e| format!("[{}] {}", e.reason_tag(), e)),
        Command::Run => {
            let report = workbench.with_circuit(|c| c.run());
            let mut message = format!("Ran: {}", report.summary);
            if !report.conflicts.is_empty() {
                message.push_str(&format!(" ({} conflicting pins)", report.conflicts.len()));
            }
            Ok(message)
        }
        Command::Save => workbench
            .save()
            .map(|_| format!("Saved '{}'", workbench.active_id()))
            .map_err(|e| e.to_string()),
        Command::Open(id) => workbench
            .open(CircuitId::new(id.clone()))
            .map(|_| format!("Opened '{}'", id))
            .map_err(|e| e.to_string()),
        Command::New(id) => {
            workbench.new_circuit(CircuitId::new(id.clone()));
            Ok(format!("Started '{}'", id))
        }
        Command::List => workbench
            .saved_circuits()
            .map(|ids| {
                let names: Vec<&str> = ids.iter().map(CircuitId::as_str).collect();
                format!("Saved circuits: {}", names.join(", "))
            })
            .map_err(|e| e.to_string()),
        Command::Help => {
            return CommandOutcome {
                show_help: true,
                ..CommandOutcome::message("")
            }
        }
        Command::Quit => {
            return CommandOutcome {
                quit: true,
                ..CommandOutcome::message("Bye")
            }
        }
    };

    match result {
        Ok(message) => CommandOutcome::message(message),
        Err(message) => CommandOutcome::message(format!("Rejected: {}", message)),
    }
}
