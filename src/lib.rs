//! # Rusty Breadboard Library
//!
//! A virtual breadboard for simple digital-logic circuits.
//!
//! This library provides:
//! - A two-section, 5 x 64 pin grid with column-strip and wire connectivity
//! - Signal propagation from power rails, inputs and gate outputs
//! - 14-pin DIP gate ICs (AND, OR, NOT, NAND, NOR, XOR) with a per-circuit pin registry
//! - JSON circuit snapshots and a directory-backed circuit store
//! - A terminal console for building and running circuits

pub mod circuit;
pub mod command;
pub mod components;
pub mod config;
pub mod connection;
pub mod console;
pub mod error;
pub mod grid;
pub mod pin;
pub mod propagation;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod types;

// Re-export commonly used items for easier importing
pub use circuit::{Circuit, CircuitEvent, RunReport};
pub use components::gates::GateKind;
pub use components::ComponentKind;
pub use error::CircuitError;
pub use pin::PinState;
pub use types::Coordinate;
