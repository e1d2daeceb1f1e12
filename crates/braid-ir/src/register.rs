//! Named registers grouping wires of a single kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of wires a register holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterKind {
    /// Quantum wires (qubits).
    Quantum,
    /// Classical wires (bits).
    Classical,
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterKind::Quantum => write!(f, "quantum"),
            RegisterKind::Classical => write!(f, "classical"),
        }
    }
}

/// A named, fixed-size, ordered group of wires of one kind.
///
/// Registers are created once and never removed; the register set of a
/// circuit is append-only. `first` is the dense wire id of the register's
/// index 0, so `(name, i)` resolves to wire id `first + i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// The register name, unique within a circuit.
    pub name: String,
    /// Whether the register holds quantum or classical wires.
    pub kind: RegisterKind,
    /// Number of wires, fixed at creation.
    pub size: u32,
    /// Dense wire id of index 0 within this register.
    pub first: u32,
}

impl Register {
    /// Create a new register record.
    pub fn new(name: impl Into<String>, kind: RegisterKind, size: u32, first: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            first,
        }
    }

    /// Check whether `index` addresses a wire of this register.
    #[inline]
    pub fn contains_index(&self, index: u32) -> bool {
        index < self.size
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.size)
    }
}
