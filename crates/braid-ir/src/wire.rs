//! Wire identifiers for quantum and classical storage slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a quantum wire within a circuit.
///
/// Ids are dense and allocated in register-creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Unique identifier for a classical wire within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// Identifier for a wire of either kind.
///
/// Every wire is a single classical or quantum storage slot tracked through
/// the DAG as a chain of nodes between its input and output terminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl WireId {
    /// Check if this is a quantum wire.
    #[inline]
    pub fn is_qubit(&self) -> bool {
        matches!(self, WireId::Qubit(_))
    }

    /// Check if this is a classical wire.
    #[inline]
    pub fn is_clbit(&self) -> bool {
        matches!(self, WireId::Clbit(_))
    }
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Qubit(q) => write!(f, "{q}"),
            WireId::Clbit(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_display() {
        assert_eq!(format!("{}", QubitId(3)), "q3");
        assert_eq!(format!("{}", WireId::Clbit(ClbitId(0))), "c0");
    }

    #[test]
    fn test_wire_kind() {
        assert!(WireId::from(QubitId(0)).is_qubit());
        assert!(WireId::from(ClbitId(0)).is_clbit());
    }
}
