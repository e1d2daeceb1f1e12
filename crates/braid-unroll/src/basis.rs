//! Target basis gate sets.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// The set of gate names the target accepts as primitives.
///
/// Membership is by name only; arity disambiguation happens in the
/// decomposition table, not here. Measurement, reset and barrier are always
/// primitive and never listed in the basis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasisGates {
    gates: FxHashSet<String>,
}

impl BasisGates {
    /// Create a new basis gate set.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a gate name is in the basis.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.contains(gate)
    }

    /// Number of gate names in the basis.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Check if the basis is empty.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Iterate over the gate names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.gates.iter().map(String::as_str)
    }
}
