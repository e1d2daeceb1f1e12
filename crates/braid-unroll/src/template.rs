//! Gate definitions: signatures and decomposition templates.

use std::fmt;

use braid_ir::Circuit;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Identifies a gate definition: same name, different arity, different gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateSignature {
    /// The gate name.
    pub name: String,
    /// Declared arity of the gate.
    pub num_qubits: u32,
}

impl GateSignature {
    /// Create a new gate signature.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
        }
    }
}

impl fmt::Display for GateSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.num_qubits)
    }
}

/// A decomposition body for one gate signature.
///
/// The body is an ordinary [`Circuit`] over formal wires: a single quantum
/// register whose qubits `QubitId(0..n)` stand for the gate's arguments in
/// order. Gate parameters inside the body reference the formal names in
/// `params` symbolically; the unroller substitutes the actual argument
/// expressions when the template is expanded.
#[derive(Debug, Clone)]
pub struct GateTemplate {
    /// Formal parameter names, in declaration order.
    pub params: Vec<String>,
    /// The decomposition body over formal wires.
    pub body: Circuit,
}

impl GateTemplate {
    /// Create a template with no parameters.
    pub fn new(body: Circuit) -> Self {
        Self {
            params: vec![],
            body,
        }
    }

    /// Create a template with formal parameter names.
    pub fn with_params(params: impl IntoIterator<Item = impl Into<String>>, body: Circuit) -> Self {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            body,
        }
    }
}

/// Explicit mapping from gate signatures to their decomposition bodies.
///
/// The table is plain configuration data handed to the unroller; there is no
/// global registry.
#[derive(Debug, Clone, Default)]
pub struct DecompositionTable {
    definitions: FxHashMap<GateSignature, GateTemplate>,
}

impl DecompositionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, replacing any previous one for the signature.
    pub fn insert(&mut self, signature: GateSignature, template: GateTemplate) {
        self.definitions.insert(signature, template);
    }

    /// Look up the definition for a signature.
    pub fn get(&self, signature: &GateSignature) -> Option<&GateTemplate> {
        self.definitions.get(signature)
    }

    /// Check if a signature has a definition.
    pub fn contains(&self, signature: &GateSignature) -> bool {
        self.definitions.contains_key(signature)
    }

    /// Number of definitions in the table.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
