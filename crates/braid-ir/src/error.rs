//! Error types for the IR crate.

use crate::graph::NodeId;
use crate::wire::WireId;
use thiserror::Error;

/// Errors that can occur in IR operations.
///
/// All errors are reported synchronously to the caller of the mutation that
/// triggered them. Failing mutations leave the circuit unchanged; `compose`
/// in particular validates everything before touching the receiver.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A register with this name already exists.
    #[error("register '{name}' already exists")]
    DuplicateRegister {
        /// The conflicting register name.
        name: String,
    },

    /// An operation referenced a wire the circuit does not own.
    #[error("wire {wire} is not owned by the circuit{}", op_context(.op_name))]
    UnknownWire {
        /// The unknown wire.
        wire: WireId,
        /// Operation name for context, if known.
        op_name: Option<String>,
    },

    /// A condition or mapping referenced a register the circuit does not own.
    #[error("register '{name}' is not owned by the circuit")]
    UnknownRegister {
        /// The unknown register name.
        name: String,
    },

    /// Operation arity does not match its argument lists.
    #[error("operation '{op_name}' takes {expected} {kind} arguments, got {got}")]
    ArgumentCountMismatch {
        /// Name of the operation.
        op_name: String,
        /// Which argument list mismatched ("qubit" or "clbit").
        kind: &'static str,
        /// Declared arity.
        expected: u32,
        /// Number of arguments provided.
        got: u32,
    },

    /// The same wire appeared twice in one operation's arguments.
    #[error("duplicate wire {wire} in operation{}", op_context(.op_name))]
    DuplicateWire {
        /// The repeated wire.
        wire: WireId,
        /// Operation name for context, if known.
        op_name: Option<String>,
    },

    /// A node id does not reference a live operation node.
    #[error("node {0:?} does not reference a live node")]
    UnknownNode(NodeId),

    /// An edge insertion or removal would break the per-wire path structure.
    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    /// Input/output terminators are never individually removable.
    #[error("cannot remove terminator node for wire {wire}")]
    RemoveTerminator {
        /// The wire whose terminator was targeted.
        wire: WireId,
    },

    /// Registers or wires of incompatible kind or shape were paired up.
    #[error("register mismatch: {0}")]
    RegisterMismatch(String),

    /// A compose operand referenced a wire absent from the mapping.
    #[error("wire {wire} of the merged circuit is missing from the wire mapping")]
    UnmappedWire {
        /// The unmapped wire.
        wire: WireId,
    },
}

fn op_context(op_name: &Option<String>) -> String {
    match op_name {
        Some(name) => format!(" (op: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
