//! Error types for the unrolling crate.

use braid_ir::IrError;
use thiserror::Error;

use crate::template::GateSignature;

/// Errors that can occur during gate unrolling.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UnrollError {
    /// A gate is neither in the basis nor in the decomposition table.
    #[error("gate '{name}' on {num_qubits} qubit(s) is not in the basis and has no definition")]
    UndefinedGate {
        /// The gate name.
        name: String,
        /// Declared arity of the gate.
        num_qubits: u32,
    },

    /// A gate definition expands, directly or through other definitions,
    /// into itself.
    #[error("gate definition for {signature} expands into itself")]
    RecursiveDefinition {
        /// The signature found on the expansion stack.
        signature: GateSignature,
    },

    /// A gate application carries a different number of parameters than its
    /// definition declares.
    #[error("gate '{name}' definition declares {expected} parameter(s), got {got}")]
    ParameterCountMismatch {
        /// The gate name.
        name: String,
        /// Parameter count declared by the definition.
        expected: usize,
        /// Parameter count of the application.
        got: usize,
    },

    /// A classical condition was attached to an operation the sink has no
    /// conditional event for.
    #[error("operation '{op_name}' cannot carry a classical condition")]
    UnsupportedCondition {
        /// Name of the conditioned operation.
        op_name: String,
    },

    /// An error surfaced from the circuit IR.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for unrolling operations.
pub type UnrollResult<T> = Result<T, UnrollError>;
