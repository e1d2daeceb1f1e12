//! The backend event sink trait.

use braid_ir::{ClassicalCondition, ClbitId, ParameterExpression, QubitId, Register};

/// Receiver for the unrolled instruction stream.
///
/// The unroller calls `start` once, then one event per primitive in the
/// deterministic topological schedule, then `end` once. Events are
/// infallible: sinks buffer or act eagerly, and any sink-side failure is the
/// sink's own concern.
///
/// Conditions are forwarded unevaluated; the core carries no classical
/// run-time state to evaluate them against.
pub trait BackendSink {
    /// The circuit's register table, before any operation event.
    fn start(&mut self, registers: &[Register]);

    /// A primitive gate application.
    fn apply(
        &mut self,
        name: &str,
        params: &[ParameterExpression],
        qubits: &[QubitId],
        condition: Option<&ClassicalCondition>,
    );

    /// Measurement of one qubit into one classical wire.
    fn measure(&mut self, qubit: QubitId, clbit: ClbitId);

    /// Reset of one qubit.
    fn reset(&mut self, qubit: QubitId);

    /// A scheduling fence across the given qubits.
    fn barrier(&mut self, qubits: &[QubitId]);

    /// End of the stream; no further events follow.
    fn end(&mut self);
}
