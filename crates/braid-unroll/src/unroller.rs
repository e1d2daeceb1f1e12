//! Recursive gate expansion against a basis and a decomposition table.

use braid_ir::{
    ClassicalCondition, Gate, Instruction, InstructionKind, IrError, ParameterExpression, QubitId,
    WireId,
};
use tracing::{debug, trace};

use crate::basis::BasisGates;
use crate::error::{UnrollError, UnrollResult};
use crate::sink::BackendSink;
use crate::template::{DecompositionTable, GateSignature, GateTemplate};

/// Unrolling configuration: the target basis and the definition table.
#[derive(Debug, Clone, Default)]
pub struct UnrollConfig {
    /// Gate names the target accepts as primitives.
    pub basis: BasisGates,
    /// Decomposition bodies for non-basis gates.
    pub definitions: DecompositionTable,
}

impl UnrollConfig {
    /// Create a new configuration.
    pub fn new(basis: BasisGates, definitions: DecompositionTable) -> Self {
        Self { basis, definitions }
    }
}

/// Expands a circuit into basis primitives, streaming events to a sink.
///
/// Gates in the basis pass through unchanged. Every other gate is looked up
/// in the decomposition table by signature and replaced in place by its body,
/// recursively, until only basis gates remain. The expansion stack is
/// explicit, so a definition cycle is reported as
/// [`UnrollError::RecursiveDefinition`] instead of exhausting the call stack
/// by depth proportional to the cycle length only.
pub struct Unroller<'a> {
    config: &'a UnrollConfig,
    stack: Vec<GateSignature>,
}

impl<'a> Unroller<'a> {
    /// Create an unroller over a configuration.
    pub fn new(config: &'a UnrollConfig) -> Self {
        Self {
            config,
            stack: vec![],
        }
    }

    /// Unroll `circuit`, streaming the primitive schedule to `sink`.
    ///
    /// Emits `start`, then one event per primitive in deterministic
    /// topological order, then `end`. On error the sink may have received a
    /// prefix of the stream but never `end`.
    pub fn run<S: BackendSink>(
        &mut self,
        circuit: &braid_ir::Circuit,
        sink: &mut S,
    ) -> UnrollResult<()> {
        debug!(
            circuit = circuit.name(),
            ops = circuit.num_ops(),
            basis = self.config.basis.len(),
            "unrolling circuit"
        );
        self.stack.clear();

        sink.start(circuit.registers());
        for id in circuit.topological_op_nodes() {
            let inst = circuit
                .instruction(id)
                .ok_or(UnrollError::Ir(IrError::UnknownNode(id)))?;
            self.emit(inst, inst.condition.as_ref(), sink)?;
        }
        sink.end();
        Ok(())
    }

    fn emit<S: BackendSink>(
        &mut self,
        instruction: &Instruction,
        condition: Option<&ClassicalCondition>,
        sink: &mut S,
    ) -> UnrollResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                self.expand_gate(gate, &instruction.qubits, condition, sink)
            }
            // The sink's measure/reset/barrier events have no condition
            // slot; dropping the predicate would change program meaning.
            _ if condition.is_some() => Err(UnrollError::UnsupportedCondition {
                op_name: instruction.name().to_string(),
            }),
            InstructionKind::Measure => {
                for (&qubit, &clbit) in instruction.qubits.iter().zip(&instruction.clbits) {
                    sink.measure(qubit, clbit);
                }
                Ok(())
            }
            InstructionKind::Reset => {
                sink.reset(instruction.qubits[0]);
                Ok(())
            }
            InstructionKind::Barrier => {
                sink.barrier(&instruction.qubits);
                Ok(())
            }
        }
    }

    fn expand_gate<S: BackendSink>(
        &mut self,
        gate: &Gate,
        qubits: &[QubitId],
        condition: Option<&ClassicalCondition>,
        sink: &mut S,
    ) -> UnrollResult<()> {
        if self.config.basis.contains(&gate.name) {
            trace!(gate = %gate.name, "basis gate, passing through");
            sink.apply(&gate.name, &gate.params, qubits, condition);
            return Ok(());
        }

        let signature = GateSignature::new(gate.name.clone(), gate.num_qubits);
        let template = self
            .config
            .definitions
            .get(&signature)
            .ok_or_else(|| UnrollError::UndefinedGate {
                name: gate.name.clone(),
                num_qubits: gate.num_qubits,
            })?;

        if self.stack.contains(&signature) {
            return Err(UnrollError::RecursiveDefinition { signature });
        }
        if template.params.len() != gate.params.len() {
            return Err(UnrollError::ParameterCountMismatch {
                name: gate.name.clone(),
                expected: template.params.len(),
                got: gate.params.len(),
            });
        }
        if template.body.num_qubits() > qubits.len() {
            return Err(UnrollError::Ir(IrError::ArgumentCountMismatch {
                op_name: gate.name.clone(),
                kind: "qubit",
                expected: template.body.num_qubits() as u32,
                got: qubits.len() as u32,
            }));
        }

        trace!(gate = %signature, depth = self.stack.len(), "expanding definition");
        self.stack.push(signature);
        let result = self.expand_body(template, gate, qubits, condition, sink);
        self.stack.pop();
        result
    }

    fn expand_body<S: BackendSink>(
        &mut self,
        template: &GateTemplate,
        gate: &Gate,
        qubits: &[QubitId],
        condition: Option<&ClassicalCondition>,
        sink: &mut S,
    ) -> UnrollResult<()> {
        for id in template.body.topological_op_nodes() {
            let inner = template
                .body
                .instruction(id)
                .ok_or(UnrollError::Ir(IrError::UnknownNode(id)))?;

            // A body is built over formal quantum wires only; conditions
            // inside a definition have no register to resolve against.
            if let Some(inner_condition) = &inner.condition {
                return Err(UnrollError::Ir(IrError::UnknownRegister {
                    name: inner_condition.register.clone(),
                }));
            }

            let mapped_qubits: Vec<QubitId> = inner
                .qubits
                .iter()
                .map(|formal| qubits[formal.0 as usize])
                .collect();

            match &inner.kind {
                InstructionKind::Gate(inner_gate) => {
                    let params: Vec<ParameterExpression> = inner_gate
                        .params
                        .iter()
                        .map(|expr| {
                            let mut out = expr.clone();
                            for (formal, actual) in template.params.iter().zip(&gate.params) {
                                out = out.substitute(formal, actual);
                            }
                            out
                        })
                        .collect();
                    let bound = Gate::new(inner_gate.name.clone(), inner_gate.num_qubits)
                        .with_params(params);
                    self.expand_gate(&bound, &mapped_qubits, condition, sink)?;
                }
                InstructionKind::Reset => sink.reset(mapped_qubits[0]),
                InstructionKind::Barrier => sink.barrier(&mapped_qubits),
                InstructionKind::Measure => {
                    // Formal wires are quantum only; a measure inside a body
                    // references a classical wire the expansion cannot map.
                    return Err(UnrollError::Ir(IrError::UnknownWire {
                        wire: WireId::Clbit(inner.clbits[0]),
                        op_name: Some("measure".to_string()),
                    }));
                }
            }
        }
        Ok(())
    }
}
