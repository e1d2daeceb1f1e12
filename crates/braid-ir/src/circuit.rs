//! Circuit-level model: registers, validated mutation, derived metrics.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{IrError, IrResult};
use crate::graph::{NodeId, NodeKind, WireGraph};
use crate::instruction::{ClassicalCondition, Gate, Instruction, InstructionKind};
use crate::register::{Register, RegisterKind};
use crate::wire::{ClbitId, QubitId, WireId};

/// Where an operation is spliced into its wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// After every existing operation on the touched wires.
    #[default]
    Back,
    /// Before every existing operation on the touched wires.
    Front,
}

/// A quantum circuit over named registers.
///
/// The circuit owns the register table and the [`WireGraph`]; every mutation
/// goes through argument validation here, so the graph-level degree and path
/// invariants hold after each call.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    registers: Vec<Register>,
    reg_index: FxHashMap<String, usize>,
    graph: WireGraph,
    /// Input/output terminator pair per quantum wire, indexed by dense id.
    qubit_io: Vec<(NodeId, NodeId)>,
    /// Input/output terminator pair per classical wire, indexed by dense id.
    clbit_io: Vec<(NodeId, NodeId)>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registers: vec![],
            reg_index: FxHashMap::default(),
            graph: WireGraph::new(),
            qubit_io: vec![],
            clbit_io: vec![],
        }
    }

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // Registers and wires
    // =========================================================================

    /// Declare a register of `size` wires and create the terminator pair for
    /// each wire. The register set is append-only.
    pub fn add_register(
        &mut self,
        name: impl Into<String>,
        kind: RegisterKind,
        size: u32,
    ) -> IrResult<Vec<WireId>> {
        let name = name.into();
        if self.reg_index.contains_key(&name) {
            return Err(IrError::DuplicateRegister { name });
        }

        let first = match kind {
            RegisterKind::Quantum => self.qubit_io.len() as u32,
            RegisterKind::Classical => self.clbit_io.len() as u32,
        };

        let mut wires = Vec::with_capacity(size as usize);
        for i in 0..size {
            let wire = match kind {
                RegisterKind::Quantum => WireId::Qubit(QubitId(first + i)),
                RegisterKind::Classical => WireId::Clbit(ClbitId(first + i)),
            };
            let input = self.graph.add_node(NodeKind::In(wire));
            let output = self.graph.add_node(NodeKind::Out(wire));
            self.graph.add_edge(input, output, wire)?;
            match kind {
                RegisterKind::Quantum => self.qubit_io.push((input, output)),
                RegisterKind::Classical => self.clbit_io.push((input, output)),
            }
            wires.push(wire);
        }

        self.reg_index.insert(name.clone(), self.registers.len());
        self.registers.push(Register::new(name, kind, size, first));
        Ok(wires)
    }

    /// Get a register by name.
    pub fn register(&self, name: &str) -> Option<&Register> {
        self.reg_index.get(name).map(|&i| &self.registers[i])
    }

    /// All registers, in declaration order.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Resolve `(register, index)` to a wire id.
    pub fn wire(&self, register: &str, index: u32) -> IrResult<WireId> {
        let reg = self
            .register(register)
            .ok_or_else(|| IrError::UnknownRegister {
                name: register.to_string(),
            })?;
        if !reg.contains_index(index) {
            let wire = match reg.kind {
                RegisterKind::Quantum => WireId::Qubit(QubitId(reg.first + index)),
                RegisterKind::Classical => WireId::Clbit(ClbitId(reg.first + index)),
            };
            return Err(IrError::UnknownWire {
                wire,
                op_name: None,
            });
        }
        Ok(match reg.kind {
            RegisterKind::Quantum => WireId::Qubit(QubitId(reg.first + index)),
            RegisterKind::Classical => WireId::Clbit(ClbitId(reg.first + index)),
        })
    }

    /// Resolve `(register, index)` to a qubit id.
    pub fn qubit(&self, register: &str, index: u32) -> IrResult<QubitId> {
        match self.wire(register, index)? {
            WireId::Qubit(q) => Ok(q),
            WireId::Clbit(_) => Err(IrError::RegisterMismatch(format!(
                "register '{register}' is classical, expected quantum"
            ))),
        }
    }

    /// Resolve `(register, index)` to a classical wire id.
    pub fn clbit(&self, register: &str, index: u32) -> IrResult<ClbitId> {
        match self.wire(register, index)? {
            WireId::Clbit(c) => Ok(c),
            WireId::Qubit(_) => Err(IrError::RegisterMismatch(format!(
                "register '{register}' is quantum, expected classical"
            ))),
        }
    }

    /// Total wire count across all registers.
    pub fn width(&self) -> usize {
        self.qubit_io.len() + self.clbit_io.len()
    }

    /// Number of quantum wires.
    pub fn num_qubits(&self) -> usize {
        self.qubit_io.len()
    }

    /// Number of classical wires.
    pub fn num_clbits(&self) -> usize {
        self.clbit_io.len()
    }

    /// Iterate over all quantum wire ids.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        (0..self.qubit_io.len() as u32).map(QubitId)
    }

    /// Iterate over all classical wire ids.
    pub fn clbits(&self) -> impl Iterator<Item = ClbitId> + '_ {
        (0..self.clbit_io.len() as u32).map(ClbitId)
    }

    fn io_pair(&self, wire: WireId) -> IrResult<(NodeId, NodeId)> {
        let pair = match wire {
            WireId::Qubit(q) => self.qubit_io.get(q.0 as usize),
            WireId::Clbit(c) => self.clbit_io.get(c.0 as usize),
        };
        pair.copied().ok_or(IrError::UnknownWire {
            wire,
            op_name: None,
        })
    }

    /// The input terminator node of a wire.
    pub fn input_node(&self, wire: WireId) -> IrResult<NodeId> {
        Ok(self.io_pair(wire)?.0)
    }

    /// The output terminator node of a wire.
    pub fn output_node(&self, wire: WireId) -> IrResult<NodeId> {
        Ok(self.io_pair(wire)?.1)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Apply an instruction at the back or front of its wires.
    ///
    /// Validates declared arity, wire ownership, duplicate arguments and the
    /// condition register before touching the graph. The condition's
    /// classical register wires are linked as read dependencies.
    pub fn apply(&mut self, instruction: Instruction, position: Position) -> IrResult<NodeId> {
        self.validate(&instruction)?;
        let wires = self.touched_wires(&instruction)?;

        let node = self.graph.add_node(NodeKind::Op(instruction));
        for wire in wires {
            let (input, output) = self.io_pair(wire)?;
            match position {
                Position::Back => {
                    let pred = self
                        .graph
                        .predecessor_on_wire(output, wire)
                        .ok_or_else(|| {
                            IrError::InvalidEdge(format!("wire {wire} has no chain to its output"))
                        })?;
                    self.graph.remove_edge(pred, output, wire)?;
                    self.graph.add_edge(pred, node, wire)?;
                    self.graph.add_edge(node, output, wire)?;
                }
                Position::Front => {
                    let succ = self.graph.successor_on_wire(input, wire).ok_or_else(|| {
                        IrError::InvalidEdge(format!("wire {wire} has no chain from its input"))
                    })?;
                    self.graph.remove_edge(input, succ, wire)?;
                    self.graph.add_edge(input, node, wire)?;
                    self.graph.add_edge(node, succ, wire)?;
                }
            }
        }
        Ok(node)
    }

    /// Append an instruction after every existing operation on its wires.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<NodeId> {
        self.apply(instruction, Position::Back)
    }

    /// Prepend an instruction before every existing operation on its wires.
    pub fn push_front(&mut self, instruction: Instruction) -> IrResult<NodeId> {
        self.apply(instruction, Position::Front)
    }

    /// Append a gate application.
    pub fn gate(
        &mut self,
        gate: Gate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<NodeId> {
        self.push(Instruction::gate(gate, qubits))
    }

    /// Append a measurement.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<NodeId> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Append a reset.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<NodeId> {
        self.push(Instruction::reset(qubit))
    }

    /// Append a barrier.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<NodeId> {
        self.push(Instruction::barrier(qubits))
    }

    /// Remove an operation node, splicing its wires back together.
    ///
    /// Fails with `UnknownNode` if `id` does not reference a live operation
    /// node (terminators included: they are not removable through this API).
    pub fn remove_op_node(&mut self, id: NodeId) -> IrResult<Instruction> {
        if self.graph.op(id).is_none() {
            return Err(IrError::UnknownNode(id));
        }
        self.graph.remove_node(id)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let op_name = instruction.name().to_string();

        // Declared arity.
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                if gate.num_qubits as usize != instruction.qubits.len() {
                    return Err(IrError::ArgumentCountMismatch {
                        op_name,
                        kind: "qubit",
                        expected: gate.num_qubits,
                        got: instruction.qubits.len() as u32,
                    });
                }
                if !instruction.clbits.is_empty() {
                    return Err(IrError::ArgumentCountMismatch {
                        op_name,
                        kind: "clbit",
                        expected: 0,
                        got: instruction.clbits.len() as u32,
                    });
                }
            }
            InstructionKind::Measure => {
                if instruction.qubits.len() != instruction.clbits.len()
                    || instruction.qubits.is_empty()
                {
                    return Err(IrError::ArgumentCountMismatch {
                        op_name,
                        kind: "clbit",
                        expected: instruction.qubits.len() as u32,
                        got: instruction.clbits.len() as u32,
                    });
                }
            }
            InstructionKind::Reset => {
                if instruction.qubits.len() != 1 || !instruction.clbits.is_empty() {
                    return Err(IrError::ArgumentCountMismatch {
                        op_name,
                        kind: "qubit",
                        expected: 1,
                        got: instruction.qubits.len() as u32,
                    });
                }
            }
            InstructionKind::Barrier => {
                if !instruction.clbits.is_empty() {
                    return Err(IrError::ArgumentCountMismatch {
                        op_name,
                        kind: "clbit",
                        expected: 0,
                        got: instruction.clbits.len() as u32,
                    });
                }
            }
        }

        // Wire ownership and duplicates.
        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            let wire = WireId::Qubit(qubit);
            if (qubit.0 as usize) >= self.qubit_io.len() {
                return Err(IrError::UnknownWire {
                    wire,
                    op_name: Some(op_name),
                });
            }
            if !seen.insert(wire) {
                return Err(IrError::DuplicateWire {
                    wire,
                    op_name: Some(op_name),
                });
            }
        }
        for &clbit in &instruction.clbits {
            let wire = WireId::Clbit(clbit);
            if (clbit.0 as usize) >= self.clbit_io.len() {
                return Err(IrError::UnknownWire {
                    wire,
                    op_name: Some(op_name),
                });
            }
            if !seen.insert(wire) {
                return Err(IrError::DuplicateWire {
                    wire,
                    op_name: Some(op_name),
                });
            }
        }

        // Condition register must exist and be classical.
        if let Some(condition) = &instruction.condition {
            let reg =
                self.register(&condition.register)
                    .ok_or_else(|| IrError::UnknownRegister {
                        name: condition.register.clone(),
                    })?;
            if reg.kind != RegisterKind::Classical {
                return Err(IrError::RegisterMismatch(format!(
                    "condition register '{}' is {}, expected classical",
                    reg.name, reg.kind
                )));
            }
        }

        Ok(())
    }

    /// Every wire the instruction is linked on: explicit quantum and
    /// classical arguments plus the condition register's wires (reads).
    fn touched_wires(&self, instruction: &Instruction) -> IrResult<Vec<WireId>> {
        let mut wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
            .collect();

        if let Some(condition) = &instruction.condition {
            let reg =
                self.register(&condition.register)
                    .ok_or_else(|| IrError::UnknownRegister {
                        name: condition.register.clone(),
                    })?;
            for i in 0..reg.size {
                let wire = WireId::Clbit(ClbitId(reg.first + i));
                if !wires.contains(&wire) {
                    wires.push(wire);
                }
            }
        }
        Ok(wires)
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Merge `other`'s operation nodes into this circuit.
    ///
    /// `wire_mapping` associates each wire `other` references with a wire of
    /// this circuit of the same kind. Operations are appended in `other`'s
    /// topological order. The merge is atomic: every failure mode is checked
    /// before the first node is inserted, so a rejected compose leaves the
    /// receiver untouched.
    ///
    /// A condition on one of `other`'s operations is remapped by register
    /// name: this circuit must own a classical register with the same name
    /// and size.
    pub fn compose(
        &mut self,
        other: &Circuit,
        wire_mapping: &FxHashMap<WireId, WireId>,
    ) -> IrResult<()> {
        let map_wire = |wire: WireId| -> IrResult<WireId> {
            let target = *wire_mapping
                .get(&wire)
                .ok_or(IrError::UnmappedWire { wire })?;
            match (wire, target) {
                (WireId::Qubit(_), WireId::Qubit(_)) | (WireId::Clbit(_), WireId::Clbit(_)) => {}
                _ => {
                    return Err(IrError::RegisterMismatch(format!(
                        "wire {wire} and mapping target {target} differ in kind"
                    )));
                }
            }
            // Target must be owned by the receiver.
            self.io_pair(target)?;
            Ok(target)
        };

        // Validate and rebind every operation before mutating anything.
        let mut pending = Vec::new();
        for id in other.graph.topological_op_nodes() {
            let inst = other.graph.op(id).ok_or(IrError::UnknownNode(id))?;

            let qubits = inst
                .qubits
                .iter()
                .map(|&q| match map_wire(WireId::Qubit(q))? {
                    WireId::Qubit(mapped) => Ok(mapped),
                    WireId::Clbit(_) => unreachable!("kind checked by map_wire"),
                })
                .collect::<IrResult<Vec<_>>>()?;
            let clbits = inst
                .clbits
                .iter()
                .map(|&c| match map_wire(WireId::Clbit(c))? {
                    WireId::Clbit(mapped) => Ok(mapped),
                    WireId::Qubit(_) => unreachable!("kind checked by map_wire"),
                })
                .collect::<IrResult<Vec<_>>>()?;

            if let Some(condition) = &inst.condition {
                let theirs =
                    other
                        .register(&condition.register)
                        .ok_or_else(|| IrError::UnknownRegister {
                            name: condition.register.clone(),
                        })?;
                let ours =
                    self.register(&condition.register)
                        .ok_or_else(|| IrError::UnknownRegister {
                            name: condition.register.clone(),
                        })?;
                if ours.kind != RegisterKind::Classical || ours.size != theirs.size {
                    return Err(IrError::RegisterMismatch(format!(
                        "condition register '{}' has no matching classical register of size {} \
                         in the receiver",
                        condition.register, theirs.size
                    )));
                }
            }

            let mut mapped = inst.clone();
            mapped.qubits = qubits;
            mapped.clbits = clbits;
            self.validate(&mapped)?;
            pending.push(mapped);
        }

        for instruction in pending {
            self.apply(instruction, Position::Back)?;
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Access the underlying wire graph.
    pub fn graph(&self) -> &WireGraph {
        &self.graph
    }

    /// Get the instruction of an operation node.
    pub fn instruction(&self, id: NodeId) -> Option<&Instruction> {
        self.graph.op(id)
    }

    /// Number of operation nodes.
    pub fn num_ops(&self) -> usize {
        self.graph.op_count()
    }

    /// Every node in deterministic topological order.
    pub fn topological_nodes(&self) -> impl Iterator<Item = NodeId> + use<> {
        self.graph.topological_nodes()
    }

    /// Operation nodes in deterministic topological order.
    pub fn topological_op_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.topological_op_nodes()
    }

    /// Number of operation nodes on the longest path through the DAG.
    ///
    /// A freshly registered circuit has depth 0; terminators never count.
    pub fn depth(&self) -> usize {
        let mut depths: FxHashMap<NodeId, usize> = FxHashMap::default();
        let mut max_depth = 0;
        for id in self.graph.topological_nodes() {
            let pred_depth = self
                .graph
                .predecessors(id)
                .map(|p| depths.get(&p).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            let node_depth = if self.graph.op(id).is_some() {
                pred_depth + 1
            } else {
                pred_depth
            };
            max_depth = max_depth.max(node_depth);
            depths.insert(id, node_depth);
        }
        max_depth
    }

    /// Partition operation nodes into maximal front layers.
    ///
    /// Layer `k` holds every operation whose wire predecessors all sit in
    /// layers `< k`; within a layer, nodes are ordered by ascending id.
    pub fn layers(&self) -> Vec<Vec<NodeId>> {
        let mut level: FxHashMap<NodeId, usize> = FxHashMap::default();
        let mut layers: Vec<Vec<NodeId>> = vec![];
        for id in self.graph.topological_nodes() {
            let pred_level = self
                .graph
                .predecessors(id)
                .map(|p| level.get(&p).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            if self.graph.op(id).is_some() {
                let l = pred_level;
                level.insert(id, l + 1);
                if layers.len() <= l {
                    layers.resize_with(l + 1, Vec::new);
                }
                layers[l].push(id);
            } else {
                level.insert(id, pred_level);
            }
        }
        // topological_nodes breaks ties by id, so each layer is already
        // sorted; keep that guarantee explicit.
        for layer in &mut layers {
            layer.sort_unstable();
        }
        layers
    }

    /// Check the structural invariants of the DAG.
    ///
    /// Verifies acyclicity, terminator pairing, and that each wire's edges
    /// form a simple path from input to output visiting exactly the
    /// operations that reference the wire (arguments or condition reads).
    pub fn verify_integrity(&self) -> IrResult<()> {
        // Acyclic: the Kahn traversal covers every node iff there is no cycle.
        let visited = self.graph.topological_nodes().count();
        if visited != self.graph.node_count() {
            return Err(IrError::InvalidEdge("graph contains a cycle".into()));
        }

        let all_wires: Vec<WireId> = self
            .qubits()
            .map(WireId::Qubit)
            .chain(self.clbits().map(WireId::Clbit))
            .collect();

        for wire in all_wires {
            let (input, output) = self.io_pair(wire)?;

            // Which ops must appear on this wire's chain.
            let mut expected: FxHashSet<NodeId> = FxHashSet::default();
            for id in self.graph.topological_op_nodes() {
                if let Some(inst) = self.graph.op(id) {
                    if self.touched_wires(inst)?.contains(&wire) {
                        expected.insert(id);
                    }
                }
            }

            // Walk the chain.
            let mut current = input;
            let mut steps = 0;
            while current != output {
                let next = self.graph.successor_on_wire(current, wire).ok_or_else(|| {
                    IrError::InvalidEdge(format!("wire {wire} chain is broken at {current:?}"))
                })?;
                if next != output && !expected.remove(&next) {
                    return Err(IrError::InvalidEdge(format!(
                        "wire {wire} chain visits {next:?}, which does not reference it"
                    )));
                }
                current = next;
                steps += 1;
                if steps > self.graph.node_count() {
                    return Err(IrError::InvalidEdge(format!(
                        "wire {wire} chain does not terminate"
                    )));
                }
            }
            if !expected.is_empty() {
                return Err(IrError::InvalidEdge(format!(
                    "wire {wire} chain misses {} referencing op(s)",
                    expected.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParameterExpression;

    fn bell_with_measure() -> (Circuit, NodeId, NodeId, NodeId) {
        let mut circuit = Circuit::new("bell");
        circuit
            .add_register("q", RegisterKind::Quantum, 2)
            .unwrap();
        circuit
            .add_register("c", RegisterKind::Classical, 1)
            .unwrap();
        let h = circuit.gate(Gate::new("h", 1), [QubitId(0)]).unwrap();
        let cx = circuit
            .gate(Gate::new("cx", 2), [QubitId(0), QubitId(1)])
            .unwrap();
        let m = circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        (circuit, h, cx, m)
    }

    #[test]
    fn test_fresh_register_metrics() {
        let mut circuit = Circuit::new("fresh");
        circuit
            .add_register("q", RegisterKind::Quantum, 2)
            .unwrap();

        // Exactly the two terminator pairs, no ops.
        let nodes: Vec<_> = circuit.topological_nodes().collect();
        assert_eq!(nodes.len(), 4);
        assert_eq!(circuit.num_ops(), 0);
        assert_eq!(circuit.width(), 2);
        assert_eq!(circuit.depth(), 0);
        circuit.verify_integrity().unwrap();
    }

    #[test]
    fn test_duplicate_register_rejected() {
        let mut circuit = Circuit::new("dup");
        circuit
            .add_register("q", RegisterKind::Quantum, 1)
            .unwrap();
        assert!(matches!(
            circuit.add_register("q", RegisterKind::Classical, 1),
            Err(IrError::DuplicateRegister { .. })
        ));
    }

    #[test]
    fn test_bell_scenario_order_depth_width() {
        let (circuit, h, cx, m) = bell_with_measure();

        let ops: Vec<_> = circuit.topological_op_nodes().collect();
        assert_eq!(ops, vec![h, cx, m]);
        assert_eq!(circuit.depth(), 3);
        assert_eq!(circuit.width(), 3);
        circuit.verify_integrity().unwrap();
    }

    #[test]
    fn test_arity_mismatch() {
        let mut circuit = Circuit::new("arity");
        circuit
            .add_register("q", RegisterKind::Quantum, 2)
            .unwrap();
        let err = circuit.gate(Gate::new("cx", 2), [QubitId(0)]).unwrap_err();
        assert!(matches!(
            err,
            IrError::ArgumentCountMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_wire() {
        let mut circuit = Circuit::new("unknown");
        circuit
            .add_register("q", RegisterKind::Quantum, 1)
            .unwrap();
        let err = circuit.gate(Gate::new("h", 1), [QubitId(9)]).unwrap_err();
        assert!(matches!(err, IrError::UnknownWire { .. }));
    }

    #[test]
    fn test_duplicate_wire_argument() {
        let mut circuit = Circuit::new("dupwire");
        circuit
            .add_register("q", RegisterKind::Quantum, 2)
            .unwrap();
        let err = circuit
            .gate(Gate::new("cx", 2), [QubitId(0), QubitId(0)])
            .unwrap_err();
        assert!(matches!(err, IrError::DuplicateWire { .. }));
    }

    #[test]
    fn test_front_insertion() {
        let mut circuit = Circuit::new("front");
        circuit
            .add_register("q", RegisterKind::Quantum, 1)
            .unwrap();
        let h = circuit.gate(Gate::new("h", 1), [QubitId(0)]).unwrap();
        let x = circuit
            .push_front(Instruction::gate(Gate::new("x", 1), [QubitId(0)]))
            .unwrap();

        let ops: Vec<_> = circuit.topological_op_nodes().collect();
        assert_eq!(ops, vec![x, h]);
        circuit.verify_integrity().unwrap();
    }

    #[test]
    fn test_remove_op_relinks_neighbors() {
        let (mut circuit, h, cx, m) = bell_with_measure();
        circuit.remove_op_node(cx).unwrap();

        let ops: Vec<_> = circuit.topological_op_nodes().collect();
        assert_eq!(ops, vec![h, m]);
        // q0: h and measure are now adjacent.
        assert_eq!(
            circuit
                .graph()
                .successor_on_wire(h, WireId::Qubit(QubitId(0))),
            Some(m)
        );
        circuit.verify_integrity().unwrap();
    }

    #[test]
    fn test_remove_unknown_node() {
        let (mut circuit, h, _, _) = bell_with_measure();
        circuit.remove_op_node(h).unwrap();
        assert!(matches!(
            circuit.remove_op_node(h),
            Err(IrError::UnknownNode(_))
        ));
        // Terminators are not reachable through this API either.
        let input = circuit.input_node(WireId::Qubit(QubitId(0))).unwrap();
        assert!(matches!(
            circuit.remove_op_node(input),
            Err(IrError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_condition_is_read_dependency() {
        let mut circuit = Circuit::new("cond");
        circuit
            .add_register("q", RegisterKind::Quantum, 2)
            .unwrap();
        circuit
            .add_register("c", RegisterKind::Classical, 1)
            .unwrap();

        let m = circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        let x = circuit
            .push(
                Instruction::gate(Gate::new("x", 1), [QubitId(1)])
                    .with_condition(ClassicalCondition::new("c", 1)),
            )
            .unwrap();

        // The conditioned gate reads c, so it must come after the measure.
        let ops: Vec<_> = circuit.topological_op_nodes().collect();
        assert_eq!(ops, vec![m, x]);
        assert_eq!(
            circuit
                .graph()
                .predecessor_on_wire(x, WireId::Clbit(ClbitId(0))),
            Some(m)
        );
        circuit.verify_integrity().unwrap();
    }

    #[test]
    fn test_condition_register_must_be_classical() {
        let mut circuit = Circuit::new("condkind");
        circuit
            .add_register("q", RegisterKind::Quantum, 1)
            .unwrap();
        let err = circuit
            .push(
                Instruction::gate(Gate::new("x", 1), [QubitId(0)])
                    .with_condition(ClassicalCondition::new("q", 0)),
            )
            .unwrap_err();
        assert!(matches!(err, IrError::RegisterMismatch(_)));
    }

    #[test]
    fn test_layers() {
        let mut circuit = Circuit::new("layers");
        circuit
            .add_register("q", RegisterKind::Quantum, 2)
            .unwrap();
        let h0 = circuit.gate(Gate::new("h", 1), [QubitId(0)]).unwrap();
        let h1 = circuit.gate(Gate::new("h", 1), [QubitId(1)]).unwrap();
        let cx = circuit
            .gate(Gate::new("cx", 2), [QubitId(0), QubitId(1)])
            .unwrap();

        assert_eq!(circuit.layers(), vec![vec![h0, h1], vec![cx]]);
        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_compose_identity_mapping() {
        let (mut lhs, ..) = bell_with_measure();
        let (rhs, ..) = bell_with_measure();

        let mapping: FxHashMap<WireId, WireId> = rhs
            .qubits()
            .map(|q| (WireId::Qubit(q), WireId::Qubit(q)))
            .chain(rhs.clbits().map(|c| (WireId::Clbit(c), WireId::Clbit(c))))
            .collect();

        let before_lhs = lhs.num_ops();
        let before_rhs = rhs.num_ops();
        lhs.compose(&rhs, &mapping).unwrap();

        assert_eq!(lhs.num_ops(), before_lhs + before_rhs);
        // Relative order of the merged half is preserved at the tail.
        let names: Vec<_> = lhs
            .topological_op_nodes()
            .map(|id| lhs.instruction(id).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["h", "cx", "measure", "h", "cx", "measure"]);
        lhs.verify_integrity().unwrap();
    }

    #[test]
    fn test_compose_unmapped_wire_is_atomic() {
        let (mut lhs, ..) = bell_with_measure();
        let (rhs, ..) = bell_with_measure();

        // Map only qubit wires; the measure's clbit is missing.
        let mapping: FxHashMap<WireId, WireId> = rhs
            .qubits()
            .map(|q| (WireId::Qubit(q), WireId::Qubit(q)))
            .collect();

        let before: Vec<_> = lhs.topological_nodes().collect();
        let err = lhs.compose(&rhs, &mapping).unwrap_err();
        assert!(matches!(err, IrError::UnmappedWire { .. }));

        // Receiver untouched.
        let after: Vec<_> = lhs.topological_nodes().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_compose_kind_mismatch() {
        let (mut lhs, ..) = bell_with_measure();
        let (rhs, ..) = bell_with_measure();

        let mut mapping: FxHashMap<WireId, WireId> = rhs
            .qubits()
            .map(|q| (WireId::Qubit(q), WireId::Qubit(q)))
            .collect();
        // Classical wire mapped onto a quantum wire.
        mapping.insert(
            WireId::Clbit(ClbitId(0)),
            WireId::Qubit(QubitId(1)),
        );

        let err = lhs.compose(&rhs, &mapping).unwrap_err();
        assert!(matches!(err, IrError::RegisterMismatch(_)));
    }

    #[test]
    fn test_wire_resolution() {
        let (circuit, ..) = bell_with_measure();
        assert_eq!(circuit.qubit("q", 1).unwrap(), QubitId(1));
        assert_eq!(circuit.clbit("c", 0).unwrap(), ClbitId(0));
        assert!(matches!(
            circuit.wire("nope", 0),
            Err(IrError::UnknownRegister { .. })
        ));
        assert!(matches!(
            circuit.wire("q", 5),
            Err(IrError::UnknownWire { .. })
        ));
        assert!(matches!(
            circuit.qubit("c", 0),
            Err(IrError::RegisterMismatch(_))
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// One random operation over 3 qubits.
        fn op_strategy() -> impl Strategy<Value = Instruction> {
            prop_oneof![
                (0u32..3).prop_map(|q| Instruction::gate(Gate::new("h", 1), [QubitId(q)])),
                (0u32..3, 0u32..3).prop_filter_map("distinct qubits", |(a, b)| {
                    (a != b).then(|| {
                        Instruction::gate(Gate::new("cx", 2), [QubitId(a), QubitId(b)])
                    })
                }),
                (0u32..3).prop_map(|q| Instruction::reset(QubitId(q))),
            ]
        }

        proptest! {
            /// Topological order respects every per-wire successor relation,
            /// and the structural invariants hold after each applied prefix.
            #[test]
            fn topological_order_consistent(ops in proptest::collection::vec(op_strategy(), 0..40)) {
                let mut circuit = Circuit::new("prop");
                circuit.add_register("q", RegisterKind::Quantum, 3).unwrap();

                for op in ops {
                    circuit.push(op).unwrap();
                    circuit.verify_integrity().unwrap();
                }

                let order: Vec<NodeId> = circuit.topological_nodes().collect();
                let position: FxHashMap<NodeId, usize> =
                    order.iter().enumerate().map(|(i, &id)| (id, i)).collect();

                for &id in &order {
                    for wire in circuit.qubits().map(WireId::Qubit) {
                        if let Some(next) = circuit.graph().successor_on_wire(id, wire) {
                            prop_assert!(position[&id] < position[&next]);
                        }
                    }
                }

                // Restartable: a second traversal yields the same order.
                let again: Vec<NodeId> = circuit.topological_nodes().collect();
                prop_assert_eq!(order, again);
            }
        }
    }

    #[test]
    fn test_parameterized_gate_roundtrip() {
        let mut circuit = Circuit::new("param");
        circuit
            .add_register("q", RegisterKind::Quantum, 1)
            .unwrap();
        let id = circuit
            .gate(
                Gate::new("rz", 1).with_params(vec![ParameterExpression::symbol("theta")]),
                [QubitId(0)],
            )
            .unwrap();
        let inst = circuit.instruction(id).unwrap();
        assert!(inst.as_gate().unwrap().is_parameterized());
    }
}
