//! Low-level DAG substrate: nodes, wire-labeled edges, traversal.
//!
//! The graph stores one node per wire terminator (`In`/`Out`) plus one node
//! per operation instance. Edges are directed and labeled with the wire they
//! represent, so the edges of a single wire form a simple path from the
//! wire's input node to its output node.
//!
//! Nodes live in a [`StableDiGraph`], which keeps indices of surviving nodes
//! valid across removals. Public identity is the [`NodeId`], assigned in
//! creation order and never reused; the id doubles as the deterministic
//! tie-break for topological traversal.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::wire::WireId;

/// Stable identifier for a graph node, unique for the lifetime of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// A node in the wire graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Input terminator for a wire.
    In(WireId),
    /// Output terminator for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl NodeKind {
    /// Check if this is an input or output terminator.
    #[inline]
    pub fn is_terminator(&self) -> bool {
        matches!(self, NodeKind::In(_) | NodeKind::Out(_))
    }

    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, NodeKind::Op(_))
    }

    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            NodeKind::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeEntry {
    id: NodeId,
    kind: NodeKind,
}

/// The DAG substrate underlying a circuit.
#[derive(Debug, Clone, Default)]
pub struct WireGraph {
    graph: StableDiGraph<NodeEntry, WireId, u32>,
    indices: FxHashMap<NodeId, NodeIndex>,
    next_id: u32,
}

impl WireGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node with no edges and return its stable identifier.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let idx = self.graph.add_node(NodeEntry { id, kind });
        self.indices.insert(id, idx);
        id
    }

    /// Check whether `id` references a live node.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.indices.contains_key(&id)
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&NodeKind> {
        let idx = self.indices.get(&id)?;
        self.graph.node_weight(*idx).map(|e| &e.kind)
    }

    /// Get the instruction of an operation node.
    pub fn op(&self, id: NodeId) -> Option<&Instruction> {
        self.node(id).and_then(NodeKind::instruction)
    }

    /// Number of live nodes, terminators included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of live operation nodes.
    pub fn op_count(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|e| e.kind.is_op())
            .count()
    }

    fn index(&self, id: NodeId) -> IrResult<NodeIndex> {
        self.indices
            .get(&id)
            .copied()
            .ok_or(IrError::UnknownNode(id))
    }

    fn id_of(&self, idx: NodeIndex) -> NodeId {
        self.graph[idx].id
    }

    /// Create a directed edge carrying `wire` from `from` to `to`.
    ///
    /// Fails with `InvalidEdge` on a self-loop or when either endpoint
    /// already carries an edge of this wire in the same direction (each node
    /// has per-wire in-degree and out-degree at most one).
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, wire: WireId) -> IrResult<()> {
        if from == to {
            return Err(IrError::InvalidEdge(format!(
                "self-loop on node {from:?} for wire {wire}"
            )));
        }
        let from_idx = self.index(from)?;
        let to_idx = self.index(to)?;

        if self.wire_edge(from_idx, wire, Direction::Outgoing).is_some() {
            return Err(IrError::InvalidEdge(format!(
                "node {from:?} already has an outgoing edge for wire {wire}"
            )));
        }
        if self.wire_edge(to_idx, wire, Direction::Incoming).is_some() {
            return Err(IrError::InvalidEdge(format!(
                "node {to:?} already has an incoming edge for wire {wire}"
            )));
        }

        self.graph.add_edge(from_idx, to_idx, wire);
        Ok(())
    }

    /// Remove the edge carrying `wire` from `from` to `to`.
    ///
    /// Used by the circuit layer when splicing an operation into a wire's
    /// chain. Fails with `InvalidEdge` if no such edge exists.
    pub fn remove_edge(&mut self, from: NodeId, to: NodeId, wire: WireId) -> IrResult<()> {
        let from_idx = self.index(from)?;
        let to_idx = self.index(to)?;

        let edge = self
            .graph
            .edges_directed(from_idx, Direction::Outgoing)
            .find(|e| *e.weight() == wire && e.target() == to_idx)
            .map(|e| e.id())
            .ok_or_else(|| {
                IrError::InvalidEdge(format!("no edge {from:?} -> {to:?} for wire {wire}"))
            })?;
        self.graph.remove_edge(edge);
        Ok(())
    }

    /// Remove an operation node, splicing each of its wires back together.
    ///
    /// For every wire through the node, the unique predecessor is connected
    /// directly to the unique successor. Terminators are never removable.
    pub fn remove_node(&mut self, id: NodeId) -> IrResult<Instruction> {
        let idx = self.index(id)?;

        let instruction = match &self.graph[idx].kind {
            NodeKind::In(wire) | NodeKind::Out(wire) => {
                return Err(IrError::RemoveTerminator { wire: *wire });
            }
            NodeKind::Op(inst) => inst.clone(),
        };

        let incoming: Vec<(NodeIndex, WireId)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), *e.weight()))
            .collect();
        let outgoing: Vec<(NodeIndex, WireId)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), *e.weight()))
            .collect();

        self.graph.remove_node(idx);
        self.indices.remove(&id);

        // Reconnect each wire: the removed node had exactly one predecessor
        // and one successor per incident wire.
        for &(pred, wire) in &incoming {
            for &(succ, succ_wire) in &outgoing {
                if wire == succ_wire {
                    self.graph.add_edge(pred, succ, wire);
                }
            }
        }

        Ok(instruction)
    }

    fn wire_edge(&self, idx: NodeIndex, wire: WireId, dir: Direction) -> Option<NodeIndex> {
        self.graph.edges_directed(idx, dir).find_map(|e| {
            if *e.weight() == wire {
                Some(match dir {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                })
            } else {
                None
            }
        })
    }

    /// The node immediately before `id` on `wire`, if any.
    pub fn predecessor_on_wire(&self, id: NodeId, wire: WireId) -> Option<NodeId> {
        let idx = *self.indices.get(&id)?;
        self.wire_edge(idx, wire, Direction::Incoming)
            .map(|i| self.id_of(i))
    }

    /// The node immediately after `id` on `wire`, if any.
    pub fn successor_on_wire(&self, id: NodeId, wire: WireId) -> Option<NodeId> {
        let idx = *self.indices.get(&id)?;
        self.wire_edge(idx, wire, Direction::Outgoing)
            .map(|i| self.id_of(i))
    }

    /// All direct predecessors of `id`, across every wire.
    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.indices
            .get(&id)
            .into_iter()
            .flat_map(|&idx| self.graph.neighbors_directed(idx, Direction::Incoming))
            .map(|i| self.id_of(i))
    }

    /// All direct successors of `id`, across every wire.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.indices
            .get(&id)
            .into_iter()
            .flat_map(|&idx| self.graph.neighbors_directed(idx, Direction::Outgoing))
            .map(|i| self.id_of(i))
    }

    /// Every node reachable backward from `id`, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> FxHashSet<NodeId> {
        self.reachable(id, Direction::Incoming)
    }

    /// Every node reachable forward from `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> FxHashSet<NodeId> {
        self.reachable(id, Direction::Outgoing)
    }

    fn reachable(&self, id: NodeId, dir: Direction) -> FxHashSet<NodeId> {
        let mut seen = FxHashSet::default();
        let Some(&start) = self.indices.get(&id) else {
            return seen;
        };
        let mut stack: Vec<NodeIndex> = self.graph.neighbors_directed(start, dir).collect();
        while let Some(idx) = stack.pop() {
            if seen.insert(self.id_of(idx)) {
                stack.extend(self.graph.neighbors_directed(idx, dir));
            }
        }
        seen
    }

    /// Visit every node exactly once, predecessors before successors.
    ///
    /// Kahn's frontier algorithm with a min-heap on node id: among
    /// simultaneously eligible nodes the one with the smallest (oldest)
    /// identifier comes first, so the order is fully deterministic and
    /// re-invocation on an unchanged graph reproduces it.
    pub fn topological_nodes(&self) -> impl Iterator<Item = NodeId> + use<> {
        let mut in_degree: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut frontier: BinaryHeap<Reverse<NodeId>> = BinaryHeap::new();

        for idx in self.graph.node_indices() {
            let deg = self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .count();
            if deg == 0 {
                frontier.push(Reverse(self.id_of(idx)));
            } else {
                in_degree.insert(idx, deg);
            }
        }

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(id)) = frontier.pop() {
            order.push(id);
            let idx = self.indices[&id];
            for succ in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(deg) = in_degree.get_mut(&succ) {
                    *deg -= 1;
                    if *deg == 0 {
                        in_degree.remove(&succ);
                        frontier.push(Reverse(self.id_of(succ)));
                    }
                }
            }
        }

        debug_assert_eq!(order.len(), self.graph.node_count(), "graph has a cycle");
        order.into_iter()
    }

    /// Operation nodes in topological order, terminators skipped.
    pub fn topological_op_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.topological_nodes()
            .filter(|id| self.node(*id).is_some_and(NodeKind::is_op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Gate;
    use crate::wire::QubitId;

    fn wire(n: u32) -> WireId {
        WireId::Qubit(QubitId(n))
    }

    fn op(name: &str, qubits: &[u32]) -> NodeKind {
        NodeKind::Op(Instruction::gate(
            Gate::new(name, qubits.len() as u32),
            qubits.iter().map(|&q| QubitId(q)),
        ))
    }

    /// One declared wire: In -> Out.
    fn single_wire() -> (WireGraph, NodeId, NodeId) {
        let mut g = WireGraph::new();
        let input = g.add_node(NodeKind::In(wire(0)));
        let output = g.add_node(NodeKind::Out(wire(0)));
        g.add_edge(input, output, wire(0)).unwrap();
        (g, input, output)
    }

    #[test]
    fn test_ids_are_never_reused() {
        let (mut g, input, output) = single_wire();
        g.remove_edge(input, output, wire(0)).unwrap();
        let a = g.add_node(op("h", &[0]));
        g.add_edge(input, a, wire(0)).unwrap();
        g.add_edge(a, output, wire(0)).unwrap();
        g.remove_node(a).unwrap();

        let b = g.add_node(op("x", &[0]));
        assert!(b > a, "fresh id must be strictly newer than any removed id");
        assert!(!g.contains(a));
    }

    #[test]
    fn test_add_edge_rejects_self_loop() {
        let (mut g, input, _) = single_wire();
        let err = g.add_edge(input, input, wire(0)).unwrap_err();
        assert!(matches!(err, IrError::InvalidEdge(_)));
    }

    #[test]
    fn test_add_edge_rejects_degree_violation() {
        let (mut g, input, output) = single_wire();
        let a = g.add_node(op("h", &[0]));
        // Input already has an outgoing edge on this wire.
        let err = g.add_edge(input, a, wire(0)).unwrap_err();
        assert!(matches!(err, IrError::InvalidEdge(_)));
        // Output already has an incoming edge on this wire.
        let err = g.add_edge(a, output, wire(0)).unwrap_err();
        assert!(matches!(err, IrError::InvalidEdge(_)));
    }

    #[test]
    fn test_remove_node_splices_wire() {
        let (mut g, input, output) = single_wire();
        g.remove_edge(input, output, wire(0)).unwrap();
        let a = g.add_node(op("h", &[0]));
        g.add_edge(input, a, wire(0)).unwrap();
        g.add_edge(a, output, wire(0)).unwrap();

        g.remove_node(a).unwrap();

        assert_eq!(g.successor_on_wire(input, wire(0)), Some(output));
        assert_eq!(g.predecessor_on_wire(output, wire(0)), Some(input));
        assert!(!g.topological_nodes().any(|id| id == a));
    }

    #[test]
    fn test_remove_terminator_rejected() {
        let (mut g, input, output) = single_wire();
        assert!(matches!(
            g.remove_node(input),
            Err(IrError::RemoveTerminator { .. })
        ));
        assert!(matches!(
            g.remove_node(output),
            Err(IrError::RemoveTerminator { .. })
        ));
    }

    #[test]
    fn test_remove_unknown_node() {
        let (mut g, _, _) = single_wire();
        assert!(matches!(
            g.remove_node(NodeId(99)),
            Err(IrError::UnknownNode(NodeId(99)))
        ));
    }

    #[test]
    fn test_topological_tie_break_is_creation_order() {
        // Two independent wires; all four terminators are simultaneously
        // eligible, so the order must be exactly by ascending id.
        let mut g = WireGraph::new();
        let in0 = g.add_node(NodeKind::In(wire(0)));
        let out0 = g.add_node(NodeKind::Out(wire(0)));
        let in1 = g.add_node(NodeKind::In(wire(1)));
        let out1 = g.add_node(NodeKind::Out(wire(1)));
        g.add_edge(in0, out0, wire(0)).unwrap();
        g.add_edge(in1, out1, wire(1)).unwrap();

        let order: Vec<_> = g.topological_nodes().collect();
        assert_eq!(order, vec![in0, out0, in1, out1]);

        // Restartable: same order on an unchanged graph.
        let again: Vec<_> = g.topological_nodes().collect();
        assert_eq!(order, again);
    }

    #[test]
    fn test_ancestors_descendants() {
        let (mut g, input, output) = single_wire();
        g.remove_edge(input, output, wire(0)).unwrap();
        let a = g.add_node(op("h", &[0]));
        let b = g.add_node(op("x", &[0]));
        g.add_edge(input, a, wire(0)).unwrap();
        g.add_edge(a, b, wire(0)).unwrap();
        g.add_edge(b, output, wire(0)).unwrap();

        let anc = g.ancestors(b);
        assert!(anc.contains(&a) && anc.contains(&input));
        assert!(!anc.contains(&b) && !anc.contains(&output));

        let desc = g.descendants(a);
        assert!(desc.contains(&b) && desc.contains(&output));
        assert!(!desc.contains(&input));
    }
}
