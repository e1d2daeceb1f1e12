//! Braid Circuit Intermediate Representation
//!
//! This crate provides the core data structures for representing quantum
//! circuits in Braid. It forms the foundation of the Braid compilation stack.
//!
//! # Overview
//!
//! Circuits are stored as a DAG over wires: each quantum or classical wire is
//! a chain of nodes running from an input terminator to an output terminator,
//! with operation nodes spliced in between. Edges carry the wire they belong
//! to, so dependency order between operations sharing a wire is explicit in
//! the graph. The high-level [`Circuit`] API owns the register table and
//! validates every mutation before it reaches the graph.
//!
//! # Core Components
//!
//! - **Wires**: [`QubitId`], [`ClbitId`] and [`WireId`] for addressing
//!   quantum and classical wires
//! - **Registers**: [`Register`] mapping `(name, index)` pairs onto dense
//!   wire ids
//! - **Parameters**: [`ParameterExpression`] for symbolic gate parameters
//! - **Instructions**: [`Instruction`] combining an operation with its
//!   operands and an optional classical condition
//! - **Graph**: [`WireGraph`] for the wire-level DAG
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use braid_ir::{Circuit, ClbitId, Gate, QubitId, RegisterKind};
//!
//! let mut circuit = Circuit::new("bell_state");
//! circuit.add_register("q", RegisterKind::Quantum, 2).unwrap();
//! circuit.add_register("c", RegisterKind::Classical, 2).unwrap();
//!
//! // Build the Bell state: |00⟩ → (|00⟩ + |11⟩)/√2
//! circuit.gate(Gate::new("h", 1), [QubitId(0)]).unwrap();
//! circuit.gate(Gate::new("cx", 2), [QubitId(0), QubitId(1)]).unwrap();
//!
//! circuit.measure(QubitId(0), ClbitId(0)).unwrap();
//! circuit.measure(QubitId(1), ClbitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3); // h, cx, measure
//! ```
//!
//! # Example: Parameterized Circuit
//!
//! ```rust
//! use braid_ir::{Circuit, Gate, ParameterExpression, QubitId, RegisterKind};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::new("variational");
//! circuit.add_register("q", RegisterKind::Quantum, 1).unwrap();
//!
//! let theta = ParameterExpression::symbol("theta");
//! circuit
//!     .gate(Gate::new("rx", 1).with_params(vec![theta.clone()]), [QubitId(0)])
//!     .unwrap();
//!
//! // Later, bind the parameter to a concrete value
//! let bound = theta.bind("theta", PI / 4.0);
//! assert!(!bound.is_symbolic());
//! ```

pub mod circuit;
pub mod error;
pub mod graph;
pub mod instruction;
pub mod parameter;
pub mod register;
pub mod wire;

pub use circuit::{Circuit, Position};
pub use error::{IrError, IrResult};
pub use graph::{NodeId, NodeKind, WireGraph};
pub use instruction::{ClassicalCondition, Gate, Instruction, InstructionKind};
pub use parameter::ParameterExpression;
pub use register::{Register, RegisterKind};
pub use wire::{ClbitId, QubitId, WireId};
