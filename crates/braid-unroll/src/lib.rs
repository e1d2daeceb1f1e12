//! Braid Gate Unrolling
//!
//! This crate expands circuits from the [`braid_ir`] IR into a stream of
//! target-basis primitives. It is configuration-driven: the caller supplies
//! the basis gate set and an explicit decomposition table, and implements
//! [`BackendSink`] to receive the resulting instruction stream.
//!
//! # Overview
//!
//! The [`Unroller`] walks the circuit in its deterministic topological order.
//! Gates in the [`BasisGates`] set pass through unchanged; every other gate
//! is replaced in place by its [`GateTemplate`] body, recursively, until only
//! basis gates remain. Measurements, resets and barriers are always
//! primitive. Definition cycles are detected with an explicit expansion
//! stack and reported as [`UnrollError::RecursiveDefinition`].
//!
//! # Example
//!
//! ```rust
//! use braid_ir::{Circuit, Gate, QubitId, RegisterKind};
//! use braid_unroll::{
//!     BackendSink, BasisGates, DecompositionTable, GateSignature, GateTemplate, UnrollConfig,
//!     Unroller,
//! };
//!
//! // CX expands to H(target) · CZ · H(target).
//! let mut body = Circuit::new("cx");
//! body.add_register("q", RegisterKind::Quantum, 2).unwrap();
//! body.gate(Gate::new("h", 1), [QubitId(1)]).unwrap();
//! body.gate(Gate::new("cz", 2), [QubitId(0), QubitId(1)]).unwrap();
//! body.gate(Gate::new("h", 1), [QubitId(1)]).unwrap();
//!
//! let mut definitions = DecompositionTable::new();
//! definitions.insert(GateSignature::new("cx", 2), GateTemplate::new(body));
//! let config = UnrollConfig::new(BasisGates::new(["h", "cz"]), definitions);
//!
//! struct Counter(usize);
//! impl BackendSink for Counter {
//!     fn start(&mut self, _: &[braid_ir::Register]) {}
//!     fn apply(
//!         &mut self,
//!         _: &str,
//!         _: &[braid_ir::ParameterExpression],
//!         _: &[QubitId],
//!         _: Option<&braid_ir::ClassicalCondition>,
//!     ) {
//!         self.0 += 1;
//!     }
//!     fn measure(&mut self, _: QubitId, _: braid_ir::ClbitId) {}
//!     fn reset(&mut self, _: QubitId) {}
//!     fn barrier(&mut self, _: &[QubitId]) {}
//!     fn end(&mut self) {}
//! }
//!
//! let mut circuit = Circuit::new("bell");
//! circuit.add_register("q", RegisterKind::Quantum, 2).unwrap();
//! circuit.gate(Gate::new("h", 1), [QubitId(0)]).unwrap();
//! circuit.gate(Gate::new("cx", 2), [QubitId(0), QubitId(1)]).unwrap();
//!
//! let mut sink = Counter(0);
//! Unroller::new(&config).run(&circuit, &mut sink).unwrap();
//! assert_eq!(sink.0, 4); // h, then h·cz·h
//! ```

pub mod basis;
pub mod error;
pub mod sink;
pub mod template;
pub mod unroller;

pub use basis::BasisGates;
pub use error::{UnrollError, UnrollResult};
pub use sink::BackendSink;
pub use template::{DecompositionTable, GateSignature, GateTemplate};
pub use unroller::{UnrollConfig, Unroller};
