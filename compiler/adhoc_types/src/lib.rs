//! Type resolution for the ADHOC compiler.
//!
//! The language is dynamically shaped but its targets are not, so every
//! value-producing node gets a [`DataType`](adhoc_ir::DataType) during the
//! declare walk. Two pieces:
//!
//! - [`lattice`]: the symmetric widening function `resolve`
//! - [`infer`]: per-kind rules applied bottom-up, plus the return-type policy

pub mod infer;
pub mod lattice;

pub use infer::{infer_node, literal_type, type_of, ReturnTypes};
pub use lattice::{element_type, resolve};
