//! Lifetime analysis for heap values.
//!
//! This crate provides:
//!
//! - **Classification** ([`ArcClass`]): String, Array, Hash, and Struct
//!   values are [`Complex`](ArcClass::Complex) (heap allocated, reference
//!   counted); everything else is [`Simple`](ArcClass::Simple).
//! - **Temporaries** ([`temps`]): which anonymous complex values get a
//!   synthesized, scope-registered name, and what that name is.
//! - **Ownership** ([`ownership`]): whether an expression yields a fresh
//!   reference (owned) or one held elsewhere (borrowed).
//! - **Exit plans** ([`exits`]): which scope variables to release at a
//!   fallthrough, a return, or a loop jump, and which value a return moves.
//! - **Return states** ([`ReturnTracker`]): the `NotDeclared → Declared →
//!   Emitted` progression of each return statement.
//! - **Runtime ABI** ([`runtime`]): symbol names of the C support library.
//!
//! # Reference counting contract
//!
//! A complex parameter is retained once on entry. Every complex scope
//! variable is released exactly once on every exit path, except a returned
//! value, which is moved to the caller untouched.

pub mod exits;
pub mod ownership;
mod returns;
pub mod runtime;
pub mod temps;

use adhoc_ir::{DataType, NodeId, NodeStore};

pub use exits::{
    fallthrough_releases, jump_releases, moved_value, parameter_retains, return_releases,
    ReleasePlan,
};
pub use ownership::{ownership_of, Ownership};
pub use returns::{ReturnState, ReturnTracker};
pub use temps::{
    is_discarded_result, needs_result_temp, needs_return_temp, reserved_prefix, scope_var_kind,
    swap_name, ScopeVarKind, TempKind,
};

/// ARC classification for a value type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArcClass {
    /// Plain value; no reference counting.
    Simple,
    /// Heap value with a reference count.
    Complex,
}

/// Classification of types (and of typed nodes).
pub trait ArcClassification {
    fn arc_class(&self) -> ArcClass;

    #[inline]
    fn is_complex(&self) -> bool {
        self.arc_class() == ArcClass::Complex
    }
}

impl ArcClassification for DataType {
    fn arc_class(&self) -> ArcClass {
        match self {
            DataType::String | DataType::Array | DataType::Hash | DataType::Struct => {
                ArcClass::Complex
            }
            DataType::Void
            | DataType::Bool
            | DataType::Int
            | DataType::Float
            | DataType::Action
            | DataType::Mixed => ArcClass::Simple,
        }
    }
}

/// A node is complex when its resolved type is. Untyped nodes are simple.
pub fn is_complex_node(store: &NodeStore, id: NodeId) -> bool {
    store[id].resolved_type.is_some_and(|ty| ty.is_complex())
}
