//! Abstract syntax tree model for the ADHOC compiler.
//!
//! # Design Philosophy
//!
//! - **Arena storage**: every node lives in a [`NodeStore`] and is addressed
//!   by a parser-assigned [`NodeId`]. Children are owned links; scope,
//!   reference, and deferred-store entries are ids resolved through the store.
//! - **Tagged kinds**: [`Which`] is a sum type whose outer variant is the
//!   coarse [`NodeKind`], so passes dispatch with a single `match`.
//! - **Annotate in place**: scope, type, and lifetime information is written
//!   onto nodes by the declare phase, never at insertion, so one raw tree can
//!   be walked for several backends.
//!
//! # Modules
//!
//! - [`map`]: open-addressing map backing the store
//! - [`builtins`]: runtime library-call registry
//! - [`render`]: text dump of a tree

mod builder;
pub mod builtins;
mod data_type;
pub mod map;
mod node;
mod node_id;
pub mod render;
mod store;
mod which;

pub use builder::TreeBuilder;
pub use data_type::DataType;
pub use node::{AstNode, DeferredStore};
pub use node_id::NodeId;
pub use store::{NodeStore, StoreError};
pub use which::{
    ActionWhich, AssignWhich, ControlWhich, LiteralWhich, NodeKind, OperatorWhich, Role,
    VariableWhich, Which,
};
