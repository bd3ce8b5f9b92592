//! Portable ADHOC compiler pipeline.
//!
//! Takes an already-built tree and produces target source text. No
//! filesystem access and no global state: the CLI and tests drive the same
//! entry points.
//!
//! # Usage
//!
//! ```ignore
//! use adhoc_compiler::{compile, CompileConfig};
//!
//! let output = compile(&store, &CompileConfig::default());
//! if output.success {
//!     println!("{}", output.code);
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! adhoc_ir ─┬─ adhoc_scope ─┐
//!           ├─ adhoc_types ─┼─ adhoc_codegen ── adhoc_compiler ── adhocc
//!           └─ adhoc_arc ───┘
//! ```

mod output;
mod pipeline;

pub use output::{CompileOutput, ErrorPhase};
pub use pipeline::{compile, compile_in_place, CompileConfig};
