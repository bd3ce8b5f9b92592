//! Core compilation pipeline: declare (scope, types, lifetimes) → emit.
//!
//! Portable (no filesystem IO). The tree comes in as a [`NodeStore`],
//! results come out as [`CompileOutput`].

use adhoc_codegen::{emitter_for, GenOptions, Target};
use adhoc_ir::NodeStore;

use crate::output::CompileOutput;

/// Configuration for a compilation run.
#[derive(Clone, Debug)]
pub struct CompileConfig {
    pub target: Target,
    /// Emit a bootstrap entry point that runs the root action.
    pub executable: bool,
    /// Namespace override for executable JavaScript.
    pub module_name: Option<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            target: Target::C,
            executable: false,
            module_name: None,
        }
    }
}

impl CompileConfig {
    fn gen_options(&self) -> GenOptions {
        GenOptions {
            executable: self.executable,
            module_name: self.module_name.clone(),
        }
    }
}

/// Compile a copy of `store`, leaving the caller's tree unannotated.
///
/// The same raw tree can be compiled once per backend this way.
pub fn compile(store: &NodeStore, config: &CompileConfig) -> CompileOutput {
    let mut working = store.clone();
    compile_in_place(&mut working, config)
}

/// Compile `store`, writing declare-phase annotations onto its nodes.
#[tracing::instrument(level = "debug", skip_all, fields(target = %config.target))]
pub fn compile_in_place(store: &mut NodeStore, config: &CompileConfig) -> CompileOutput {
    let emitter = emitter_for(config.target);
    match adhoc_codegen::generate(store, emitter.as_ref(), &config.gen_options()) {
        Ok(code) => CompileOutput::succeeded(code),
        Err(diagnostic) => {
            tracing::debug!(code = %diagnostic.code, "compilation failed");
            CompileOutput::failed(diagnostic)
        }
    }
}
