//! Two-phase code generation for the ADHOC compiler.
//!
//! # Architecture
//!
//! Generation runs two walks over the same tree:
//!
//! 1. **Declare** ([`declare`]): annotate every node with its scope, type,
//!    and lifetime bookkeeping. Nothing is written.
//! 2. **Emit** (`emit`): write target text, reading only the annotations.
//!
//! Both walks are shared by every backend. A backend is an [`Emitter`]:
//! a table of syntax templates plus three policy flags. Adding a target
//! means implementing the trait, not copying the walks.
//!
//! # Entry Point
//!
//! ```ignore
//! let output = adhoc_codegen::generate(&mut store, &CEmitter::new(), &GenOptions::default())?;
//! ```

mod c;
pub mod context;
pub mod declare;
mod emit;
pub mod emitter;
mod js;

#[cfg(test)]
mod test_helpers;

pub use c::CEmitter;
pub use context::{CodeWriter, GenContext, GenOptions};
pub use emitter::{Emitter, ModuleInfo, Operand, Param, Signature, Target, UnknownTarget};
pub use js::JsEmitter;

use adhoc_diagnostic::{malformed_node, Diagnostic, ErrorCode};
use adhoc_ir::{ActionWhich, DataType, NodeId, NodeStore, Role, Which};

/// Namespace for executable JavaScript when neither the root's package nor
/// an override names one.
pub const DEFAULT_NAMESPACE: &str = "Adhoc";

/// The backend for `target`.
pub fn emitter_for(target: Target) -> Box<dyn Emitter> {
    match target {
        Target::C => Box::new(CEmitter::new()),
        Target::JavaScript => Box::new(JsEmitter::new()),
    }
}

/// Generate a module from the tree in `store`.
///
/// The tree is annotated in place. Generation stops at the first error,
/// which is returned; no partial output is produced.
#[tracing::instrument(level = "debug", skip_all, fields(target = %emitter.target()))]
pub fn generate(
    store: &mut NodeStore,
    emitter: &dyn Emitter,
    options: &GenOptions,
) -> Result<String, Diagnostic> {
    let Some(root) = store.root() else {
        return Err(Diagnostic::error(ErrorCode::E1002).with_message("the tree is empty"));
    };
    if store[root].which != Which::Action(ActionWhich::Definition) {
        return Err(malformed_node(
            root,
            format!("root must be an action definition, found `{}`", store[root].which),
        ));
    }

    let mut ctx = GenContext::new(emitter);
    ctx.collect_signatures(store);

    if declare::declare_node(&mut ctx, store, root).is_err() {
        return Err(ctx.take_error());
    }
    ctx.module = module_info(store, root, options);

    if emit::emit_module(&mut ctx, store, root).is_err() {
        return Err(ctx.take_error());
    }
    let output = ctx.take_output();
    tracing::debug!(bytes = output.len(), "module generated");
    Ok(output)
}

fn module_info(store: &NodeStore, root: NodeId, options: &GenOptions) -> ModuleInfo {
    let node = &store[root];
    let namespace = node
        .package
        .as_deref()
        .filter(|p| !p.is_empty())
        .or(options.module_name.as_deref())
        .unwrap_or(DEFAULT_NAMESPACE)
        .to_string();
    ModuleInfo {
        root: node.name_str().to_string(),
        root_type: node.resolved_type.unwrap_or(DataType::Void),
        root_params: store.children_with_role(root, Role::Parameter).count(),
        executable: options.executable,
        namespace,
    }
}
