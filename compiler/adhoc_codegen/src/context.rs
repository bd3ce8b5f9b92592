//! Generation context and state.
//!
//! The `GenContext` is threaded through every declare and emit call in
//! place of module-level globals. It holds the backend, the shared error
//! slot, whole-program signature tables, and the output buffer.

use adhoc_arc::ReturnTracker;
use adhoc_diagnostic::{Diagnostic, ErrorCode, ErrorGuaranteed, ErrorSlot};
use adhoc_ir::{ActionWhich, DataType, NodeId, NodeStore, Which};
use adhoc_types::ReturnTypes;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::emitter::{Emitter, ModuleInfo};

/// Options that shape the generated module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenOptions {
    /// Emit a bootstrap entry point that runs the root action.
    pub executable: bool,
    /// Namespace override for executable JavaScript output.
    pub module_name: Option<String>,
}

/// Indented, append-only text buffer.
#[derive(Debug, Default)]
pub struct CodeWriter {
    indent: usize,
    output: String,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            indent: 0,
            output: String::with_capacity(4096),
        }
    }

    /// A writer that starts at `indent` levels.
    pub fn at_level(indent: usize) -> Self {
        Self {
            indent,
            output: String::new(),
        }
    }

    pub fn level(&self) -> usize {
        self.indent
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Increase indentation level.
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease indentation level.
    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write indentation to output.
    pub fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push('\t');
        }
    }

    /// Write a line to output (with indentation and newline).
    pub fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    /// Write a newline.
    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    /// Take the generated output.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

/// Generation context.
pub struct GenContext<'a> {
    pub emitter: &'a dyn Emitter,
    /// Filled in once the root action is declared.
    pub module: ModuleInfo,
    pub(crate) out: CodeWriter,
    errors: ErrorSlot,
    /// Action definitions by name, in tree order.
    signatures: FxHashMap<String, SmallVec<[NodeId; 1]>>,
    /// Return types seen per action definition.
    returns: FxHashMap<NodeId, ReturnTypes>,
    /// Actions whose declaration has started but not finished.
    in_progress: FxHashSet<NodeId>,
    pub(crate) return_states: ReturnTracker,
}

impl<'a> GenContext<'a> {
    pub fn new(emitter: &'a dyn Emitter) -> Self {
        Self {
            emitter,
            module: ModuleInfo::default(),
            out: CodeWriter::new(),
            errors: ErrorSlot::new(),
            signatures: FxHashMap::default(),
            returns: FxHashMap::default(),
            in_progress: FxHashSet::default(),
            return_states: ReturnTracker::new(),
        }
    }

    // ── Errors ──────────────────────────────────────────────────

    /// Report `diag` into the shared slot.
    pub fn fail(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        self.errors.report(diag)
    }

    /// Convert a template or analysis result, tagging errors with `node`.
    pub fn check<T>(
        &mut self,
        result: Result<T, Diagnostic>,
        node: NodeId,
    ) -> Result<T, ErrorGuaranteed> {
        result.map_err(|diag| self.fail(diag.or_node(node)))
    }

    /// The reported error. Call only after a walk returned `Err`.
    pub fn take_error(&mut self) -> Diagnostic {
        let suppressed = self.errors.suppressed();
        if suppressed > 0 {
            tracing::debug!(suppressed, "later errors were suppressed");
        }
        self.errors.take().unwrap_or_else(|| {
            Diagnostic::error(ErrorCode::E1002)
                .with_message("generation failed without a diagnostic")
        })
    }

    // ── Output ──────────────────────────────────────────────────

    pub fn writeln(&mut self, s: &str) {
        self.out.writeln(s);
    }

    pub fn take_output(&mut self) -> String {
        self.out.take_output()
    }

    // ── Signatures ──────────────────────────────────────────────

    /// Index every action definition by name.
    pub fn collect_signatures(&mut self, store: &NodeStore) {
        for (id, _) in store.preorder() {
            let node = &store[id];
            if node.which == Which::Action(ActionWhich::Definition) {
                self.signatures
                    .entry(node.name_str().to_string())
                    .or_default()
                    .push(id);
            }
        }
        tracing::debug!(count = self.signatures.len(), "action signatures collected");
    }

    /// Definition a call to `package.name` targets. A call without a
    /// package matches the first definition of that name.
    pub fn find_definition(
        &self,
        store: &NodeStore,
        package: Option<&str>,
        name: &str,
    ) -> Option<NodeId> {
        let candidates = self.signatures.get(name)?;
        match package.filter(|p| !p.is_empty()) {
            Some(package) => candidates
                .iter()
                .copied()
                .find(|&def| store[def].package.as_deref() == Some(package))
                .or_else(|| candidates.first().copied()),
            None => candidates.first().copied(),
        }
    }

    // ── Return types ────────────────────────────────────────────

    pub(crate) fn begin_action(&mut self, action: NodeId) {
        self.in_progress.insert(action);
        self.returns.entry(action).or_default();
    }

    pub(crate) fn end_action(&mut self, action: NodeId) -> Result<DataType, Diagnostic> {
        self.in_progress.remove(&action);
        self.returns
            .get(&action)
            .map_or(Ok(DataType::Void), |r| r.finish(action))
    }

    pub(crate) fn is_in_progress(&self, action: NodeId) -> bool {
        self.in_progress.contains(&action)
    }

    pub(crate) fn record_return(
        &mut self,
        action: NodeId,
        ret: NodeId,
        has_value: bool,
        ty: DataType,
    ) {
        self.returns
            .entry(action)
            .or_default()
            .record(ret, has_value, ty);
    }

    /// Widened type of the returns declared so far in `action`.
    pub(crate) fn provisional_type(&self, action: NodeId) -> DataType {
        self.returns
            .get(&action)
            .map_or(DataType::Void, ReturnTypes::provisional)
    }
}
