//! Result types for the portable compiler pipeline.
//!
//! These are the interface between the driver and its consumers (CLI,
//! tests). They carry everything needed to report a run without exposing
//! generation internals.

use adhoc_diagnostic::{Diagnostic, ErrorKind};

/// Which stage of the pipeline rejected the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPhase {
    /// The tree itself is malformed.
    Structure,
    /// Type resolution or library-call checking failed.
    Analysis,
    /// The selected backend cannot express the program.
    Target,
}

impl ErrorPhase {
    pub fn of(diagnostic: &Diagnostic) -> Self {
        match diagnostic.kind() {
            ErrorKind::Structural => ErrorPhase::Structure,
            ErrorKind::UnresolvedType | ErrorKind::LibraryCall => ErrorPhase::Analysis,
            ErrorKind::UnsupportedConstruct | ErrorKind::LanguageConstraint => ErrorPhase::Target,
        }
    }
}

/// Result of compiling one tree.
#[derive(Clone, Debug)]
pub struct CompileOutput {
    /// Whether generation completed without errors.
    pub success: bool,
    /// Generated source (empty on failure).
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Which phase produced the error (if any).
    pub error_phase: Option<ErrorPhase>,
}

impl CompileOutput {
    pub(crate) fn succeeded(code: String) -> Self {
        CompileOutput {
            success: true,
            code,
            diagnostics: Vec::new(),
            error_phase: None,
        }
    }

    pub(crate) fn failed(diagnostic: Diagnostic) -> Self {
        CompileOutput {
            success: false,
            code: String::new(),
            error_phase: Some(ErrorPhase::of(&diagnostic)),
            diagnostics: vec![diagnostic],
        }
    }

    /// The first error, if any.
    pub fn error(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.is_error())
    }
}
