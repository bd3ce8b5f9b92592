//! The `Diagnostic` type.

use std::fmt;

use adhoc_ir::NodeId;

use crate::{ErrorCode, ErrorKind};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A compilation failure, optionally tagged with the offending node.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    /// Node the failure was detected at.
    pub node: Option<NodeId>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Diagnostic {
            code,
            severity: Severity::Error,
            message: String::new(),
            node: None,
            notes: Vec::new(),
        }
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Self::error(code)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Tag with `node` unless already tagged with a more specific one.
    pub fn or_node(mut self, node: NodeId) -> Self {
        self.node.get_or_insert(node);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if let Some(node) = self.node {
            write!(f, "\n  --> node {node}")?;
        }
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

// Constructors for common failures

/// A node's type was read before the type resolver set it.
pub fn unresolved_type(node: NodeId, label: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!("type of `{label}` was read before it was resolved"))
        .with_node(node)
}

/// A node is missing a child the construct requires.
pub fn malformed_node(node: NodeId, what: impl fmt::Display) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1002)
        .with_message(format!("malformed node: {what}"))
        .with_node(node)
}

/// The target language cannot express a construct.
pub fn no_target_equivalent(target: &str, what: impl fmt::Display) -> Diagnostic {
    Diagnostic::error(ErrorCode::E5001).with_message(format!("{what} has no {target} equivalent"))
}

#[cfg(test)]
mod tests;
