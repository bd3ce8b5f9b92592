//! The AST node.
//!
//! Nodes arrive from the parser with their structural fields filled in
//! (`id`, `parent`, `which`, `role`, and the identifier/literal text). The
//! annotation fields start empty and are written during the declare phase.

use crate::{DataType, NodeId, NodeKind, Role, Which};

/// A pending element store for a container literal.
///
/// Owned by the scope that owns the literal; emitted just before `statement`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DeferredStore {
    /// Statement that first uses the container.
    pub statement: NodeId,
    /// The container literal whose elements are stored.
    pub literal: NodeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AstNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub which: Which,
    pub role: Role,
    pub package: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    /// Owned children, in arrival order. Appended by the store on insert.
    pub(crate) children: Vec<NodeId>,

    // Annotations (declare phase)
    pub resolved_type: Option<DataType>,
    pub element_type: Option<DataType>,
    /// Nearest enclosing scope anchor.
    pub scope: Option<NodeId>,
    /// Declaration this variable use resolves to.
    pub reference: Option<NodeId>,
    /// Lifetime-tracked values owned by this scope, in registration order.
    pub scope_vars: Vec<NodeId>,
    pub deferred_stores: Vec<DeferredStore>,
    /// Synthesized name for temporaries.
    pub temp_name: Option<String>,
    /// Set once the node has been appended to a scope's `scope_vars`.
    pub registered: bool,
    /// Set once the declare phase has visited the node.
    pub declared: bool,
}

impl AstNode {
    /// Create a blank node of the given kind with no parent.
    pub fn blank(id: NodeId, which: Which) -> Self {
        AstNode {
            id,
            parent: None,
            which,
            role: Role::None,
            package: None,
            name: None,
            value: None,
            children: Vec::new(),
            resolved_type: None,
            element_type: None,
            scope: None,
            reference: None,
            scope_vars: Vec::new(),
            deferred_stores: Vec::new(),
            temp_name: None,
            registered: false,
            declared: false,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.which.kind()
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Declared name, or the empty string.
    pub fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Literal text, or the empty string.
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    pub fn package_str(&self) -> &str {
        self.package.as_deref().unwrap_or_default()
    }

    /// Name used to refer to this node in generated code: the synthesized
    /// temporary name if one exists, else the declared name.
    pub fn binding_name(&self) -> &str {
        self.temp_name.as_deref().unwrap_or_else(|| self.name_str())
    }

    /// Short human-readable label, e.g. `action.definition Main.addOne`.
    pub fn label(&self) -> String {
        let mut label = self.which.name().to_string();
        let qualified = match (self.package.as_deref(), self.name.as_deref()) {
            (Some(pkg), Some(name)) if !pkg.is_empty() => format!("{pkg}.{name}"),
            (_, Some(name)) => name.to_string(),
            (Some(pkg), None) => pkg.to_string(),
            (None, None) => String::new(),
        };
        if !qualified.is_empty() {
            label.push(' ');
            label.push_str(&qualified);
        }
        if let Some(value) = self.value.as_deref().filter(|v| !v.is_empty()) {
            label.push_str(" \"");
            label.push_str(value);
            label.push('"');
        }
        label
    }
}
