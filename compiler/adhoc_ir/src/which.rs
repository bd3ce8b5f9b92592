//! Node kinds, fine-grained `Which` variants, and child roles.
//!
//! `Which` is a tagged sum: the outer variant is the coarse [`NodeKind`],
//! the payload is the fine-grained operation. Every variant has a stable
//! lowercase name (`"operator.plus"`) used for ingestion and tree dumps.

use std::fmt;
use std::str::FromStr;

/// Coarse node kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// Placeholder left by a parser that never filled the node in.
    Null,
    Action,
    Group,
    Control,
    Operator,
    Assignment,
    Variable,
    Literal,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::Action => "action",
            NodeKind::Group => "group",
            NodeKind::Control => "control",
            NodeKind::Operator => "operator",
            NodeKind::Assignment => "assignment",
            NodeKind::Variable => "variable",
            NodeKind::Literal => "literal",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ActionWhich {
    Definition,
    Call,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ControlWhich {
    If,
    Else,
    Loop,
    Switch,
    Case,
    Fork,
    Continue,
    Break,
    Return,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OperatorWhich {
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    Exponent,
    Or,
    And,
    Not,
    Equal,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    NotEqual,
    Index,
    Ternary,
}

impl OperatorWhich {
    /// Source-level operator token.
    pub fn symbol(self) -> &'static str {
        match self {
            OperatorWhich::Plus => "+",
            OperatorWhich::Minus => "-",
            OperatorWhich::Times => "*",
            OperatorWhich::Divide => "/",
            OperatorWhich::Modulo => "%",
            OperatorWhich::Exponent => "^",
            OperatorWhich::Or => "||",
            OperatorWhich::And => "&&",
            OperatorWhich::Not => "!",
            OperatorWhich::Equal => "==",
            OperatorWhich::Greater => ">",
            OperatorWhich::Less => "<",
            OperatorWhich::GreaterEqual => ">=",
            OperatorWhich::LessEqual => "<=",
            OperatorWhich::NotEqual => "!=",
            OperatorWhich::Index => "[]",
            OperatorWhich::Ternary => "?:",
        }
    }

    /// Comparison operators always produce Bool.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            OperatorWhich::Equal
                | OperatorWhich::Greater
                | OperatorWhich::Less
                | OperatorWhich::GreaterEqual
                | OperatorWhich::LessEqual
                | OperatorWhich::NotEqual
        )
    }

    /// Logical operators (`||`, `&&`, `!`) always produce Bool.
    pub fn is_logical(self) -> bool {
        matches!(self, OperatorWhich::Or | OperatorWhich::And | OperatorWhich::Not)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AssignWhich {
    IncrementPrefix,
    IncrementPostfix,
    DecrementPrefix,
    DecrementPostfix,
    NegatePrefix,
    NegatePostfix,
    Equal,
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    Exponent,
    Or,
    And,
}

impl AssignWhich {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignWhich::IncrementPrefix | AssignWhich::IncrementPostfix => "++",
            AssignWhich::DecrementPrefix | AssignWhich::DecrementPostfix => "--",
            AssignWhich::NegatePrefix | AssignWhich::NegatePostfix => "!!",
            AssignWhich::Equal => "=",
            AssignWhich::Plus => "+=",
            AssignWhich::Minus => "-=",
            AssignWhich::Times => "*=",
            AssignWhich::Divide => "/=",
            AssignWhich::Modulo => "%=",
            AssignWhich::Exponent => "^=",
            AssignWhich::Or => "||=",
            AssignWhich::And => "&&=",
        }
    }

    /// Unary forms (`++`, `--`, `!!`) have a target but no value child.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            AssignWhich::IncrementPrefix
                | AssignWhich::IncrementPostfix
                | AssignWhich::DecrementPrefix
                | AssignWhich::DecrementPostfix
                | AssignWhich::NegatePrefix
                | AssignWhich::NegatePostfix
        )
    }

    /// Forms that force their target to Bool.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            AssignWhich::Or | AssignWhich::And | AssignWhich::NegatePrefix | AssignWhich::NegatePostfix
        )
    }

    /// The binary operator a compound assignment applies, if any.
    pub fn operator(self) -> Option<OperatorWhich> {
        match self {
            AssignWhich::Plus => Some(OperatorWhich::Plus),
            AssignWhich::Minus => Some(OperatorWhich::Minus),
            AssignWhich::Times => Some(OperatorWhich::Times),
            AssignWhich::Divide => Some(OperatorWhich::Divide),
            AssignWhich::Modulo => Some(OperatorWhich::Modulo),
            AssignWhich::Exponent => Some(OperatorWhich::Exponent),
            AssignWhich::Or => Some(OperatorWhich::Or),
            AssignWhich::And => Some(OperatorWhich::And),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VariableWhich {
    /// Introduces a name (assignment target or parameter).
    Declare,
    /// Reads or writes a previously declared name.
    Eval,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LiteralWhich {
    Bool,
    Int,
    Float,
    String,
    Array,
    Hash,
    Struct,
}

/// Fine-grained node kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Which {
    Null,
    Action(ActionWhich),
    /// Sequential block with no syntax of its own.
    Group,
    Control(ControlWhich),
    Operator(OperatorWhich),
    Assignment(AssignWhich),
    Variable(VariableWhich),
    Literal(LiteralWhich),
}

impl Which {
    /// Every variant, in ingestion-code order.
    pub const ALL: &'static [Which] = &[
        Which::Null,
        Which::Action(ActionWhich::Definition),
        Which::Action(ActionWhich::Call),
        Which::Group,
        Which::Control(ControlWhich::If),
        Which::Control(ControlWhich::Else),
        Which::Control(ControlWhich::Loop),
        Which::Control(ControlWhich::Switch),
        Which::Control(ControlWhich::Case),
        Which::Control(ControlWhich::Fork),
        Which::Control(ControlWhich::Continue),
        Which::Control(ControlWhich::Break),
        Which::Control(ControlWhich::Return),
        Which::Operator(OperatorWhich::Plus),
        Which::Operator(OperatorWhich::Minus),
        Which::Operator(OperatorWhich::Times),
        Which::Operator(OperatorWhich::Divide),
        Which::Operator(OperatorWhich::Modulo),
        Which::Operator(OperatorWhich::Exponent),
        Which::Operator(OperatorWhich::Or),
        Which::Operator(OperatorWhich::And),
        Which::Operator(OperatorWhich::Not),
        Which::Operator(OperatorWhich::Equal),
        Which::Operator(OperatorWhich::Greater),
        Which::Operator(OperatorWhich::Less),
        Which::Operator(OperatorWhich::GreaterEqual),
        Which::Operator(OperatorWhich::LessEqual),
        Which::Operator(OperatorWhich::NotEqual),
        Which::Operator(OperatorWhich::Index),
        Which::Operator(OperatorWhich::Ternary),
        Which::Assignment(AssignWhich::IncrementPrefix),
        Which::Assignment(AssignWhich::IncrementPostfix),
        Which::Assignment(AssignWhich::DecrementPrefix),
        Which::Assignment(AssignWhich::DecrementPostfix),
        Which::Assignment(AssignWhich::NegatePrefix),
        Which::Assignment(AssignWhich::NegatePostfix),
        Which::Assignment(AssignWhich::Equal),
        Which::Assignment(AssignWhich::Plus),
        Which::Assignment(AssignWhich::Minus),
        Which::Assignment(AssignWhich::Times),
        Which::Assignment(AssignWhich::Divide),
        Which::Assignment(AssignWhich::Modulo),
        Which::Assignment(AssignWhich::Exponent),
        Which::Assignment(AssignWhich::Or),
        Which::Assignment(AssignWhich::And),
        Which::Variable(VariableWhich::Declare),
        Which::Variable(VariableWhich::Eval),
        Which::Literal(LiteralWhich::Bool),
        Which::Literal(LiteralWhich::Int),
        Which::Literal(LiteralWhich::Float),
        Which::Literal(LiteralWhich::String),
        Which::Literal(LiteralWhich::Array),
        Which::Literal(LiteralWhich::Hash),
        Which::Literal(LiteralWhich::Struct),
    ];

    pub fn kind(self) -> NodeKind {
        match self {
            Which::Null => NodeKind::Null,
            Which::Action(_) => NodeKind::Action,
            Which::Group => NodeKind::Group,
            Which::Control(_) => NodeKind::Control,
            Which::Operator(_) => NodeKind::Operator,
            Which::Assignment(_) => NodeKind::Assignment,
            Which::Variable(_) => NodeKind::Variable,
            Which::Literal(_) => NodeKind::Literal,
        }
    }

    /// Stable name, `kind.variant`.
    pub fn name(self) -> &'static str {
        match self {
            Which::Null => "null",
            Which::Group => "group.serial",
            Which::Action(a) => match a {
                ActionWhich::Definition => "action.definition",
                ActionWhich::Call => "action.call",
            },
            Which::Control(c) => match c {
                ControlWhich::If => "control.if",
                ControlWhich::Else => "control.else",
                ControlWhich::Loop => "control.loop",
                ControlWhich::Switch => "control.switch",
                ControlWhich::Case => "control.case",
                ControlWhich::Fork => "control.fork",
                ControlWhich::Continue => "control.continue",
                ControlWhich::Break => "control.break",
                ControlWhich::Return => "control.return",
            },
            Which::Operator(o) => match o {
                OperatorWhich::Plus => "operator.plus",
                OperatorWhich::Minus => "operator.minus",
                OperatorWhich::Times => "operator.times",
                OperatorWhich::Divide => "operator.divide",
                OperatorWhich::Modulo => "operator.modulo",
                OperatorWhich::Exponent => "operator.exponent",
                OperatorWhich::Or => "operator.or",
                OperatorWhich::And => "operator.and",
                OperatorWhich::Not => "operator.not",
                OperatorWhich::Equal => "operator.equal",
                OperatorWhich::Greater => "operator.greater",
                OperatorWhich::Less => "operator.less",
                OperatorWhich::GreaterEqual => "operator.greater_equal",
                OperatorWhich::LessEqual => "operator.less_equal",
                OperatorWhich::NotEqual => "operator.not_equal",
                OperatorWhich::Index => "operator.index",
                OperatorWhich::Ternary => "operator.ternary",
            },
            Which::Assignment(a) => match a {
                AssignWhich::IncrementPrefix => "assignment.increment_prefix",
                AssignWhich::IncrementPostfix => "assignment.increment_postfix",
                AssignWhich::DecrementPrefix => "assignment.decrement_prefix",
                AssignWhich::DecrementPostfix => "assignment.decrement_postfix",
                AssignWhich::NegatePrefix => "assignment.negate_prefix",
                AssignWhich::NegatePostfix => "assignment.negate_postfix",
                AssignWhich::Equal => "assignment.equal",
                AssignWhich::Plus => "assignment.plus",
                AssignWhich::Minus => "assignment.minus",
                AssignWhich::Times => "assignment.times",
                AssignWhich::Divide => "assignment.divide",
                AssignWhich::Modulo => "assignment.modulo",
                AssignWhich::Exponent => "assignment.exponent",
                AssignWhich::Or => "assignment.or",
                AssignWhich::And => "assignment.and",
            },
            Which::Variable(v) => match v {
                VariableWhich::Declare => "variable.declare",
                VariableWhich::Eval => "variable.eval",
            },
            Which::Literal(l) => match l {
                LiteralWhich::Bool => "literal.bool",
                LiteralWhich::Int => "literal.int",
                LiteralWhich::Float => "literal.float",
                LiteralWhich::String => "literal.string",
                LiteralWhich::Array => "literal.array",
                LiteralWhich::Hash => "literal.hash",
                LiteralWhich::Struct => "literal.struct",
            },
        }
    }

    /// Operator token, if this variant has one.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Which::Operator(o) => Some(o.symbol()),
            Which::Assignment(a) => Some(a.symbol()),
            _ => None,
        }
    }

    /// Nodes that open a lexical scope for their children.
    pub fn is_scope_anchor(self) -> bool {
        matches!(
            self,
            Which::Action(ActionWhich::Definition)
                | Which::Control(
                    ControlWhich::If
                        | ControlWhich::Loop
                        | ControlWhich::Switch
                        | ControlWhich::Case
                        | ControlWhich::Fork
                )
        )
    }
}

impl fmt::Display for Which {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Which {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .find(|which| which.name() == lower)
            .copied()
            .ok_or(())
    }
}

/// Structural purpose of a child within its parent.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Role {
    #[default]
    None,
    Statement,
    Expression,
    Initialization,
    Condition,
    Case,
    Parameter,
    Argument,
    Member,
    If,
    Else,
    /// Target of an assignment.
    Storage,
    /// Subscript of an index operator.
    Index,
}

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::None,
        Role::Statement,
        Role::Expression,
        Role::Initialization,
        Role::Condition,
        Role::Case,
        Role::Parameter,
        Role::Argument,
        Role::Member,
        Role::If,
        Role::Else,
        Role::Storage,
        Role::Index,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Statement => "statement",
            Role::Expression => "expression",
            Role::Initialization => "initialization",
            Role::Condition => "condition",
            Role::Case => "case",
            Role::Parameter => "parameter",
            Role::Argument => "argument",
            Role::Member => "member",
            Role::If => "if",
            Role::Else => "else",
            Role::Storage => "storage",
            Role::Index => "index",
        }
    }

    /// Roles whose children are emitted as statements of a body.
    pub fn is_body(self) -> bool {
        matches!(self, Role::None | Role::Statement | Role::If | Role::Else | Role::Case)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .find(|role| role.name() == lower)
            .copied()
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_names_round_trip() {
        for which in Which::ALL {
            assert_eq!(which.name().parse::<Which>(), Ok(*which));
        }
        for role in Role::ALL {
            assert_eq!(role.name().parse::<Role>(), Ok(*role));
        }
    }

    #[test]
    fn test_kind_prefix_matches_name() {
        for which in Which::ALL {
            assert!(which.name().starts_with(which.kind().name()));
        }
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Which::Operator(OperatorWhich::Ternary).symbol(), Some("?:"));
        assert_eq!(Which::Assignment(AssignWhich::And).symbol(), Some("&&="));
        assert_eq!(Which::Assignment(AssignWhich::NegatePostfix).symbol(), Some("!!"));
        assert_eq!(Which::Group.symbol(), None);
    }

    #[test]
    fn test_scope_anchors() {
        assert!(Which::Action(ActionWhich::Definition).is_scope_anchor());
        assert!(Which::Control(ControlWhich::Loop).is_scope_anchor());
        assert!(!Which::Group.is_scope_anchor());
        assert!(!Which::Control(ControlWhich::Return).is_scope_anchor());
    }

    #[test]
    fn test_compound_assignment_operator() {
        assert_eq!(AssignWhich::Plus.operator(), Some(OperatorWhich::Plus));
        assert_eq!(AssignWhich::Equal.operator(), None);
        assert!(AssignWhich::IncrementPostfix.is_unary());
        assert!(AssignWhich::Or.is_boolean());
    }
}
