//! The per-backend template interface.
//!
//! The declare and emit walks are written once, in [`crate::declare`] and
//! [`crate::emit`]. A backend supplies only:
//!
//! - **Templates**: target syntax for each construct, as text fragments.
//!   Statement templates return a line without indentation; the driver
//!   places it.
//! - **Policy flags**: whether the target needs explicit retain/release
//!   ([`Emitter::manages_lifetimes`]), whether nested actions move to file
//!   scope ([`Emitter::hoists_actions`]), and whether string literals are
//!   written inline rather than through a temporary
//!   ([`Emitter::inline_strings`]).
//!
//! Fallible templates return a [`Diagnostic`] without a node; the driver
//! attaches the node being emitted.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use adhoc_diagnostic::Diagnostic;
use adhoc_ir::builtins::LibraryDef;
use adhoc_ir::{AssignWhich, ControlWhich, DataType, LiteralWhich, OperatorWhich};

/// Output language.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Target {
    #[default]
    C,
    JavaScript,
}

impl Target {
    pub const ALL: &'static [Target] = &[Target::C, Target::JavaScript];

    pub fn name(self) -> &'static str {
        match self {
            Target::C => "C",
            Target::JavaScript => "JavaScript",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized target name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownTarget(pub String);

impl fmt::Display for UnknownTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown target `{}` (expected `c` or `js`)", self.0)
    }
}

impl std::error::Error for UnknownTarget {}

impl FromStr for Target {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(Target::C),
            "js" | "javascript" => Ok(Target::JavaScript),
            _ => Err(UnknownTarget(s.to_string())),
        }
    }
}

/// Whole-module facts the templates may need.
#[derive(Clone, Debug, Default)]
pub struct ModuleInfo {
    /// Root action name.
    pub root: String,
    pub root_type: DataType,
    pub root_params: usize,
    /// Emit a bootstrap entry point that runs the root action.
    pub executable: bool,
    /// Namespace object for executable JavaScript output.
    pub namespace: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Param<'a> {
    pub name: &'a str,
    pub ty: DataType,
}

/// Signature of an action definition being emitted.
#[derive(Clone, Debug)]
pub struct Signature<'a> {
    pub name: &'a str,
    pub returns: DataType,
    pub params: Vec<Param<'a>>,
    /// Defined in expression position, as a function value.
    pub anonymous: bool,
}

/// An emitted expression with its resolved type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Operand {
    pub text: String,
    pub ty: DataType,
}

impl Operand {
    pub fn new(text: impl Into<String>, ty: DataType) -> Self {
        Operand {
            text: text.into(),
            ty,
        }
    }
}

/// Templates and policy for one target language.
pub trait Emitter {
    fn target(&self) -> Target;

    // ── Policy ──────────────────────────────────────────────────

    /// Insert retain/release calls.
    fn manages_lifetimes(&self) -> bool;

    /// Emit every action definition at file scope, after prototypes.
    fn hoists_actions(&self) -> bool;

    /// Write string literals in place instead of through temporaries.
    fn inline_strings(&self) -> bool;

    /// Values an `Int` literal may take.
    fn int_range(&self) -> RangeInclusive<i64> {
        i64::MIN..=i64::MAX
    }

    // ── Types and declarations ──────────────────────────────────

    fn type_name(&self, ty: DataType) -> Result<String, Diagnostic>;

    /// Local variable declaration, optionally initialized.
    fn local(&self, ty: DataType, name: &str, init: Option<&str>) -> Result<String, Diagnostic>;

    fn null_value(&self) -> &'static str;

    // ── Functions ───────────────────────────────────────────────

    /// Comment line placed above a definition, from its value text.
    fn action_comment(&self, _text: &str) -> Option<String> {
        None
    }

    /// Forward declaration, for targets that hoist.
    fn prototype(
        &self,
        _module: &ModuleInfo,
        _sig: &Signature<'_>,
    ) -> Result<Option<String>, Diagnostic> {
        Ok(None)
    }

    fn function_header(&self, module: &ModuleInfo, sig: &Signature<'_>)
        -> Result<String, Diagnostic>;

    fn function_footer(&self, module: &ModuleInfo, sig: &Signature<'_>) -> &'static str;

    // ── Lifetimes ───────────────────────────────────────────────

    fn retain(&self, value: &str) -> String;

    fn release(&self, value: &str) -> String;

    // ── Literals and containers ─────────────────────────────────

    /// Bool, Int, or Float literal. Bool text is already `true`/`false`.
    fn scalar_literal(&self, _kind: LiteralWhich, text: &str) -> String {
        text.to_string()
    }

    /// Expression creating a string value.
    fn string_literal(&self, text: &str) -> String;

    /// Expression creating an empty container sized for `len` elements.
    fn create_container(
        &self,
        ty: DataType,
        element: DataType,
        len: usize,
    ) -> Result<String, Diagnostic>;

    /// Key expression for a named member of a hash or struct.
    fn member_key(&self, name: &str) -> String {
        quote(name)
    }

    /// Expression storing `value` at `key` in `container`.
    fn store_element(&self, container: &str, key: &str, value: &Operand) -> String;

    /// Expression loading the element of type `ty` at `index`.
    fn load_element(&self, container: &str, index: &str, ty: DataType)
        -> Result<String, Diagnostic>;

    // ── Operators ───────────────────────────────────────────────

    fn binary(
        &self,
        op: OperatorWhich,
        lhs: &Operand,
        rhs: &Operand,
        result: DataType,
    ) -> Result<String, Diagnostic>;

    fn not(&self, operand: &str) -> String {
        format!("!{operand}")
    }

    fn ternary(&self, cond: &str, then: &str, other: &str) -> String {
        format!("({cond} ? {then} : {other})")
    }

    /// Assignment expression. `value` is `None` for the unary forms.
    ///
    /// Forms without a native target operator lower through [`binary`]:
    /// `x ^= v` becomes `x = <x ^ v>`, and the boolean compounds become
    /// `x = x || v` / `x = x && v`. `!!x` is `(x = !x)`; `x!!` yields the
    /// old value, `!(x = !x)`.
    ///
    /// [`binary`]: Emitter::binary
    fn assign(
        &self,
        op: AssignWhich,
        target: &Operand,
        value: Option<&Operand>,
    ) -> Result<String, Diagnostic> {
        let t = &target.text;
        let text = match (op, value) {
            (AssignWhich::IncrementPrefix, _) => format!("++{t}"),
            (AssignWhich::IncrementPostfix, _) => format!("{t}++"),
            (AssignWhich::DecrementPrefix, _) => format!("--{t}"),
            (AssignWhich::DecrementPostfix, _) => format!("{t}--"),
            (AssignWhich::NegatePrefix, _) => format!("({t} = {})", self.not(t)),
            (AssignWhich::NegatePostfix, _) => format!("!({t} = {})", self.not(t)),
            (AssignWhich::Equal, Some(v)) => format!("{t} = {}", v.text),
            (AssignWhich::Exponent | AssignWhich::Or | AssignWhich::And, Some(v)) => {
                let Some(op) = op.operator() else {
                    return Err(missing_value(op));
                };
                let lowered = self.binary(op, target, v, target.ty)?;
                format!("{t} = {lowered}")
            }
            (_, Some(v)) => format!("{t} {} {}", op.symbol(), v.text),
            (_, None) => return Err(missing_value(op)),
        };
        Ok(text)
    }

    // ── Calls ───────────────────────────────────────────────────

    fn call(&self, module: &ModuleInfo, name: &str, args: &[Operand]) -> String;

    fn library_call(&self, def: &LibraryDef, args: &[Operand]) -> Result<String, Diagnostic>;

    // ── Statements ──────────────────────────────────────────────

    fn statement(&self, expr: &str) -> String {
        format!("{expr};")
    }

    fn if_header(&self, cond: &str) -> String {
        format!("if({cond}){{")
    }

    fn else_header(&self) -> &'static str {
        "}else{"
    }

    fn loop_header(&self, init: &str, cond: &str) -> String {
        format!("for({init}; {cond}; ){{")
    }

    fn block_open(&self) -> &'static str {
        "{"
    }

    fn block_close(&self) -> &'static str {
        "}"
    }

    fn jump(&self, which: ControlWhich) -> &'static str {
        match which {
            ControlWhich::Continue => "continue;",
            _ => "break;",
        }
    }

    fn return_stmt(&self, value: Option<&str>) -> String {
        match value {
            Some(v) => format!("return {v};"),
            None => "return;".to_string(),
        }
    }

    // ── Module ──────────────────────────────────────────────────

    fn module_prologue(&self, module: &ModuleInfo) -> Result<Vec<String>, Diagnostic>;

    fn module_epilogue(&self, module: &ModuleInfo) -> Result<Vec<String>, Diagnostic>;
}

fn missing_value(op: AssignWhich) -> Diagnostic {
    Diagnostic::error(adhoc_diagnostic::ErrorCode::E1002)
        .with_message(format!("assignment `{}` is missing its value", op.symbol()))
}

/// Double-quoted literal with `\`, `"`, and control characters escaped.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_target_parse() {
        assert_eq!("c".parse::<Target>(), Ok(Target::C));
        assert_eq!("JS".parse::<Target>(), Ok(Target::JavaScript));
        assert_eq!("javascript".parse::<Target>(), Ok(Target::JavaScript));
        assert!("rust".parse::<Target>().is_err());
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
        assert_eq!(quote(r"a\b"), r#""a\\b""#);
    }
}
