//! Registry of runtime library calls.
//!
//! A call whose package is [`LIBRARY_PACKAGE`] names a routine of the runtime
//! support library rather than a user action. Each routine is described by a
//! [`LibraryDef`]: its parameters, whether the last parameter repeats, and its
//! result type. Type inference reads the result type; code generation checks
//! the arguments and lowers the call.
//!
//! ```ignore
//! use adhoc_ir::builtins::find_library_call;
//!
//! let def = find_library_call("substring").unwrap();
//! assert_eq!(def.returns, DataType::String);
//! ```

use std::fmt;

use crate::DataType;

/// Package name that marks library calls.
pub const LIBRARY_PACKAGE: &str = "System";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Builtin {
    Print,
    ToString,
    Concat,
    Substring,
    Splice,
    Find,
    Append,
    Count,
}

/// Specification for a library-call parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParamSpec {
    /// Any value with a runtime type tag.
    Printable,
    /// Exactly this type.
    Type(DataType),
}

impl ParamSpec {
    pub fn accepts(self, ty: DataType) -> bool {
        match self {
            ParamSpec::Printable => type_tag(ty).is_some(),
            ParamSpec::Type(expected) => expected == ty,
        }
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSpec::Printable => f.write_str("a printable value"),
            ParamSpec::Type(ty) => write!(f, "{ty}"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LibraryDef {
    pub builtin: Builtin,
    pub name: &'static str,
    pub params: &'static [ParamSpec],
    /// The last parameter may repeat (one or more times).
    pub variadic: bool,
    pub returns: DataType,
}

impl LibraryDef {
    const fn new(
        builtin: Builtin,
        name: &'static str,
        params: &'static [ParamSpec],
        variadic: bool,
        returns: DataType,
    ) -> Self {
        Self {
            builtin,
            name,
            params,
            variadic,
            returns,
        }
    }

    /// Expected parameter at `position`, accounting for a variadic tail.
    pub fn param(&self, position: usize) -> Option<ParamSpec> {
        match self.params.get(position) {
            Some(spec) => Some(*spec),
            None if self.variadic => self.params.last().copied(),
            None => None,
        }
    }

    pub fn accepts_count(&self, count: usize) -> bool {
        if self.variadic {
            count >= self.params.len()
        } else {
            count == self.params.len()
        }
    }

    /// Human-readable arity, e.g. `exactly 3` or `at least 1`.
    pub fn arity(&self) -> String {
        let n = self.params.len();
        let noun = if n == 1 { "argument" } else { "arguments" };
        if self.variadic {
            format!("at least {n} {noun}")
        } else {
            format!("exactly {n} {noun}")
        }
    }
}

const PRINTABLE: ParamSpec = ParamSpec::Printable;
const STRING: ParamSpec = ParamSpec::Type(DataType::String);
const INT: ParamSpec = ParamSpec::Type(DataType::Int);

/// All library calls.
pub static LIBRARY: &[LibraryDef] = &[
    LibraryDef::new(Builtin::Print, "print", &[PRINTABLE], true, DataType::Void),
    LibraryDef::new(Builtin::ToString, "toString", &[PRINTABLE], false, DataType::String),
    LibraryDef::new(Builtin::Concat, "concat", &[PRINTABLE], true, DataType::String),
    LibraryDef::new(Builtin::Substring, "substring", &[STRING, INT, INT], false, DataType::String),
    LibraryDef::new(
        Builtin::Splice,
        "splice",
        &[STRING, INT, INT, STRING],
        false,
        DataType::String,
    ),
    LibraryDef::new(Builtin::Find, "find", &[STRING, STRING], false, DataType::Int),
    LibraryDef::new(Builtin::Append, "append", &[STRING, PRINTABLE], true, DataType::Void),
    LibraryDef::new(Builtin::Count, "count", &[PRINTABLE], false, DataType::Int),
];

/// Look up a library call by name.
pub fn find_library_call(name: &str) -> Option<&'static LibraryDef> {
    LIBRARY.iter().find(|def| def.name == name)
}

/// Whether a call's package marks it as a library call.
pub fn is_library_package(package: Option<&str>) -> bool {
    package == Some(LIBRARY_PACKAGE)
}

/// Runtime type tag for a value passed to a library call.
///
/// Void, Action, and Mixed values have no runtime representation.
pub fn type_tag(ty: DataType) -> Option<char> {
    match ty {
        DataType::Bool => Some('b'),
        DataType::Int => Some('i'),
        DataType::Float => Some('f'),
        DataType::String => Some('s'),
        DataType::Array => Some('a'),
        DataType::Hash => Some('h'),
        DataType::Struct => Some('t'),
        DataType::Void | DataType::Action | DataType::Mixed => None,
    }
}
