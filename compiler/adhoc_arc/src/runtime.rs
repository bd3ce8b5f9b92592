//! Runtime support library ABI.
//!
//! Generated C code links against `libadhoc`, a small reference-counted
//! value runtime. Every complex value is an `adhoc_data*` carrying its
//! reference count, type tag, element type, live count, capacity, and a
//! presence bitmap that allows sparse element stores.

use adhoc_ir::builtins::Builtin;
use adhoc_ir::DataType;

/// Header declaring the runtime.
pub const RUNTIME_HEADER: &str = "libadhoc.h";

/// C type of every complex value.
pub const VALUE_TYPE: &str = "adhoc_data*";

/// Runtime entry points called by generated code.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RuntimeFn {
    CreateString,
    CreateArray,
    Retain,
    Release,
    /// Load a simple element.
    GetElementS,
    /// Load a complex element (borrowed).
    GetElementC,
    /// Store an element, releasing any replaced value and retaining the
    /// new one.
    StoreElement,
    ToString,
    Print,
    Concat,
    Substring,
    Splice,
    Find,
    Append,
    Count,
}

impl RuntimeFn {
    pub const fn symbol(self) -> &'static str {
        match self {
            RuntimeFn::CreateString => "adhoc_createString",
            RuntimeFn::CreateArray => "adhoc_createArray",
            RuntimeFn::Retain => "adhoc_retain",
            RuntimeFn::Release => "adhoc_release",
            RuntimeFn::GetElementS => "adhoc_getElementS",
            RuntimeFn::GetElementC => "adhoc_getElementC",
            RuntimeFn::StoreElement => "adhoc_storeElement",
            RuntimeFn::ToString => "adhoc_toString",
            RuntimeFn::Print => "adhoc_print",
            RuntimeFn::Concat => "adhoc_concat",
            RuntimeFn::Substring => "adhoc_substring",
            RuntimeFn::Splice => "adhoc_splice",
            RuntimeFn::Find => "adhoc_find",
            RuntimeFn::Append => "adhoc_append",
            RuntimeFn::Count => "adhoc_count",
        }
    }

    /// Library routines take a leading string of per-argument type tags.
    pub const fn takes_type_tags(self) -> bool {
        matches!(
            self,
            RuntimeFn::ToString
                | RuntimeFn::Print
                | RuntimeFn::Concat
                | RuntimeFn::Append
                | RuntimeFn::Count
        )
    }
}

impl From<Builtin> for RuntimeFn {
    fn from(builtin: Builtin) -> Self {
        match builtin {
            Builtin::Print => RuntimeFn::Print,
            Builtin::ToString => RuntimeFn::ToString,
            Builtin::Concat => RuntimeFn::Concat,
            Builtin::Substring => RuntimeFn::Substring,
            Builtin::Splice => RuntimeFn::Splice,
            Builtin::Find => RuntimeFn::Find,
            Builtin::Append => RuntimeFn::Append,
            Builtin::Count => RuntimeFn::Count,
        }
    }
}

/// Runtime enum constant for a value type, as passed to `adhoc_createArray`.
pub fn type_constant(ty: DataType) -> Option<&'static str> {
    match ty {
        DataType::Void => Some("ADHOC_VOID"),
        DataType::Bool => Some("ADHOC_BOOL"),
        DataType::Int => Some("ADHOC_INT"),
        DataType::Float => Some("ADHOC_FLOAT"),
        DataType::String => Some("ADHOC_STRING"),
        DataType::Array => Some("ADHOC_ARRAY"),
        DataType::Hash => Some("ADHOC_HASH"),
        DataType::Struct => Some("ADHOC_STRUCT"),
        DataType::Action | DataType::Mixed => None,
    }
}
