//! Value types carried by AST nodes.

use std::fmt;
use std::str::FromStr;

/// The value type of a node.
///
/// Variants are declared in rank order; the derived `Ord` is the ranking
/// used by type widening (`Void < Bool < ... < Mixed`).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum DataType {
    #[default]
    Void,
    Bool,
    Int,
    Float,
    String,
    Array,
    Hash,
    Struct,
    Action,
    Mixed,
}

impl DataType {
    /// All types in rank order.
    pub const ALL: &'static [DataType] = &[
        DataType::Void,
        DataType::Bool,
        DataType::Int,
        DataType::Float,
        DataType::String,
        DataType::Array,
        DataType::Hash,
        DataType::Struct,
        DataType::Action,
        DataType::Mixed,
    ];

    /// Position in the widening order.
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::Void => "Void",
            DataType::Bool => "Bool",
            DataType::Int => "Int",
            DataType::Float => "Float",
            DataType::String => "String",
            DataType::Array => "Array",
            DataType::Hash => "Hash",
            DataType::Struct => "Struct",
            DataType::Action => "Action",
            DataType::Mixed => "Mixed",
        }
    }

    /// Whether this is a container type (elements are addressed by index or key).
    pub fn is_container(self) -> bool {
        matches!(self, DataType::Array | DataType::Hash | DataType::Struct)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a type annotation such as `"int"` or `"String"`. Case-insensitive.
impl FromStr for DataType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or(())
    }
}
