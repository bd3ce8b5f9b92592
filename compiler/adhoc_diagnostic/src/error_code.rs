//! Error codes and the error taxonomy they belong to.

use std::fmt;

/// Broad class of a compilation failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// A malformed or placeholder node reached a phase that cannot handle it.
    Structural,
    /// A value was read before its type was determined.
    UnresolvedType,
    /// A control form the backend does not implement.
    UnsupportedConstruct,
    /// Unknown runtime call, or an argument count/type mismatch.
    LibraryCall,
    /// A construct with no equivalent in the target language.
    LanguageConstraint,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Structural => "StructuralError",
            ErrorKind::UnresolvedType => "UnresolvedTypeError",
            ErrorKind::UnsupportedConstruct => "UnsupportedConstructError",
            ErrorKind::LibraryCall => "LibraryCallError",
            ErrorKind::LanguageConstraint => "LanguageConstraintError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Searchable error code.
///
/// - `E1xxx`: structural
/// - `E2xxx`: types
/// - `E3xxx`: unsupported constructs
/// - `E4xxx`: library calls
/// - `E5xxx`: target language constraints
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorCode {
    /// Placeholder (null) node reached emission
    E1001,
    /// Node is missing a required child or has malformed literal text
    E1002,
    /// `break`/`continue` outside of a loop
    E1003,
    /// Source name uses a prefix reserved for generated locals
    E1004,
    /// Value read before its type was resolved
    E2001,
    /// An action's returns do not agree on a type
    E2002,
    /// Control form not implemented by the backend
    E3001,
    /// Unknown library call
    E4001,
    /// Library call argument count mismatch
    E4002,
    /// Library call argument type mismatch
    E4003,
    /// Construct has no equivalent in the target language
    E5001,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E3001,
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E5001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E5001 => "E5001",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E1001 | ErrorCode::E1002 | ErrorCode::E1003 | ErrorCode::E1004 => {
                ErrorKind::Structural
            }
            ErrorCode::E2001 | ErrorCode::E2002 => ErrorKind::UnresolvedType,
            ErrorCode::E3001 => ErrorKind::UnsupportedConstruct,
            ErrorCode::E4001 | ErrorCode::E4002 | ErrorCode::E4003 => ErrorKind::LibraryCall,
            ErrorCode::E5001 => ErrorKind::LanguageConstraint,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
