//! Proof that an error was reported.

use std::fmt;

/// Type-level proof that at least one error has been written to an
/// [`ErrorSlot`](crate::ErrorSlot).
///
/// Walk functions return `Result<T, ErrorGuaranteed>`; the only way to build
/// the `Err` is to report a diagnostic first.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error(s) emitted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let g = ErrorGuaranteed::new();
        assert_eq!(g.to_string(), "error(s) emitted");
    }
}
