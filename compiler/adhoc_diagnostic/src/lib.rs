//! Diagnostics for the ADHOC compiler.
//!
//! Every failure carries an [`ErrorCode`] that maps to one of five
//! [`ErrorKind`]s, a message, and optionally the node it was detected at.
//!
//! # Error Guarantees
//!
//! Compilation is fail-fast: passes write to a single [`ErrorSlot`] and
//! unwind. `ErrorGuaranteed` is proof that the slot was written:
//!
//! ```text
//! fn declare(&mut self, id: NodeId) -> Result<(), ErrorGuaranteed> {
//!     if bad { return Err(self.errors.report(diag)); }
//!     self.declare(child)?;
//! }
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
mod slot;

pub use diagnostic::{malformed_node, no_target_equivalent, unresolved_type, Diagnostic, Severity};
pub use error_code::{ErrorCode, ErrorKind};
pub use guarantee::ErrorGuaranteed;
pub use slot::ErrorSlot;
