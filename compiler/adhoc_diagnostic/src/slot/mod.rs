//! The shared error slot.
//!
//! One slot is threaded through a whole compilation. The first report wins;
//! later reports are counted but not kept. Every report yields an
//! [`ErrorGuaranteed`], so walks propagate failure with `?` right after each
//! recursive call.

use crate::{Diagnostic, ErrorGuaranteed};

#[derive(Debug, Default)]
pub struct ErrorSlot {
    first: Option<Diagnostic>,
    suppressed: usize,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `diag` unless an earlier error already occupies the slot.
    pub fn report(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        if self.first.is_none() {
            tracing::debug!(code = %diag.code, node = ?diag.node, "error recorded");
            self.first = Some(diag);
        } else {
            self.suppressed += 1;
            tracing::trace!(code = %diag.code, "error suppressed; slot already set");
        }
        ErrorGuaranteed::new()
    }

    /// Reports that arrived after the slot was set.
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    pub fn take(&mut self) -> Option<Diagnostic> {
        self.suppressed = 0;
        self.first.take()
    }
}
