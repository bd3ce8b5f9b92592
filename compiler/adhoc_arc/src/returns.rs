//! Return statement states.
//!
//! A return moves through `NotDeclared → Declared → Emitted`. The declare
//! phase sets the node's `declared` flag; the emit phase records emission
//! here. Emitting an undeclared return, or one twice, is a driver bug.

use adhoc_ir::{NodeId, NodeStore};
use rustc_hash::FxHashSet;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReturnState {
    NotDeclared,
    Declared,
    Emitted,
}

/// Emission record for return statements.
#[derive(Clone, Debug, Default)]
pub struct ReturnTracker {
    emitted: FxHashSet<NodeId>,
}

impl ReturnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, store: &NodeStore, ret: NodeId) -> ReturnState {
        if self.emitted.contains(&ret) {
            ReturnState::Emitted
        } else if store[ret].declared {
            ReturnState::Declared
        } else {
            ReturnState::NotDeclared
        }
    }

    /// Move `ret` from `Declared` to `Emitted`.
    ///
    /// On any other starting state the tracker is unchanged and that state
    /// is returned as the error.
    pub fn mark_emitted(&mut self, store: &NodeStore, ret: NodeId) -> Result<(), ReturnState> {
        match self.state(store, ret) {
            ReturnState::Declared => {
                self.emitted.insert(ret);
                Ok(())
            }
            other => Err(other),
        }
    }
}
