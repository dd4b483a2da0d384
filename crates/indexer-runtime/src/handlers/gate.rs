//! # Confirmation Gate
//!
//! Only blocks buried under at least `x_confirmations` blocks get indexed.

use shared_types::Block;

/// Verdict for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Accept,
    Discard { confirmations: u64, required: u64 },
}

impl GateDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, GateDecision::Accept)
    }
}

/// Stateless confirmation-depth filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationGate {
    required: u64,
}

impl ConfirmationGate {
    pub fn new(x_confirmations: u64) -> Self {
        Self {
            required: x_confirmations,
        }
    }

    pub fn required(&self) -> u64 {
        self.required
    }

    /// Accept iff `block.confirmations >= x_confirmations`.
    pub fn inspect(&self, block: &Block) -> GateDecision {
        if block.confirmations >= self.required {
            GateDecision::Accept
        } else {
            GateDecision::Discard {
                confirmations: block.confirmations,
                required: self.required,
            }
        }
    }
}
