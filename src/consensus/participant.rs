use serde::Serialize;

use super::{Admission, Unconditional};
use crate::blockchain::{Block, Blockchain};
use crate::error::ChainError;

/// An admin holding its own private ledger replica.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub name: String,
    ledger: Blockchain,
}

impl Participant {
    pub fn new(name: impl Into<String>, ledger: Blockchain) -> Self {
        Self {
            name: name.into(),
            ledger,
        }
    }

    /// Vote on a candidate. Only the local replica's validity is consulted;
    /// the candidate's content plays no part.
    pub fn consent(&self, _candidate: &Block) -> bool {
        self.ledger.is_valid()
    }

    /// Apply a block whose round was already decided.
    pub fn append(&mut self, block: Block) -> Result<Admission, ChainError> {
        self.ledger.append(block, &mut Unconditional)
    }

    pub fn ledger(&self) -> &Blockchain {
        &self.ledger
    }

    #[cfg(any(test, feature = "tamper"))]
    pub fn ledger_mut(&mut self) -> &mut Blockchain {
        &mut self.ledger
    }
}
