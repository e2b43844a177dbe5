use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use super::{Block, DEFAULT_DIFFICULTY, Payload};
use crate::consensus::{Admission, AdmissionPolicy, Decision};
use crate::digest::HashAlgorithm;
use crate::error::ChainError;

/// Why a block failed the integrity scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Stored hash differs from the recomputed one.
    HashMismatch,
    /// `previous_hash` differs from the predecessor's hash.
    BrokenLink,
}

/// First block, in index order, that breaks the chain invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[error("block #{index} failed validation: {reason:?}")]
pub struct ValidationFailure {
    pub index: u64,
    pub reason: FailureReason,
}

/// Simple in-memory hash-linked ledger.
///
/// Blocks are only reachable as `&[Block]`; the ledger grows through
/// `append` and is rewritten only by `reset` or the `tamper`-gated helpers.
///
/// ```compile_fail
/// let mut bc = duckchain::blockchain::Blockchain::new();
/// bc.chain.clear();
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Blockchain {
    chain: Vec<Block>,
    difficulty: u32,
    algorithm: HashAlgorithm,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Initialize a new SHA-256 blockchain with a genesis block.
    pub fn new() -> Self {
        Self::with_settings(HashAlgorithm::Sha256, DEFAULT_DIFFICULTY)
    }

    pub fn with_settings(algorithm: HashAlgorithm, difficulty: u32) -> Self {
        Self {
            chain: vec![Block::genesis(algorithm)],
            difficulty,
            algorithm,
        }
    }

    /// Return the last block in the chain.
    pub fn latest_block(&self) -> Result<&Block, ChainError> {
        self.chain.last().ok_or(ChainError::EmptyChain)
    }

    /// Unmined candidate for the next position, linked to the current tip.
    pub fn next_block(&self, payload: impl Into<Payload>) -> Result<Block, ChainError> {
        let tip = self.latest_block()?;
        Ok(Block::with_algorithm(
            self.chain.len() as u64,
            payload,
            tip.hash.clone(),
            self.algorithm,
        ))
    }

    /// Link `candidate` to the tip, ask `policy` whether it may join, and push
    /// it on acceptance. A rejected or failed candidate leaves the chain as is.
    ///
    /// The candidate's index is set to its position in this ledger.
    pub fn append(
        &mut self,
        mut candidate: Block,
        policy: &mut dyn AdmissionPolicy,
    ) -> Result<Admission, ChainError> {
        let tip_hash = self.latest_block()?.hash.clone();
        candidate.index = self.chain.len() as u64;
        candidate.previous_hash = tip_hash;
        candidate.algorithm = self.algorithm;
        candidate.reseal();

        match policy.admit(&mut candidate, self)? {
            Decision::Accept => {
                info!(
                    "[{}] appended block #{} hash={}",
                    policy.name(),
                    candidate.index,
                    candidate.hash
                );
                let admission = Admission::Accepted {
                    index: candidate.index,
                    hash: candidate.hash.clone(),
                };
                self.chain.push(candidate);
                Ok(admission)
            }
            Decision::Reject => {
                info!(
                    "[{}] rejected block #{}, chain unchanged",
                    policy.name(),
                    candidate.index
                );
                Ok(Admission::Rejected)
            }
        }
    }

    /// Scan the chain in index order and report the first broken block.
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let genesis = self.chain.first().ok_or(ValidationFailure {
            index: 0,
            reason: FailureReason::HashMismatch,
        })?;
        if !genesis.has_valid_hash() {
            warn!("Invalid hash detected at block #0");
            return Err(ValidationFailure {
                index: 0,
                reason: FailureReason::HashMismatch,
            });
        }

        for (i, pair) in self.chain.windows(2).enumerate() {
            let (prev, current) = (&pair[0], &pair[1]);
            let index = (i + 1) as u64;

            if !current.has_valid_hash() {
                warn!("Invalid hash detected at block #{index}");
                return Err(ValidationFailure {
                    index,
                    reason: FailureReason::HashMismatch,
                });
            }
            if current.previous_hash != prev.hash {
                warn!("Invalid previous_hash detected at block #{index}");
                return Err(ValidationFailure {
                    index,
                    reason: FailureReason::BrokenLink,
                });
            }
        }

        debug!("Chain of {} blocks is valid", self.chain.len());
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: u32) {
        // NOTE: Changing difficulty affects future blocks only.
        self.difficulty = difficulty;
    }

    /// Drop everything but a fresh genesis block.
    pub fn reset(&mut self) {
        self.chain = vec![Block::genesis(self.algorithm)];
        info!("Chain reset to genesis");
    }

    /// Indented JSON dump of the whole ledger.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Replace a block's payload in place without resealing it.
    #[cfg(any(test, feature = "tamper"))]
    pub fn corrupt(&mut self, index: u64, payload: Payload) -> Result<(), ChainError> {
        let len = self.chain.len();
        let block = self
            .chain
            .get_mut(index as usize)
            .ok_or(ChainError::IndexOutOfRange { index, len })?;
        block.payload = payload;
        warn!("Block #{index} payload overwritten (hash left stale)");
        Ok(())
    }

    /// Replace a block's payload and recompute its hash; the successor's link
    /// is what exposes it.
    #[cfg(any(test, feature = "tamper"))]
    pub fn corrupt_and_reseal(&mut self, index: u64, payload: Payload) -> Result<(), ChainError> {
        self.corrupt(index, payload)?;
        self.chain[index as usize].reseal();
        Ok(())
    }
}
