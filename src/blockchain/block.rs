use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::miner::CancelToken;
use super::{GENESIS_DATA, GENESIS_PREVIOUS_HASH, Payload};
use crate::digest::{HashAlgorithm, digest};
use crate::error::ChainError;

/// A single block of the ledger.
///
/// Fields are read-only outside the crate; a block only changes through
/// mining or `Blockchain::append`.
///
/// ```compile_fail
/// let mut block = duckchain::blockchain::Block::new(1, "Donald Duck", "prev".into());
/// block.payload = "forged".into();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) index: u64,
    pub(crate) payload: Payload,
    pub(crate) nonce: u64,            // Proof-of-Work nonce
    pub(crate) previous_hash: String, // "0" for genesis
    pub(crate) hash: String,          // Cached hash of the block
    #[serde(default)]
    pub(crate) algorithm: HashAlgorithm,
}

/// Outcome of a successful nonce search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiningReport {
    pub index: u64,
    pub nonce: u64,
    pub hash: String,
    pub difficulty: u32,
    pub attempts: u64,
    pub elapsed_ms: u128,
    pub finished_at: i64, // Unix timestamp (UTC)
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis(algorithm: HashAlgorithm) -> Self {
        Self::with_algorithm(
            0,
            Payload::from(GENESIS_DATA),
            GENESIS_PREVIOUS_HASH.to_string(),
            algorithm,
        )
    }

    /// Create a new SHA-256 block (not mined). Call `mine()` to perform PoW.
    pub fn new(index: u64, payload: impl Into<Payload>, previous_hash: String) -> Self {
        Self::with_algorithm(index, payload, previous_hash, HashAlgorithm::Sha256)
    }

    pub fn with_algorithm(
        index: u64,
        payload: impl Into<Payload>,
        previous_hash: String,
        algorithm: HashAlgorithm,
    ) -> Self {
        let mut block = Self {
            index,
            payload: payload.into(),
            nonce: 0,
            previous_hash,
            hash: String::new(),
            algorithm,
        };
        block.hash = block.compute_hash();
        block
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Digest over index, canonical payload, nonce and previous hash,
    /// concatenated without separators. Excludes the `hash` field itself.
    pub fn compute_hash(&self) -> String {
        let preimage = format!(
            "{}{}{}{}",
            self.index,
            self.payload.canonical(),
            self.nonce,
            self.previous_hash
        );
        digest(self.algorithm, preimage.as_bytes())
    }

    /// Recompute and store the hash after a field changed.
    pub fn reseal(&mut self) {
        self.hash = self.compute_hash();
    }

    /// Stored hash equals the recomputed one (no tampering).
    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Hash starts with `difficulty` zero hex digits.
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        self.hash.len() >= difficulty as usize
            && self.hash.chars().take(difficulty as usize).all(|c| c == '0')
    }

    /// Perform Proof-of-Work by finding a nonce that yields a hash
    /// starting with `difficulty` leading zeros (in hex).
    pub fn mine(&mut self, difficulty: u32) -> Result<MiningReport, ChainError> {
        self.search(difficulty, None)
    }

    /// Same as `mine`, but gives up with `MiningCancelled` once `token` is set.
    /// The token is checked before every nonce increment. The digest at the
    /// starting nonce is always tried first, so a block that already meets
    /// `difficulty` is returned as mined even when `token` is cancelled.
    pub fn mine_with_cancel(
        &mut self,
        difficulty: u32,
        token: &CancelToken,
    ) -> Result<MiningReport, ChainError> {
        self.search(difficulty, Some(token))
    }

    fn search(
        &mut self,
        difficulty: u32,
        token: Option<&CancelToken>,
    ) -> Result<MiningReport, ChainError> {
        let max = self.algorithm.hex_len();
        if difficulty > max {
            return Err(ChainError::DifficultyOutOfRange { difficulty, max });
        }

        info!(
            "Mining block #{} with difficulty level: {}...",
            self.index, difficulty
        );
        let start = Instant::now();

        self.hash = self.compute_hash();
        let mut attempts: u64 = 1;
        while !self.meets_difficulty(difficulty) {
            if token.is_some_and(CancelToken::is_cancelled) {
                debug!(
                    "Mining of block #{} cancelled at nonce {}",
                    self.index, self.nonce
                );
                return Err(ChainError::MiningCancelled {
                    index: self.index,
                    attempts,
                });
            }
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = self.compute_hash();
            attempts += 1;
        }

        let elapsed = start.elapsed();
        info!("Block #{} mined successfully! Hash: {}", self.index, self.hash);
        info!(
            "Time taken to mine block #{}: {:.3} seconds ({} attempts)",
            self.index,
            elapsed.as_secs_f64(),
            attempts
        );

        Ok(MiningReport {
            index: self.index,
            nonce: self.nonce,
            hash: self.hash.clone(),
            difficulty,
            attempts,
            elapsed_ms: elapsed.as_millis(),
            finished_at: Utc::now().timestamp(),
        })
    }
}
