pub mod block;
pub mod miner;
pub mod model;
pub mod payload;

pub use block::{Block, MiningReport};
pub use miner::{CancelToken, MiningJob};
pub use model::{Blockchain, FailureReason, ValidationFailure};
pub use payload::Payload;

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 1;

/// Upper bound accepted from API callers (keep low in dev to avoid long waits).
pub const DEFAULT_MAX_DIFFICULTY: u32 = 6;

/// Payload of the genesis block.
pub const GENESIS_DATA: &str = "Genesis Block Quack Quack!";

/// Previous-hash sentinel of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
