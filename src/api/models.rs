use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::blockchain::{Block, Blockchain, MiningReport, Payload, ValidationFailure};
use crate::config::AppConfig;
use crate::consensus::Network;
use crate::digest::HashAlgorithm;
use crate::error::ChainError;

/// Shared application state: the proof-of-work ledger and the admin network.
pub struct AppState {
    pub blockchain: Mutex<Blockchain>,
    pub network: Mutex<Network>,
    pub last_mining: Mutex<Option<MiningReport>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self, ChainError> {
        let blockchain = Blockchain::with_settings(config.algorithm, config.difficulty);
        let network = Network::new(
            config.admins.as_slice(),
            config.algorithm,
            config.flip_probability,
            config.rng_seed,
        )?;
        Ok(Self {
            blockchain: Mutex::new(blockchain),
            network: Mutex::new(network),
            last_mining: Mutex::new(None),
            config,
        })
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub difficulty: u32,
    pub algorithm: HashAlgorithm,
    pub chain: &'a [Block],
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
    pub failure: Option<ValidationFailure>,
}

#[derive(Deserialize)]
pub struct MineRequest {
    pub payload: Payload,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub mined_index: u64,
    pub hash: String,
    pub nonce: u64,
    pub difficulty: u32,
    pub attempts: u64,
    pub elapsed_ms: u128,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}

#[derive(Deserialize)]
pub struct SetDifficultyRequest {
    pub difficulty: u32,
}

#[cfg(feature = "tamper")]
#[derive(Deserialize)]
pub struct TamperRequest {
    pub index: u64,
    pub payload: Payload,
    #[serde(default)]
    pub reseal: bool,
}

/* ---------- Network API Models ---------- */

#[derive(Serialize)]
pub struct AdminStatus {
    pub name: String,
    pub length: usize,
    pub valid: bool,
    pub tip: String,
}

#[derive(Serialize)]
pub struct NetworkResponse {
    pub rounds_played: u64,
    pub flip_probability: f64,
    pub golden_length: usize,
    pub golden_valid: bool,
    pub admins: Vec<AdminStatus>,
}

#[derive(Deserialize)]
pub struct RoundRequest {
    pub payload: Payload,
}

#[derive(Deserialize)]
pub struct SimulateRequest {
    pub rounds: u64,
}

/* ---------- Digest API Models ---------- */

#[derive(Deserialize)]
pub struct HashRateQuery {
    pub iterations: Option<u64>,
    pub input: Option<String>,
}

#[derive(Deserialize)]
pub struct AvalancheQuery {
    pub a: String,
    pub b: String,
}

#[derive(Serialize)]
pub struct AvalancheResponse {
    pub algorithm: HashAlgorithm,
    pub digest_a: String,
    pub digest_b: String,
    pub bits_changed: u32,
    pub total_bits: u32,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub height: usize,
    pub difficulty: u32,
    pub algorithm: HashAlgorithm,
    pub valid: bool,
    pub last_mining: Option<MiningReport>,
    pub rounds_played: u64,
    pub admins: usize,
}
