use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::{DEFAULT_DIFFICULTY, DEFAULT_MAX_DIFFICULTY};
use crate::digest::HashAlgorithm;
use crate::error::ConfigError;

/// Admins created when `ADMINS` is unset (humans and ducks).
pub const DEFAULT_ADMINS: [&str; 9] = [
    "Alice", "Bob", "Charlie", "Donald", "Eve", "Fiona", "Gary", "Huey", "Igor",
];

pub const DEFAULT_FLIP_PROBABILITY: f64 = 0.5;

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    pub max_difficulty: u32,
    pub algorithm: HashAlgorithm,
    pub flip_probability: f64,
    pub admins: Vec<String>,
    pub rng_seed: Option<u64>,
    pub mining_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            difficulty: DEFAULT_DIFFICULTY,
            max_difficulty: DEFAULT_MAX_DIFFICULTY,
            algorithm: HashAlgorithm::Sha256,
            flip_probability: DEFAULT_FLIP_PROBABILITY,
            admins: DEFAULT_ADMINS.iter().map(|s| s.to_string()).collect(),
            rng_seed: None,
            mining_timeout: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        if let Some(host) = get("HOST") {
            cfg.host = host.trim().to_string();
        }
        if let Some(v) = get("PORT") {
            cfg.port = parse("PORT", &v)?;
        }
        if let Some(v) = get("DIFFICULTY") {
            cfg.difficulty = parse("DIFFICULTY", &v)?;
        }
        if let Some(v) = get("MAX_DIFFICULTY") {
            cfg.max_difficulty = parse("MAX_DIFFICULTY", &v)?;
        }
        if let Some(v) = get("HASH_ALGORITHM") {
            cfg.algorithm = v.parse()?;
        }
        if let Some(v) = get("FLIP_PROBABILITY") {
            let p: f64 = parse("FLIP_PROBABILITY", &v)?;
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::ProbabilityOutOfRange(p));
            }
            cfg.flip_probability = p;
        }
        if let Some(v) = get("ADMINS") {
            let admins: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if admins.is_empty() {
                return Err(ConfigError::NoAdmins);
            }
            cfg.admins = admins;
        }
        if let Some(v) = get("RNG_SEED") {
            cfg.rng_seed = Some(parse("RNG_SEED", &v)?);
        }
        if let Some(v) = get("MINING_TIMEOUT_SECS") {
            cfg.mining_timeout = Some(Duration::from_secs(parse("MINING_TIMEOUT_SECS", &v)?));
        }

        Ok(cfg)
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}
