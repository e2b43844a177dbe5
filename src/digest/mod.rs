use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::error::ConfigError;

/// Hash function used to seal blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Length of the hex-encoded digest.
    pub fn hex_len(self) -> u32 {
        match self {
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(HashAlgorithm::Sha512),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Hash `bytes` with `algorithm` and return the lowercase hex digest.
pub fn digest(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            hex::encode(hasher.finalize())
        }
        HashAlgorithm::Sha512 => {
            let mut hasher = Sha512::new();
            hasher.update(bytes);
            hex::encode(hasher.finalize())
        }
    }
}

/// Number of differing bits between two hex digests.
/// Returns `None` when either side is not hex or the lengths differ.
pub fn hamming_distance(a: &str, b: &str) -> Option<u32> {
    let a = hex::decode(a).ok()?;
    let b = hex::decode(b).ok()?;
    if a.len() != b.len() {
        return None;
    }
    Some(a.iter().zip(&b).map(|(x, y)| (x ^ y).count_ones()).sum())
}

#[derive(Debug, Clone, Serialize)]
pub struct HashRate {
    pub algorithm: HashAlgorithm,
    pub iterations: u64,
    pub elapsed_ms: u128,
    pub hashes_per_sec: f64,
}

/// Time `iterations` digests of `input` suffixed with the iteration counter.
pub fn measure_hash_rate(algorithm: HashAlgorithm, input: &str, iterations: u64) -> HashRate {
    let start = Instant::now();
    for i in 0..iterations {
        digest(algorithm, format!("{input}{i}").as_bytes());
    }
    let elapsed = start.elapsed();

    let secs = elapsed.as_secs_f64();
    let hashes_per_sec = if iterations == 0 || secs == 0.0 {
        0.0
    } else {
        iterations as f64 / secs
    };

    HashRate {
        algorithm,
        iterations,
        elapsed_ms: elapsed.as_millis(),
        hashes_per_sec,
    }
}
