use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use super::{LocalValidityVote, Participant};
use crate::blockchain::{Blockchain, Payload};
use crate::digest::HashAlgorithm;
use crate::error::ChainError;

/// Result of one voting round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundOutcome {
    pub round: u64,
    pub accepted: bool,
    pub agree: usize,
    pub total: usize,
    pub dissenters: Vec<String>,
    pub block_hash: Option<String>,
}

/// A set of admins, each with a private replica, plus the golden reference
/// ledger that only changes after a round is decided.
#[derive(Debug)]
pub struct Network {
    participants: Vec<Participant>,
    golden: Blockchain,
    flip_probability: f64,
    rng: StdRng,
    round: u64,
}

impl Network {
    pub fn new<S: AsRef<str>>(
        names: &[S],
        algorithm: HashAlgorithm,
        flip_probability: f64,
        seed: Option<u64>,
    ) -> Result<Self, ChainError> {
        if !(0.0..=1.0).contains(&flip_probability) {
            return Err(ChainError::InvalidProbability(flip_probability));
        }
        let participants = names
            .iter()
            .map(|name| Participant::new(name.as_ref(), Blockchain::with_settings(algorithm, 0)))
            .collect();
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            participants,
            golden: Blockchain::with_settings(algorithm, 0),
            flip_probability,
            rng,
            round: 0,
        })
    }

    /// Vote on a new block and, on a strict majority, append it to the golden
    /// ledger and to every admin's replica.
    pub fn propose(&mut self, payload: impl Into<Payload>) -> Result<RoundOutcome, ChainError> {
        let round = self.round;
        self.round += 1;

        let candidate = self.golden.next_block(payload)?;
        let mut vote =
            LocalValidityVote::new(&self.participants, self.flip_probability, &mut self.rng)?;
        let admission = self.golden.append(candidate, &mut vote)?;
        let tally = vote.take_tally().unwrap_or_default();

        let block_hash = if admission.is_accepted() {
            let block = self.golden.latest_block()?.clone();
            for admin in &mut self.participants {
                admin.append(block.clone())?;
            }
            info!(
                "{} Majority agrees on adding block to golden chain. {} out of {} admins agree.",
                round, tally.agree, tally.total
            );
            Some(block.hash)
        } else {
            info!(
                "{} Network does not agree. {} out of {} admins agree. Disagreeing admins: {}",
                round,
                tally.agree,
                tally.total,
                tally.dissenters.join(", ")
            );
            None
        };

        Ok(RoundOutcome {
            round,
            accepted: block_hash.is_some(),
            agree: tally.agree,
            total: tally.total,
            dissenters: tally.dissenters,
            block_hash,
        })
    }

    /// Run `rounds` proposals with generated payloads.
    pub fn simulate(&mut self, rounds: u64) -> Result<Vec<RoundOutcome>, ChainError> {
        (0..rounds)
            .map(|_| {
                let payload = format!("a new block {}", self.round);
                self.propose(payload)
            })
            .collect()
    }

    pub fn golden(&self) -> &Blockchain {
        &self.golden
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name == name)
    }

    #[cfg(any(test, feature = "tamper"))]
    pub fn participant_mut(&mut self, name: &str) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.name == name)
    }

    pub fn flip_probability(&self) -> f64 {
        self.flip_probability
    }

    pub fn rounds_played(&self) -> u64 {
        self.round
    }
}
