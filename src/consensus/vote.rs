//! Local-Validity Majority Vote.
//!
//! Each admin votes "yes" when its own replica passes `Blockchain::is_valid`.
//! The candidate's content is never inspected and every vote is self-reported,
//! so this is a toy honest-majority model, not Byzantine fault tolerance.

use log::debug;
use rand::Rng;
use serde::Serialize;

use super::{AdmissionPolicy, Decision, Participant};
use crate::blockchain::{Block, Blockchain};
use crate::error::ChainError;

/// Counted votes of one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub agree: usize,
    pub total: usize,
    pub dissenters: Vec<String>,
}

impl VoteTally {
    /// Strict majority; ties and empty networks fail.
    pub fn is_majority(&self) -> bool {
        self.agree * 2 > self.total
    }
}

/// Admission by strict majority of participants' self-validity checks.
///
/// Every vote is inverted with probability `flip_probability` to simulate
/// faulty or dishonest admins.
pub struct LocalValidityVote<'a, R: Rng> {
    participants: &'a [Participant],
    flip_probability: f64,
    rng: &'a mut R,
    last_tally: Option<VoteTally>,
}

impl<'a, R: Rng> LocalValidityVote<'a, R> {
    pub fn new(
        participants: &'a [Participant],
        flip_probability: f64,
        rng: &'a mut R,
    ) -> Result<Self, ChainError> {
        if !(0.0..=1.0).contains(&flip_probability) {
            return Err(ChainError::InvalidProbability(flip_probability));
        }
        Ok(Self {
            participants,
            flip_probability,
            rng,
            last_tally: None,
        })
    }

    /// Collect one vote per participant.
    pub fn cast(&mut self, candidate: &Block) -> VoteTally {
        let mut tally = VoteTally {
            total: self.participants.len(),
            ..VoteTally::default()
        };
        for admin in self.participants {
            let mut valid = admin.consent(candidate);
            if self.flip_probability > 0.0 && self.rng.gen_bool(self.flip_probability) {
                valid = !valid;
            }
            if valid {
                tally.agree += 1;
            } else {
                tally.dissenters.push(admin.name.clone());
            }
        }
        debug!(
            "Vote on block #{}: {}/{} agree",
            candidate.index, tally.agree, tally.total
        );
        tally
    }

    pub fn last_tally(&self) -> Option<&VoteTally> {
        self.last_tally.as_ref()
    }

    pub fn take_tally(&mut self) -> Option<VoteTally> {
        self.last_tally.take()
    }
}

impl<R: Rng> AdmissionPolicy for LocalValidityVote<'_, R> {
    fn name(&self) -> &'static str {
        "local-validity-vote"
    }

    fn admit(
        &mut self,
        candidate: &mut Block,
        _ledger: &Blockchain,
    ) -> Result<Decision, ChainError> {
        let tally = self.cast(candidate);
        let decision = if tally.is_majority() {
            Decision::Accept
        } else {
            Decision::Reject
        };
        self.last_tally = Some(tally);
        Ok(decision)
    }
}
